//! Path criticality: how much of the change lands in configured critical areas.

use crate::types::{FactorKind, RiskFactor};

/// Score when no changed file is under a critical path.
pub const NON_CRITICAL_FLOOR: f64 = 10.0;
/// Score once any critical path is touched, before the fraction term.
pub const CRITICAL_FLOOR: f64 = 40.0;
/// Added on top of CRITICAL_FLOOR in proportion to the critical fraction.
pub const CRITICAL_SPAN: f64 = 60.0;
/// Critical files named in the rationale.
const RATIONALE_FILES: usize = 3;

/// Path lies under `prefix` on segment boundaries, anywhere in the path.
///
/// `services/payment-gateway/x.go` is under `payment-gateway` and under
/// `services/payment-gateway`, but not under `gateway` or `payment`.
pub fn path_under_prefix(path: &str, prefix: &str) -> bool {
  let prefix = prefix.trim().trim_matches('/').to_ascii_lowercase();
  if prefix.is_empty() {
    return false;
  }
  let path = path.to_ascii_lowercase();
  path == prefix
    || path.starts_with(&format!("{}/", prefix))
    || path.contains(&format!("/{}/", prefix))
    || path.ends_with(&format!("/{}", prefix))
}

/// Changed files that fall under any critical prefix, in input order.
pub fn critical_files<'a>(files: &'a [String], critical_paths: &[String]) -> Vec<&'a str> {
  files
    .iter()
    .filter(|f| critical_paths.iter().any(|p| path_under_prefix(f, p)))
    .map(|f| f.as_str())
    .collect()
}

/// PathCriticality factor.
///
/// No critical file: `NON_CRITICAL_FLOOR`. Otherwise
/// `CRITICAL_FLOOR + CRITICAL_SPAN * critical / total`.
pub fn evaluate_path_criticality(files: &[String], critical_paths: &[String], weight: f64) -> RiskFactor {
  let hits = critical_files(files, critical_paths);
  if hits.is_empty() {
    return RiskFactor::new(
      FactorKind::PathCriticality,
      NON_CRITICAL_FLOOR,
      weight,
      "No critical paths modified",
    );
  }

  let fraction = hits.len() as f64 / files.len() as f64;
  let score = CRITICAL_FLOOR + CRITICAL_SPAN * fraction;
  let mut shown: Vec<&str> = hits.iter().take(RATIONALE_FILES).copied().collect();
  if hits.len() > RATIONALE_FILES {
    shown.push("...");
  }
  let rationale = format!(
    "{}/{} files on critical paths: {}",
    hits.len(),
    files.len(),
    shown.join(", ")
  );
  RiskFactor::new(FactorKind::PathCriticality, score, weight, rationale)
}
