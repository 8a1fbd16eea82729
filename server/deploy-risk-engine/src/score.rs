//! Change magnitude and the weighted aggregate.

use crate::types::{FactorKind, RiskFactor};

/// Coefficient on ln(1 + files).
pub const FILE_COEFFICIENT: f64 = 10.0;
/// Coefficient on ln(1 + lines added + lines deleted).
pub const LINE_COEFFICIENT: f64 = 8.0;
/// Magnitude of an empty change (no files, no lines).
pub const MIN_MAGNITUDE_SCORE: f64 = 0.0;

/// `min(100, 10·ln(1+files) + 8·ln(1+lines))`. Monotonic in both inputs, plateaus at 100.
pub fn magnitude_score(file_count: usize, lines_changed: u64) -> f64 {
  let files = (file_count as f64).ln_1p();
  let lines = (lines_changed as f64).ln_1p();
  (MIN_MAGNITUDE_SCORE + FILE_COEFFICIENT * files + LINE_COEFFICIENT * lines).min(100.0)
}

/// ChangeMagnitude factor.
pub fn evaluate_change_magnitude(
  files: &[String],
  lines_added: u64,
  lines_deleted: u64,
  weight: f64,
) -> RiskFactor {
  let lines = lines_added.saturating_add(lines_deleted);
  let score = magnitude_score(files.len(), lines);
  let rationale = format!(
    "{} files, +{}/-{} lines changed",
    files.len(),
    lines_added,
    lines_deleted
  );
  RiskFactor::new(FactorKind::ChangeMagnitude, score, weight, rationale)
}

/// Weighted sum of factor scores.
pub fn aggregate<'a, I>(factors: I) -> f64
where
  I: IntoIterator<Item = &'a RiskFactor>,
{
  factors.into_iter().map(RiskFactor::contribution).sum()
}

/// The factor with the largest weighted contribution; earliest wins ties.
pub fn top_contributor<'a, I>(factors: I) -> Option<&'a RiskFactor>
where
  I: IntoIterator<Item = &'a RiskFactor>,
{
  factors.into_iter().fold(None, |best: Option<&'a RiskFactor>, f| match best {
    Some(b) if b.contribution() >= f.contribution() => Some(b),
    _ => Some(f),
  })
}
