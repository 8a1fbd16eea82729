//! Human-readable report for a RiskResult (CLI and PR comments).

use std::fmt::Write;

use crate::types::RiskResult;

const RULE_WIDTH: usize = 60;

/// Render a plain-text summary: headline, factor table, recommendations.
pub fn render_text(result: &RiskResult) -> String {
  let rule = "=".repeat(RULE_WIDTH);
  let mut out = String::new();

  let _ = writeln!(out, "{}", rule);
  let commit = if result.commit_id.is_empty() { "(unknown)" } else { result.commit_id.as_str() };
  let _ = writeln!(out, "Commit:   {}", commit);
  if let Some(at) = &result.committed_at {
    let _ = writeln!(out, "Date:     {}", at);
  }
  let _ = writeln!(
    out,
    "Risk:     {:.1}/100 ({})",
    result.overall_score, result.category
  );
  let _ = writeln!(
    out,
    "Strategy: {}{}",
    result.recommended_strategy,
    if result.requires_dual_approval { " (dual approval required)" } else { "" }
  );
  let _ = writeln!(out, "{}", rule);

  let _ = writeln!(out, "{:<20} {:>6} {:>6} {:>7}  {}", "Factor", "Score", "Weight", "Contrib", "Rationale");
  for f in &result.factors {
    let _ = writeln!(
      out,
      "{:<20} {:>6.1} {:>6.2} {:>7.1}  {}",
      f.name.label(),
      f.raw_score,
      f.weight,
      f.contribution(),
      f.rationale
    );
  }

  if !result.recommendations.is_empty() {
    let _ = writeln!(out);
    let _ = writeln!(out, "Recommendations:");
    for r in &result.recommendations {
      let _ = writeln!(out, "  - {}", r);
    }
  }
  let _ = writeln!(out, "Assessment: {}", result.assessment_id);
  out
}
