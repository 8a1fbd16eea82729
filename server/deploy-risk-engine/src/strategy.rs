//! Category classification and deployment strategy selection.
//!
//! The strategy table is the only place a category becomes a rollout policy;
//! nothing else derives strategy from the raw score.

use crate::config::{StrategyTable, Thresholds};
use crate::types::{DeploymentStrategy, RiskCategory};

/// Selected rollout policy for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyDecision {
  pub strategy: DeploymentStrategy,
  pub requires_dual_approval: bool,
  pub monitoring_hours: u32,
}

/// Thresholds are inclusive lower bounds: LOW [0,m), MEDIUM [m,h), HIGH [h,c), CRITICAL [c,100].
///
/// Scores below 0 or NaN fall into LOW; scores above 100 into CRITICAL.
pub fn classify(score: f64, thresholds: &Thresholds) -> RiskCategory {
  if score >= thresholds.critical {
    RiskCategory::Critical
  } else if score >= thresholds.high {
    RiskCategory::High
  } else if score >= thresholds.medium {
    RiskCategory::Medium
  } else {
    RiskCategory::Low
  }
}

pub fn select_strategy(category: RiskCategory, table: &StrategyTable) -> StrategyDecision {
  let rule = table.rule(category);
  StrategyDecision {
    strategy: rule.strategy,
    requires_dual_approval: rule.dual_approval,
    monitoring_hours: rule.monitoring_hours,
  }
}

/// Ordered rollout steps for a decision.
pub fn rollout_steps(decision: &StrategyDecision) -> Vec<String> {
  let mut out: Vec<String> = Vec::new();
  if decision.requires_dual_approval {
    out.push("Obtain two independent approvals before deploying".into());
  }
  match decision.strategy {
    DeploymentStrategy::Standard => {
      out.push("Standard deployment acceptable".into());
      out.push("Auto-rollback if error rate exceeds 1%".into());
    }
    DeploymentStrategy::Canary => {
      out.push("Deploy using canary strategy (10% -> 50% -> 100%)".into());
      out.push("Hold each stage until health checks pass".into());
      out.push("Automated rollback if error rate exceeds 0.5%".into());
    }
    DeploymentStrategy::BlueGreen => {
      out.push("Deploy to idle environment and run full regression suite".into());
      out.push("Switch traffic only after staging validation".into());
      out.push("Keep previous environment warm for instant rollback".into());
    }
    DeploymentStrategy::Progressive => {
      out.push("Deploy to staging and run full regression suite".into());
      out.push("Phased rollout starting at 5% of traffic".into());
      out.push("Advance phases manually after each health review".into());
      out.push("On-call monitoring required for the whole rollout".into());
    }
  }
  out.push(format!(
    "Monitor for {} hour{} post-deployment",
    decision.monitoring_hours,
    if decision.monitoring_hours == 1 { "" } else { "s" }
  ));
  out
}
