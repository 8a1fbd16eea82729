//! Core engine: evaluates factors, aggregates, classifies, selects a strategy.
//!
//! The engine holds only an immutable configuration snapshot, so one engine
//! can be shared across threads and every call is independent.

use std::sync::Arc;

use crate::change_type;
use crate::config::{RiskConfiguration, SharedConfig, WEIGHT_TOLERANCE};
use crate::error::EngineError;
use crate::history::{self, HistoryStore};
use crate::normalize;
use crate::risk;
use crate::score;
use crate::strategy;
use crate::types::*;

#[derive(Debug, Clone)]
pub struct Engine {
  config: Arc<RiskConfiguration>,
}

impl Engine {
  /// Validates the configuration; a bad one is rejected here, never per call.
  pub fn new(config: RiskConfiguration) -> Result<Self, EngineError> {
    config.validate()?;
    Ok(Self {
      config: Arc::new(config),
    })
  }

  pub fn with_defaults() -> Self {
    Self {
      config: Arc::new(RiskConfiguration::default()),
    }
  }

  /// Engine bound to the current snapshot of a hot-reloadable configuration.
  pub fn from_shared(shared: &SharedConfig) -> Self {
    Self {
      config: shared.snapshot(),
    }
  }

  pub fn config(&self) -> &RiskConfiguration {
    &self.config
  }

  /// Normalize an inbound commit, look up its author, and evaluate it.
  pub fn evaluate_inbound<H>(&self, raw: &InboundCommit, history: &H) -> Result<RiskResult, EngineError>
  where
    H: HistoryStore + ?Sized,
  {
    let change = normalize::normalize(raw)?;
    let profile = history.profile(&change.author);
    Ok(self.evaluate(&change, profile.as_ref()))
  }

  /// Full pipeline for one commit.
  pub fn evaluate(&self, change: &CommitChange, profile: Option<&HistoricalProfile>) -> RiskResult {
    let factors = self.evaluate_factors(change, profile);
    self.summarize(change, factors)
  }

  /// The four factors, each computed independently of the others.
  pub fn evaluate_factors(&self, change: &CommitChange, profile: Option<&HistoricalProfile>) -> FactorSet {
    let w = &self.config.weights;
    let factors = FactorSet::from_array([
      change_type::evaluate_semantic_type(&change.message, w.semantic_type),
      risk::evaluate_path_criticality(
        &change.files_changed,
        &self.config.critical_paths,
        w.path_criticality,
      ),
      score::evaluate_change_magnitude(
        &change.files_changed,
        change.lines_added,
        change.lines_deleted,
        w.change_magnitude,
      ),
      history::evaluate_historical_pattern(&change.author, profile, w.historical_pattern),
    ]);
    for f in &factors {
      tracing::debug!(
        commit = %change.commit_id,
        factor = %f.name,
        raw_score = f.raw_score,
        weight = f.weight,
        "factor evaluated"
      );
    }
    factors
  }

  /// Aggregate factors assembled by the caller into a result.
  ///
  /// Each factor must carry the configured weight for its kind and a raw
  /// score in [0,100]; otherwise the set is rejected and nothing is scored.
  pub fn assess(&self, change: &CommitChange, factors: FactorSet) -> Result<RiskResult, EngineError> {
    for f in &factors {
      let expected = self.config.weights.get(f.name);
      if !f.weight.is_finite() || (f.weight - expected).abs() > WEIGHT_TOLERANCE {
        return Err(EngineError::factor_set(format!(
          "{} weight {} does not match configured {}",
          f.name, f.weight, expected
        )));
      }
      if !f.raw_score.is_finite() || !(0.0..=100.0).contains(&f.raw_score) {
        return Err(EngineError::factor_set(format!(
          "{} raw score {} outside [0, 100]",
          f.name, f.raw_score
        )));
      }
    }
    let rebuilt = FactorSet::from_array(FactorKind::ALL.map(|kind| {
      let f = factors.get(kind);
      RiskFactor {
        weight: self.config.weights.get(kind),
        ..f.clone()
      }
    }));
    Ok(self.summarize(change, rebuilt))
  }

  /// Score, category, strategy for factors carrying the configured weights.
  fn summarize(&self, change: &CommitChange, factors: FactorSet) -> RiskResult {
    let overall_score = score::aggregate(&factors);
    let category = strategy::classify(overall_score, &self.config.thresholds);
    let decision = strategy::select_strategy(category, &self.config.strategies);

    let mut recommendations = strategy::rollout_steps(&decision);
    if let Some(top) = score::top_contributor(&factors) {
      recommendations.push(format!(
        "Top risk factor: {} ({:.1} x {} = {:.1})",
        top.name.label(),
        top.raw_score,
        top.weight,
        top.contribution()
      ));
    }

    let assessment_id = assessment_id(&change.commit_id, overall_score, category, &factors);

    tracing::info!(
      commit = %change.commit_id,
      score = overall_score,
      category = %category,
      strategy = %decision.strategy,
      dual_approval = decision.requires_dual_approval,
      "commit assessed"
    );

    RiskResult {
      assessment_id,
      commit_id: change.commit_id.clone(),
      committed_at: change.timestamp.map(|t| t.to_rfc3339()),
      overall_score,
      category,
      factors,
      recommended_strategy: decision.strategy,
      requires_dual_approval: decision.requires_dual_approval,
      monitoring_hours: decision.monitoring_hours,
      recommendations,
    }
  }
}

/// Stable id: hash of commit id, category, and the exact score bits.
fn assessment_id(commit_id: &str, overall: f64, category: RiskCategory, factors: &FactorSet) -> String {
  let mut hasher = blake3::Hasher::new();
  hasher.update(commit_id.as_bytes());
  hasher.update(b"|");
  hasher.update(category.as_str().as_bytes());
  hasher.update(b"|");
  hasher.update(&overall.to_bits().to_le_bytes());
  for f in factors {
    hasher.update(f.name.as_str().as_bytes());
    hasher.update(&f.raw_score.to_bits().to_le_bytes());
    hasher.update(&f.weight.to_bits().to_le_bytes());
  }
  let hex = hasher.finalize().to_hex();
  format!("risk-{}", &hex[..16])
}
