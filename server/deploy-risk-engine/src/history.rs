//! Author reliability: historical profile lookup and the HistoricalPattern factor.
//!
//! Profiles come from an external store; this module only reads them. A
//! missing profile is a normal state and resolves to a neutral score.

use std::collections::HashMap;
use std::path::Path;

use crate::error::EngineError;
use crate::normalize::author_key;
use crate::types::{FactorKind, HistoricalProfile, RiskFactor};

/// Score when the author has no usable profile.
pub const NEUTRAL_HISTORY_SCORE: f64 = 50.0;
/// Points added per historical revert.
pub const REVERT_PENALTY: f64 = 10.0;

/// Read-only source of historical profiles.
pub trait HistoryStore {
  fn profile(&self, author: &str) -> Option<HistoricalProfile>;
}

/// Store with no history at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

impl HistoryStore for NoHistory {
  fn profile(&self, _author: &str) -> Option<HistoricalProfile> {
    None
  }
}

/// Profiles keyed by normalized author (trimmed, lowercase).
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistory {
  profiles: HashMap<String, HistoricalProfile>,
}

impl InMemoryHistory {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, author: &str, profile: HistoricalProfile) {
    self.profiles.insert(author_key(author), profile);
  }

  pub fn with_profile(mut self, author: &str, profile: HistoricalProfile) -> Self {
    self.insert(author, profile);
    self
  }

  pub fn len(&self) -> usize {
    self.profiles.len()
  }

  pub fn is_empty(&self) -> bool {
    self.profiles.is_empty()
  }

  /// Parse `{ "author": { "success_rate": 0.9, "revert_count": 1 }, ... }`.
  pub fn from_json_str(raw: &str) -> Result<Self, EngineError> {
    let map: HashMap<String, HistoricalProfile> = serde_json::from_str(raw)?;
    let mut store = Self::new();
    for (author, profile) in map {
      store.insert(&author, profile);
    }
    Ok(store)
  }

  pub fn load(path: &Path) -> Result<Self, EngineError> {
    let raw = std::fs::read_to_string(path)?;
    let store = Self::from_json_str(&raw)?;
    tracing::debug!(path = %path.display(), authors = store.len(), "loaded historical profiles");
    Ok(store)
  }
}

impl HistoryStore for InMemoryHistory {
  fn profile(&self, author: &str) -> Option<HistoricalProfile> {
    self.profiles.get(&author_key(author)).copied()
  }
}

impl<T: HistoryStore + ?Sized> HistoryStore for &T {
  fn profile(&self, author: &str) -> Option<HistoricalProfile> {
    (**self).profile(author)
  }
}

/// `clamp((1 - success_rate)·100 + 10·reverts, 0, 100)`, or the neutral score
/// when the profile is absent or its success rate is not a number.
pub fn history_score(profile: Option<&HistoricalProfile>) -> f64 {
  match profile {
    Some(p) if p.success_rate.is_finite() => {
      let rate = p.success_rate.clamp(0.0, 1.0);
      ((1.0 - rate) * 100.0 + REVERT_PENALTY * p.revert_count as f64).clamp(0.0, 100.0)
    }
    _ => NEUTRAL_HISTORY_SCORE,
  }
}

/// HistoricalPattern factor. Never fails.
pub fn evaluate_historical_pattern(
  author: &str,
  profile: Option<&HistoricalProfile>,
  weight: f64,
) -> RiskFactor {
  let who = if author.trim().is_empty() { "unknown author" } else { author.trim() };
  let rationale = match profile {
    Some(p) if p.success_rate.is_finite() => {
      if !(0.0..=1.0).contains(&p.success_rate) {
        tracing::warn!(author = who, success_rate = p.success_rate, "success rate outside [0, 1]; clamped");
      }
      format!(
        "Author {}: {:.0}% historical success rate, {} reverts",
        who,
        p.success_rate.clamp(0.0, 1.0) * 100.0,
        p.revert_count
      )
    }
    Some(p) => {
      tracing::warn!(author = who, success_rate = p.success_rate, "unusable success rate; using neutral score");
      format!("Author {}: unusable history; neutral default {}", who, NEUTRAL_HISTORY_SCORE)
    }
    None => format!("Author {}: no history; neutral default {}", who, NEUTRAL_HISTORY_SCORE),
  };
  RiskFactor::new(FactorKind::HistoricalPattern, history_score(profile), weight, rationale)
}
