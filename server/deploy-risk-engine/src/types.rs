//! Core types for the risk engine (JSON contracts + internal models).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::EngineError;
use crate::normalize;

// ---------------------------------------------------------------------------
// Inbound types (JSON contract — what CI sends)
// ---------------------------------------------------------------------------

/// One inbound commit object. Unknown fields are silently ignored.
///
/// `files_changed` is optional at the wire level so that an absent or `null`
/// list can be told apart from an empty one and rejected during normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundCommit {
  #[serde(default)]
  pub commit_id: String,
  #[serde(default)]
  pub author: String,
  #[serde(default)]
  pub message: String,
  #[serde(default)]
  pub timestamp: Option<String>,
  #[serde(default)]
  pub files_changed: Option<Vec<String>>,
  #[serde(default)]
  pub lines_added: u64,
  #[serde(default)]
  pub lines_deleted: u64,
}

// ---------------------------------------------------------------------------
// Internal normalized types
// ---------------------------------------------------------------------------

/// Canonical commit after normalization. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitChange {
  pub commit_id: String,
  pub author: String,
  pub message: String,
  pub timestamp: Option<DateTime<Utc>>,
  /// Normalized paths, duplicates collapsed (first occurrence kept).
  pub files_changed: Vec<String>,
  pub lines_added: u64,
  pub lines_deleted: u64,
}

impl CommitChange {
  pub fn new<I, S>(commit_id: &str, author: &str, message: &str, files: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    Self {
      commit_id: commit_id.to_string(),
      author: author.trim().to_string(),
      message: message.to_string(),
      timestamp: None,
      files_changed: normalize::normalize_files(files),
      lines_added: 0,
      lines_deleted: 0,
    }
  }

  pub fn with_lines(mut self, added: u64, deleted: u64) -> Self {
    self.lines_added = added;
    self.lines_deleted = deleted;
    self
  }

  pub fn with_timestamp(mut self, ts: DateTime<Utc>) -> Self {
    self.timestamp = Some(ts);
    self
  }

  pub fn lines_changed(&self) -> u64 {
    self.lines_added.saturating_add(self.lines_deleted)
  }
}

/// Past-performance data for one author, supplied by an external store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalProfile {
  /// Fraction of past changes that did not need a rollback.
  pub success_rate: f64,
  #[serde(default)]
  pub revert_count: u32,
}

// ---------------------------------------------------------------------------
// Factors
// ---------------------------------------------------------------------------

/// The closed set of risk signals. Declaration order is evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
  SemanticType,
  PathCriticality,
  ChangeMagnitude,
  HistoricalPattern,
}

impl FactorKind {
  pub const ALL: [FactorKind; 4] = [
    FactorKind::SemanticType,
    FactorKind::PathCriticality,
    FactorKind::ChangeMagnitude,
    FactorKind::HistoricalPattern,
  ];

  pub fn index(self) -> usize {
    match self {
      Self::SemanticType => 0,
      Self::PathCriticality => 1,
      Self::ChangeMagnitude => 2,
      Self::HistoricalPattern => 3,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::SemanticType => "semantic_type",
      Self::PathCriticality => "path_criticality",
      Self::ChangeMagnitude => "change_magnitude",
      Self::HistoricalPattern => "historical_pattern",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::SemanticType => "Semantic type",
      Self::PathCriticality => "Path criticality",
      Self::ChangeMagnitude => "Change magnitude",
      Self::HistoricalPattern => "Historical pattern",
    }
  }
}

impl fmt::Display for FactorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One evaluated signal: raw score in [0,100], weight in [0,1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
  pub name: FactorKind,
  pub raw_score: f64,
  pub weight: f64,
  pub rationale: String,
}

impl RiskFactor {
  pub fn new(name: FactorKind, raw_score: f64, weight: f64, rationale: impl Into<String>) -> Self {
    Self {
      name,
      raw_score: raw_score.clamp(0.0, 100.0),
      weight,
      rationale: rationale.into(),
    }
  }

  /// Weighted share of the overall score.
  pub fn contribution(&self) -> f64 {
    self.raw_score * self.weight
  }
}

/// Exactly one factor per [`FactorKind`], held in evaluation order.
///
/// Deserialization goes through [`FactorSet::from_unordered`]: a reordered
/// `factors` array lands each factor in its own slot, a gap or duplicate fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RiskFactor>", into = "Vec<RiskFactor>")]
pub struct FactorSet([RiskFactor; 4]);

impl FactorSet {
  pub fn new(
    semantic: RiskFactor,
    path: RiskFactor,
    magnitude: RiskFactor,
    history: RiskFactor,
  ) -> Result<Self, EngineError> {
    Self::from_unordered(vec![semantic, path, magnitude, history])
  }

  /// Build from factors computed in any order; each kind must appear exactly once.
  pub fn from_unordered(factors: Vec<RiskFactor>) -> Result<Self, EngineError> {
    let mut slots: [Option<RiskFactor>; 4] = [None, None, None, None];
    for factor in factors {
      let slot = &mut slots[factor.name.index()];
      if slot.is_some() {
        return Err(EngineError::factor_set(format!("duplicate factor {}", factor.name)));
      }
      *slot = Some(factor);
    }
    let [a, b, c, d] = slots;
    match (a, b, c, d) {
      (Some(a), Some(b), Some(c), Some(d)) => Ok(Self([a, b, c, d])),
      (a, b, c, d) => {
        let missing: Vec<_> = [a, b, c, d]
          .iter()
          .zip(FactorKind::ALL)
          .filter(|(slot, _)| slot.is_none())
          .map(|(_, kind)| kind.as_str())
          .collect();
        Err(EngineError::factor_set(format!("missing factor {}", missing.join(", "))))
      }
    }
  }

  /// Factors already in evaluation order.
  pub(crate) fn from_array(factors: [RiskFactor; 4]) -> Self {
    debug_assert!(factors.iter().zip(FactorKind::ALL).all(|(f, k)| f.name == k));
    Self(factors)
  }

  pub fn get(&self, kind: FactorKind) -> &RiskFactor {
    &self.0[kind.index()]
  }

  pub fn iter(&self) -> std::slice::Iter<'_, RiskFactor> {
    self.0.iter()
  }

  pub fn as_slice(&self) -> &[RiskFactor] {
    &self.0
  }
}

impl TryFrom<Vec<RiskFactor>> for FactorSet {
  type Error = EngineError;

  fn try_from(factors: Vec<RiskFactor>) -> Result<Self, Self::Error> {
    Self::from_unordered(factors)
  }
}

impl From<FactorSet> for Vec<RiskFactor> {
  fn from(set: FactorSet) -> Self {
    set.0.into()
  }
}

impl<'a> IntoIterator for &'a FactorSet {
  type Item = &'a RiskFactor;
  type IntoIter = std::slice::Iter<'a, RiskFactor>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

// ---------------------------------------------------------------------------
// Category + strategy enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskCategory {
  Low,
  Medium,
  High,
  Critical,
}

impl RiskCategory {
  pub const ALL: [RiskCategory; 4] = [
    RiskCategory::Low,
    RiskCategory::Medium,
    RiskCategory::High,
    RiskCategory::Critical,
  ];

  pub fn index(self) -> usize {
    match self {
      Self::Low => 0,
      Self::Medium => 1,
      Self::High => 2,
      Self::Critical => 3,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Low => "LOW",
      Self::Medium => "MEDIUM",
      Self::High => "HIGH",
      Self::Critical => "CRITICAL",
    }
  }
}

impl fmt::Display for RiskCategory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeploymentStrategy {
  Standard,
  Canary,
  BlueGreen,
  Progressive,
}

impl DeploymentStrategy {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Standard => "STANDARD",
      Self::Canary => "CANARY",
      Self::BlueGreen => "BLUE_GREEN",
      Self::Progressive => "PROGRESSIVE",
    }
  }
}

impl fmt::Display for DeploymentStrategy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ---------------------------------------------------------------------------
// Output types (JSON contract — what we emit)
// ---------------------------------------------------------------------------

/// Full assessment for one commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
  pub assessment_id: String,
  pub commit_id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub committed_at: Option<String>,
  /// Exact weighted sum of `factors`; not rounded.
  pub overall_score: f64,
  pub category: RiskCategory,
  pub factors: FactorSet,
  pub recommended_strategy: DeploymentStrategy,
  pub requires_dual_approval: bool,
  pub monitoring_hours: u32,
  pub recommendations: Vec<String>,
}

// ---------------------------------------------------------------------------
// CLI stream wrappers
// ---------------------------------------------------------------------------

/// Structured error output for invalid input objects.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub commit_id: Option<String>,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      field: None,
      commit_id: None,
    }
  }

  pub fn with_field(mut self, field: impl Into<String>) -> Self {
    self.field = Some(field.into());
    self
  }

  pub fn with_commit(mut self, commit_id: impl Into<String>) -> Self {
    let id = commit_id.into();
    if !id.is_empty() {
      self.commit_id = Some(id);
    }
    self
  }
}
