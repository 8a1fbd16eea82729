//! Structured error types for the risk engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
  /// Required input is structurally absent or unparsable. Never recovered internally.
  #[error("invalid input: {field}: {reason}")]
  InvalidInput { field: String, reason: String },

  /// Weights, thresholds, or the strategy table are unusable. Fatal at load time.
  #[error("configuration: {0}")]
  Configuration(String),

  /// A factor set that is not one factor per kind under the configured weights.
  #[error("factor set: {0}")]
  FactorSet(String),

  #[error("io: {0}")]
  Io(#[from] std::io::Error),

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),

  #[error("yaml: {0}")]
  Yaml(#[from] serde_yaml::Error),
}

impl EngineError {
  pub fn invalid_input(field: &str, reason: &str) -> Self {
    Self::InvalidInput {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }

  pub fn configuration(msg: impl Into<String>) -> Self {
    Self::Configuration(msg.into())
  }

  pub fn factor_set(msg: impl Into<String>) -> Self {
    Self::FactorSet(msg.into())
  }

  pub fn is_invalid_input(&self) -> bool {
    matches!(self, Self::InvalidInput { .. })
  }
}
