//! Deployment Risk Engine — deterministic, rule-based commit risk scoring.
//!
//! Scores a commit from four weighted factors (semantic type, path
//! criticality, change magnitude, author history), classifies the overall
//! score into LOW/MEDIUM/HIGH/CRITICAL, and maps the category to a rollout
//! strategy and approval requirement.
//!
//! No AI, no DB, no network; pure computation over an immutable configuration.

pub mod change_type;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod normalize;
pub mod report;
pub mod risk;
pub mod score;
pub mod strategy;
pub mod types;

pub use config::{RiskConfiguration, SharedConfig};
pub use engine::Engine;
pub use error::EngineError;
pub use history::{HistoryStore, InMemoryHistory, NoHistory};
pub use types::{
  CommitChange, DeploymentStrategy, FactorKind, HistoricalProfile, InboundCommit, RiskCategory,
  RiskFactor, RiskResult,
};

/// Evaluate one inbound commit with the default configuration and no history.
pub fn run(input: &InboundCommit) -> Result<RiskResult, EngineError> {
  Engine::with_defaults().evaluate_inbound(input, &NoHistory)
}
