//! Engine configuration with sane defaults, file loading, and validation.
//!
//! A configuration is validated once, when it is loaded or handed to an
//! engine. Evaluation never re-checks it and never mutates it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::EngineError;
use crate::types::{DeploymentStrategy, FactorKind, RiskCategory};

/// Allowed drift of the weight sum away from 1.0.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Weight of each factor in the overall score. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FactorWeights {
  pub semantic_type: f64,
  pub path_criticality: f64,
  pub change_magnitude: f64,
  pub historical_pattern: f64,
}

impl Default for FactorWeights {
  fn default() -> Self {
    Self {
      semantic_type: 0.4,
      path_criticality: 0.3,
      change_magnitude: 0.2,
      historical_pattern: 0.1,
    }
  }
}

impl FactorWeights {
  pub fn get(&self, kind: FactorKind) -> f64 {
    match kind {
      FactorKind::SemanticType => self.semantic_type,
      FactorKind::PathCriticality => self.path_criticality,
      FactorKind::ChangeMagnitude => self.change_magnitude,
      FactorKind::HistoricalPattern => self.historical_pattern,
    }
  }

  pub fn sum(&self) -> f64 {
    FactorKind::ALL.iter().map(|k| self.get(*k)).sum()
  }
}

/// Lower bounds (inclusive) of MEDIUM, HIGH and CRITICAL. LOW starts at 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
  pub medium: f64,
  pub high: f64,
  pub critical: f64,
}

impl Default for Thresholds {
  fn default() -> Self {
    Self {
      medium: 25.0,
      high: 50.0,
      critical: 75.0,
    }
  }
}

/// Rollout policy attached to one risk category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrategyRule {
  pub strategy: DeploymentStrategy,
  #[serde(default)]
  pub dual_approval: bool,
  #[serde(default = "default_monitoring_hours")]
  pub monitoring_hours: u32,
}

fn default_monitoring_hours() -> u32 {
  24
}

impl StrategyRule {
  pub const fn new(strategy: DeploymentStrategy, dual_approval: bool, monitoring_hours: u32) -> Self {
    Self {
      strategy,
      dual_approval,
      monitoring_hours,
    }
  }
}

/// Category -> rule. Complete by construction: one rule per category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyTable([StrategyRule; 4]);

impl Default for StrategyTable {
  fn default() -> Self {
    Self([
      StrategyRule::new(DeploymentStrategy::Standard, false, 1),
      StrategyRule::new(DeploymentStrategy::Canary, false, 24),
      StrategyRule::new(DeploymentStrategy::BlueGreen, true, 24),
      StrategyRule::new(DeploymentStrategy::Progressive, true, 48),
    ])
  }
}

impl StrategyTable {
  pub fn new(low: StrategyRule, medium: StrategyRule, high: StrategyRule, critical: StrategyRule) -> Self {
    Self([low, medium, high, critical])
  }

  pub fn rule(&self, category: RiskCategory) -> &StrategyRule {
    &self.0[category.index()]
  }

  /// Build from a file-level map; every category must be present.
  pub fn from_map(map: &BTreeMap<RiskCategory, StrategyRule>) -> Result<Self, EngineError> {
    let mut rules = Self::default().0;
    let mut missing = Vec::new();
    for category in RiskCategory::ALL {
      match map.get(&category) {
        Some(rule) => rules[category.index()] = *rule,
        None => missing.push(category.as_str()),
      }
    }
    if !missing.is_empty() {
      return Err(EngineError::configuration(format!(
        "strategy table incomplete: missing {}",
        missing.join(", ")
      )));
    }
    Ok(Self(rules))
  }
}

/// Immutable scoring configuration, injected into every evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskConfiguration {
  pub weights: FactorWeights,
  pub thresholds: Thresholds,
  /// Path prefixes whose modification is inherently higher risk.
  pub critical_paths: Vec<String>,
  pub strategies: StrategyTable,
}

impl Default for RiskConfiguration {
  fn default() -> Self {
    Self {
      weights: FactorWeights::default(),
      thresholds: Thresholds::default(),
      critical_paths: default_critical_paths(),
      strategies: StrategyTable::default(),
    }
  }
}

pub fn default_critical_paths() -> Vec<String> {
  [
    "payment-gateway",
    "auth-service",
    "patient-data",
    "patient-data-service",
    "phi-service",
    "medical-device",
  ]
  .iter()
  .map(|s| s.to_string())
  .collect()
}

/// On-disk shape. Every section is optional and falls back to the default.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
  #[serde(default)]
  weights: Option<FactorWeights>,
  #[serde(default)]
  thresholds: Option<Thresholds>,
  #[serde(default)]
  critical_paths: Option<Vec<String>>,
  #[serde(default)]
  strategies: Option<BTreeMap<RiskCategory, StrategyRule>>,
}

impl RiskConfiguration {
  /// Load from a YAML or JSON file (`.json` extension selects JSON) and validate.
  pub fn load(path: &Path) -> Result<Self, EngineError> {
    let raw = std::fs::read_to_string(path)?;
    let is_json = path
      .extension()
      .and_then(|e| e.to_str())
      .map(|e| e.eq_ignore_ascii_case("json"))
      .unwrap_or(false);
    let config = if is_json {
      Self::from_json_str(&raw)?
    } else {
      Self::from_yaml_str(&raw)?
    };
    tracing::debug!(path = %path.display(), "loaded risk configuration");
    Ok(config)
  }

  pub fn from_yaml_str(raw: &str) -> Result<Self, EngineError> {
    let file: ConfigFile = if raw.trim().is_empty() {
      ConfigFile::default()
    } else {
      serde_yaml::from_str(raw)?
    };
    Self::from_file(file)
  }

  pub fn from_json_str(raw: &str) -> Result<Self, EngineError> {
    let file: ConfigFile = serde_json::from_str(raw)?;
    Self::from_file(file)
  }

  fn from_file(file: ConfigFile) -> Result<Self, EngineError> {
    let defaults = Self::default();
    let strategies = match &file.strategies {
      Some(map) => StrategyTable::from_map(map)?,
      None => defaults.strategies,
    };
    let config = Self {
      weights: file.weights.unwrap_or(defaults.weights),
      thresholds: file.thresholds.unwrap_or(defaults.thresholds),
      critical_paths: file.critical_paths.unwrap_or(defaults.critical_paths),
      strategies,
    };
    config.validate()?;
    Ok(config)
  }

  /// Fail fast on any misconfiguration; never silently corrects.
  pub fn validate(&self) -> Result<(), EngineError> {
    for kind in FactorKind::ALL {
      let w = self.weights.get(kind);
      if !w.is_finite() || !(0.0..=1.0).contains(&w) {
        return Err(EngineError::configuration(format!(
          "weight {} = {}, expected a value in [0, 1]",
          kind, w
        )));
      }
    }
    let sum = self.weights.sum();
    if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
      return Err(EngineError::configuration(format!(
        "weights sum to {}, expected 1.0",
        (sum * 1e6).round() / 1e6
      )));
    }

    let t = &self.thresholds;
    let finite = t.medium.is_finite() && t.high.is_finite() && t.critical.is_finite();
    if !finite || !(0.0 < t.medium && t.medium < t.high && t.high < t.critical && t.critical <= 100.0) {
      return Err(EngineError::configuration(format!(
        "thresholds must satisfy 0 < medium < high < critical <= 100, got medium {}, high {}, critical {}",
        t.medium, t.high, t.critical
      )));
    }

    if let Some(i) = self
      .critical_paths
      .iter()
      .position(|p| p.trim().trim_matches('/').is_empty())
    {
      return Err(EngineError::configuration(format!(
        "critical_paths[{}] is blank",
        i
      )));
    }
    Ok(())
  }
}

/// Hot-reload handle. Readers take an `Arc` snapshot; reloads swap the pointer.
#[derive(Debug, Clone)]
pub struct SharedConfig {
  inner: Arc<RwLock<Arc<RiskConfiguration>>>,
}

impl SharedConfig {
  pub fn new(config: RiskConfiguration) -> Result<Self, EngineError> {
    config.validate()?;
    Ok(Self {
      inner: Arc::new(RwLock::new(Arc::new(config))),
    })
  }

  pub fn snapshot(&self) -> Arc<RiskConfiguration> {
    let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(&*guard)
  }

  /// Validate then swap. On error the current configuration stays in place.
  pub fn replace(&self, config: RiskConfiguration) -> Result<Arc<RiskConfiguration>, EngineError> {
    config.validate()?;
    let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
    let previous = std::mem::replace(&mut *guard, Arc::new(config));
    tracing::info!("risk configuration replaced");
    Ok(previous)
  }

  pub fn reload_from(&self, path: &Path) -> Result<(), EngineError> {
    let config = RiskConfiguration::load(path)?;
    self.replace(config).map(|_| ())
  }
}
