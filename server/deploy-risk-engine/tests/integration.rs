//! Integration tests for the deployment risk engine.

use deploy_risk_engine::config::FactorWeights;
use deploy_risk_engine::types::FactorSet;
use deploy_risk_engine::{
  change_type, history, risk, score, CommitChange, DeploymentStrategy, Engine, FactorKind,
  HistoricalProfile, InMemoryHistory, InboundCommit, NoHistory, RiskCategory, RiskConfiguration,
};

fn parse(json: &str) -> InboundCommit {
  serde_json::from_str(json).unwrap()
}

fn payment_fix() -> InboundCommit {
  parse(
    r#"{
      "commit_id": "9f8e7d6",
      "author": "senior@example.com",
      "message": "fix: correct rounding error in transaction processor",
      "timestamp": "2025-01-15T10:30:00Z",
      "files_changed": [
        "services/payment-gateway/processor.go",
        "services/common/money.go",
        "services/common/money_test.go",
        "docs/payments.md"
      ],
      "lines_added": 60,
      "lines_deleted": 20
    }"#,
  )
}

fn phi_security() -> InboundCommit {
  parse(
    r#"{
      "commit_id": "c0ffee1",
      "author": "flaky@example.com",
      "message": "security: rotate encryption keys",
      "files_changed": ["services/phi-service/encryption.go"],
      "lines_added": 150,
      "lines_deleted": 50
    }"#,
  )
}

fn profiles() -> InMemoryHistory {
  InMemoryHistory::new()
    .with_profile(
      "senior@example.com",
      HistoricalProfile {
        success_rate: 0.95,
        revert_count: 0,
      },
    )
    .with_profile(
      "flaky@example.com",
      HistoricalProfile {
        success_rate: 0.6,
        revert_count: 3,
      },
    )
}

#[test]
fn docs_only_commit_is_low_risk() {
  let raw = parse(
    r#"{
      "commit_id": "d0c5",
      "author": "first-timer@example.com",
      "message": "docs: update install instructions",
      "files_changed": ["docs/README.md"],
      "lines_added": 4,
      "lines_deleted": 1
    }"#,
  );
  let result = Engine::with_defaults().evaluate_inbound(&raw, &profiles()).unwrap();

  assert_eq!(result.category, RiskCategory::Low);
  assert_eq!(result.recommended_strategy, DeploymentStrategy::Standard);
  assert!(!result.requires_dual_approval);
  assert_eq!(
    result.factors.get(FactorKind::HistoricalPattern).raw_score,
    history::NEUTRAL_HISTORY_SCORE
  );
}

#[test]
fn payment_fix_by_reliable_author_goes_blue_green() {
  let result = Engine::with_defaults()
    .evaluate_inbound(&payment_fix(), &profiles())
    .unwrap();

  // 70*0.4 + 55*0.3 + ~51.25*0.2 + 5*0.1 ≈ 55.25
  assert!(
    (result.overall_score - 55.25).abs() < 0.01,
    "score {}",
    result.overall_score
  );
  assert_eq!(result.category, RiskCategory::High);
  assert_eq!(result.recommended_strategy, DeploymentStrategy::BlueGreen);
  assert!(result.requires_dual_approval);
}

#[test]
fn phi_security_change_by_unreliable_author_is_critical() {
  let result = Engine::with_defaults()
    .evaluate_inbound(&phi_security(), &profiles())
    .unwrap();

  assert_eq!(result.category, RiskCategory::Critical);
  assert_eq!(result.recommended_strategy, DeploymentStrategy::Progressive);
  assert!(result.requires_dual_approval);
  assert_eq!(result.monitoring_hours, 48);
  assert!((result.factors.get(FactorKind::HistoricalPattern).raw_score - 70.0).abs() < 1e-9);
}

#[test]
fn factor_computation_order_does_not_matter() {
  let engine = Engine::with_defaults();
  let change = CommitChange::new(
    "c0ffee1",
    "flaky@example.com",
    "security: rotate encryption keys",
    ["services/phi-service/encryption.go"],
  )
  .with_lines(150, 50);
  let profile = HistoricalProfile {
    success_rate: 0.6,
    revert_count: 3,
  };
  let w = FactorWeights::default();
  let crit = &engine.config().critical_paths;

  // Reverse order of computation.
  let reversed = vec![
    history::evaluate_historical_pattern(&change.author, Some(&profile), w.historical_pattern),
    score::evaluate_change_magnitude(&change.files_changed, 150, 50, w.change_magnitude),
    risk::evaluate_path_criticality(&change.files_changed, crit, w.path_criticality),
    change_type::evaluate_semantic_type(&change.message, w.semantic_type),
  ];
  let assembled = engine
    .assess(&change, FactorSet::from_unordered(reversed).unwrap())
    .unwrap();
  let direct = engine.evaluate(&change, Some(&profile));
  assert_eq!(assembled, direct);
}

#[test]
fn concurrent_evaluations_agree() {
  let engine = Engine::with_defaults();
  let store = profiles();
  let expected = engine.evaluate_inbound(&payment_fix(), &store).unwrap();

  std::thread::scope(|s| {
    let handles: Vec<_> = (0..8)
      .map(|_| s.spawn(|| engine.evaluate_inbound(&payment_fix(), &store).unwrap()))
      .collect();
    for h in handles {
      assert_eq!(h.join().unwrap(), expected);
    }
  });
}

#[test]
fn deterministic_output_across_runs() {
  let r1 = Engine::with_defaults().evaluate_inbound(&phi_security(), &profiles()).unwrap();
  let r2 = Engine::with_defaults().evaluate_inbound(&phi_security(), &profiles()).unwrap();
  assert_eq!(r1.overall_score.to_bits(), r2.overall_score.to_bits());
  assert_eq!(
    serde_json::to_string(&r1).unwrap(),
    serde_json::to_string(&r2).unwrap(),
    "Same inputs must produce identical JSON output"
  );
}

#[test]
fn empty_file_list_is_valid_with_minimum_magnitude() {
  let raw = parse(r#"{"commit_id": "e", "message": "chore: empty", "files_changed": []}"#);
  let result = Engine::with_defaults().evaluate_inbound(&raw, &NoHistory).unwrap();
  assert_eq!(
    result.factors.get(FactorKind::ChangeMagnitude).raw_score,
    score::MIN_MAGNITUDE_SCORE
  );
  assert_eq!(
    result.factors.get(FactorKind::PathCriticality).raw_score,
    risk::NON_CRITICAL_FLOOR
  );
}

#[test]
fn null_or_missing_file_list_is_rejected() {
  let engine = Engine::with_defaults();
  for json in [
    r#"{"commit_id": "n", "message": "fix: x", "files_changed": null}"#,
    r#"{"commit_id": "n", "message": "fix: x"}"#,
  ] {
    let err = engine.evaluate_inbound(&parse(json), &NoHistory).unwrap_err();
    assert!(err.is_invalid_input(), "{}", err);
    assert!(err.to_string().contains("files_changed"));
  }
}

#[test]
fn engineered_scores_land_on_boundaries() {
  // Only the semantic factor counts, so the overall score equals its raw score.
  let engine = Engine::new(RiskConfiguration {
    weights: FactorWeights {
      semantic_type: 1.0,
      path_criticality: 0.0,
      change_magnitude: 0.0,
      historical_pattern: 0.0,
    },
    ..RiskConfiguration::default()
  })
  .unwrap();

  let cases = [
    ("style!: reformat", 25.0, RiskCategory::Medium),
    ("unclassified change", 50.0, RiskCategory::High),
    ("feat!: drop legacy api", 75.0, RiskCategory::Critical),
    ("refactor: split module", 45.0, RiskCategory::Medium),
  ];
  for (message, expected, category) in cases {
    let change = CommitChange::new("b", "", message, ["src/lib.rs"]);
    let result = engine.evaluate(&change, None);
    assert_eq!(result.overall_score, expected, "{}", message);
    assert_eq!(result.category, category, "{}", message);
  }
}

#[test]
fn result_json_contract() {
  let result = Engine::with_defaults().evaluate_inbound(&payment_fix(), &profiles()).unwrap();
  let v: serde_json::Value = serde_json::to_value(&result).unwrap();

  assert_eq!(v["category"], "HIGH");
  assert_eq!(v["recommended_strategy"], "BLUE_GREEN");
  assert_eq!(v["requires_dual_approval"], true);
  assert_eq!(v["committed_at"], "2025-01-15T10:30:00+00:00");
  let factors = v["factors"].as_array().unwrap();
  let names: Vec<_> = factors.iter().map(|f| f["name"].as_str().unwrap()).collect();
  assert_eq!(
    names,
    ["semantic_type", "path_criticality", "change_magnitude", "historical_pattern"]
  );
  for f in factors {
    assert!(f["raw_score"].is_number());
    assert!(f["weight"].is_number());
    assert!(f["rationale"].is_string());
  }

  let back: deploy_risk_engine::RiskResult = serde_json::from_value(v).unwrap();
  assert_eq!(back.assessment_id, result.assessment_id);
  assert_eq!(back.category, result.category);
}

#[test]
fn reordered_factors_json_keeps_lookup_by_kind() {
  let result = Engine::with_defaults().evaluate_inbound(&payment_fix(), &profiles()).unwrap();
  let mut v = serde_json::to_value(&result).unwrap();
  v["factors"].as_array_mut().unwrap().reverse();

  let back: deploy_risk_engine::RiskResult = serde_json::from_value(v).unwrap();
  for kind in FactorKind::ALL {
    assert_eq!(back.factors.get(kind).name, kind);
    assert_eq!(back.factors.get(kind).rationale, result.factors.get(kind).rationale);
  }
  let names: Vec<_> = back.factors.iter().map(|f| f.name).collect();
  assert_eq!(names, FactorKind::ALL.to_vec());
}

#[test]
fn factors_json_missing_a_kind_is_rejected() {
  let result = Engine::with_defaults().evaluate_inbound(&payment_fix(), &profiles()).unwrap();
  let mut v = serde_json::to_value(&result).unwrap();
  v["factors"].as_array_mut().unwrap().pop();

  let err = serde_json::from_value::<deploy_risk_engine::RiskResult>(v).unwrap_err();
  assert!(err.to_string().contains("missing factor historical_pattern"), "{}", err);
}

#[test]
fn unknown_fields_are_ignored() {
  let raw = parse(
    r#"{
      "commit_id": "u",
      "files_changed": ["src/a.rs"],
      "diff_text": "+ fn main() {}",
      "another": 42
    }"#,
  );
  assert!(Engine::with_defaults().evaluate_inbound(&raw, &NoHistory).is_ok());
}

#[test]
fn yaml_config_changes_critical_paths() {
  let config = RiskConfiguration::from_yaml_str("critical_paths:\n  - docs\n").unwrap();
  let engine = Engine::new(config).unwrap();
  let change = CommitChange::new("y", "", "docs: x", ["docs/README.md"]);
  let result = engine.evaluate(&change, None);
  assert_eq!(result.factors.get(FactorKind::PathCriticality).raw_score, 100.0);
}

#[test]
fn shipped_config_matches_defaults() {
  let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config/risk-engine.yaml");
  let loaded = RiskConfiguration::load(&path).unwrap();
  assert_eq!(loaded, RiskConfiguration::default());
}

#[test]
fn hot_reload_keeps_in_flight_snapshot() {
  let shared = deploy_risk_engine::SharedConfig::new(RiskConfiguration::default()).unwrap();
  let before = Engine::from_shared(&shared);

  shared
    .replace(RiskConfiguration {
      critical_paths: vec!["docs".into()],
      ..RiskConfiguration::default()
    })
    .unwrap();
  let after = Engine::from_shared(&shared);

  let change = CommitChange::new("h", "", "docs: x", ["docs/README.md"]);
  let old = before.evaluate(&change, None);
  let new = after.evaluate(&change, None);
  assert_eq!(old.factors.get(FactorKind::PathCriticality).raw_score, risk::NON_CRITICAL_FLOOR);
  assert_eq!(new.factors.get(FactorKind::PathCriticality).raw_score, 100.0);
}
