//! Semantic change type derived from the commit message.
//!
//! One lookup table drives both classification paths: a conventional-commit
//! prefix (`fix(api): ...`) wins; otherwise the first table entry whose name
//! or alias appears as a whole word in the message is used.

use crate::types::{FactorKind, RiskFactor};

/// Score for a message with no recognized type.
pub const DEFAULT_SEMANTIC_SCORE: f64 = 50.0;
/// Added for `type!:` or a `BREAKING CHANGE` footer, capped at 100.
pub const BREAKING_CHANGE_BONUS: f64 = 15.0;

/// (type, base score, aliases), in keyword-scan priority order.
const SEMANTIC_TABLE: &[(&str, f64, &[&str])] = &[
  ("security", 90.0, &["sec"]),
  ("hotfix", 85.0, &[]),
  ("revert", 70.0, &[]),
  ("fix", 70.0, &["bugfix"]),
  ("perf", 55.0, &[]),
  ("feat", 60.0, &["feature"]),
  ("refactor", 45.0, &[]),
  ("build", 40.0, &[]),
  ("ci", 30.0, &[]),
  ("test", 20.0, &["tests"]),
  ("chore", 15.0, &[]),
  ("style", 10.0, &[]),
  ("docs", 5.0, &["doc"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
  Prefix,
  Keyword,
  Default,
}

/// Outcome of classifying one message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SemanticClass {
  /// Canonical type name, `None` when unrecognized.
  pub change_type: Option<&'static str>,
  pub base_score: f64,
  pub breaking: bool,
  pub source: MatchSource,
}

impl SemanticClass {
  pub fn score(&self) -> f64 {
    let bonus = if self.breaking { BREAKING_CHANGE_BONUS } else { 0.0 };
    (self.base_score + bonus).min(100.0)
  }
}

fn lookup(word: &str) -> Option<(&'static str, f64)> {
  SEMANTIC_TABLE
    .iter()
    .find(|(name, _, aliases)| *name == word || aliases.contains(&word))
    .map(|(name, score, _)| (*name, *score))
}

/// Base score for a recognized type name or alias.
pub fn base_score(change_type: &str) -> Option<f64> {
  lookup(&change_type.to_ascii_lowercase()).map(|(_, s)| s)
}

/// Parse `type(scope)!: subject` from the first line. Returns (type, bang).
fn conventional_prefix(first_line: &str) -> Option<(&str, bool)> {
  let (head, _) = first_line.split_once(':')?;
  let head = head.trim();
  let (head, bang) = match head.strip_suffix('!') {
    Some(h) => (h, true),
    None => (head, false),
  };
  let ty = match head.find('(') {
    Some(i) if head.ends_with(')') => &head[..i],
    Some(_) => return None,
    None => head,
  };
  let ty = ty.trim();
  if ty.is_empty() || !ty.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
    return None;
  }
  Some((ty, bang))
}

/// Classify a commit message. Never fails; empty input gets the default.
pub fn classify_message(message: &str) -> SemanticClass {
  let lower = message.to_ascii_lowercase();
  let first_line = lower.lines().next().unwrap_or("").trim();
  let footer_breaking = lower.contains("breaking change") || lower.contains("breaking-change");

  if let Some((ty, bang)) = conventional_prefix(first_line) {
    if let Some((name, score)) = lookup(ty) {
      return SemanticClass {
        change_type: Some(name),
        base_score: score,
        breaking: bang || footer_breaking,
        source: MatchSource::Prefix,
      };
    }
  }

  let words: Vec<&str> = lower
    .split(|c: char| !c.is_ascii_alphanumeric())
    .filter(|w| !w.is_empty())
    .collect();
  let hit = SEMANTIC_TABLE
    .iter()
    .find(|(name, _, aliases)| words.iter().any(|w| w == name || aliases.contains(w)));

  match hit {
    Some((name, score, _)) => SemanticClass {
      change_type: Some(*name),
      base_score: *score,
      breaking: footer_breaking,
      source: MatchSource::Keyword,
    },
    None => SemanticClass {
      change_type: None,
      base_score: DEFAULT_SEMANTIC_SCORE,
      breaking: footer_breaking,
      source: MatchSource::Default,
    },
  }
}

/// SemanticType factor for a commit message.
pub fn evaluate_semantic_type(message: &str, weight: f64) -> RiskFactor {
  let class = classify_message(message);
  let mut rationale = match (class.source, class.change_type) {
    (MatchSource::Prefix, Some(t)) => format!("Conventional type '{}' (base {})", t, class.base_score),
    (MatchSource::Keyword, Some(t)) => format!("Keyword '{}' in message (base {})", t, class.base_score),
    _ => format!("No recognized change type (default {})", DEFAULT_SEMANTIC_SCORE),
  };
  if class.breaking {
    rationale.push_str(&format!("; breaking change +{}", BREAKING_CHANGE_BONUS));
  }
  RiskFactor::new(FactorKind::SemanticType, class.score(), weight, rationale)
}
