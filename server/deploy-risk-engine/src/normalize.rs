//! Normalize inbound commits into canonical CommitChange models.

use chrono::{DateTime, Utc};

use crate::error::EngineError;
use crate::types::{CommitChange, InboundCommit};

/// Parse and normalize an InboundCommit into a canonical CommitChange.
///
/// Only structural absence is an error: a missing/`null` file list or an
/// unparsable timestamp. Empty strings and empty lists are valid.
pub fn normalize(raw: &InboundCommit) -> Result<CommitChange, EngineError> {
  let files = raw
    .files_changed
    .as_ref()
    .ok_or_else(|| EngineError::invalid_input("files_changed", "must be present (may be empty)"))?;

  let timestamp = match raw.timestamp.as_deref().map(str::trim) {
    Some(t) if !t.is_empty() => Some(
      DateTime::parse_from_rfc3339(t)
        .map_err(|e| EngineError::invalid_input("timestamp", &format!("invalid RFC3339: {}", e)))?
        .with_timezone(&Utc),
    ),
    _ => None,
  };

  Ok(CommitChange {
    commit_id: raw.commit_id.trim().to_string(),
    author: raw.author.trim().to_string(),
    message: raw.message.clone(),
    timestamp,
    files_changed: normalize_files(files),
    lines_added: raw.lines_added,
    lines_deleted: raw.lines_deleted,
  })
}

/// Normalize every path, drop blanks, collapse duplicates (first occurrence wins).
pub fn normalize_files<I, S>(files: I) -> Vec<String>
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
{
  let mut out: Vec<String> = Vec::new();
  for f in files {
    let p = normalize_path(f.as_ref());
    if !p.is_empty() && !out.contains(&p) {
      out.push(p);
    }
  }
  out
}

/// Key used for historical profile lookups.
pub fn author_key(author: &str) -> String {
  author.trim().to_ascii_lowercase()
}

/// Normalize a file path for stable comparison:
/// - backslash -> forward slash
/// - collapse repeated slashes
/// - strip leading ./
/// - lowercase
pub fn normalize_path(p: &str) -> String {
  let s = p.trim().replace('\\', "/");
  let mut out = String::with_capacity(s.len());
  let mut prev_slash = false;
  for ch in s.chars() {
    if ch == '/' {
      if !prev_slash {
        out.push('/');
      }
      prev_slash = true;
    } else {
      prev_slash = false;
      out.push(ch);
    }
  }
  let mut trimmed = out.as_str();
  while let Some(rest) = trimmed.strip_prefix("./") {
    trimmed = rest;
  }
  trimmed.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn inbound(files: Option<Vec<&str>>) -> InboundCommit {
    InboundCommit {
      commit_id: " abc123 ".into(),
      author: "Dev@Example.com".into(),
      message: "fix: thing".into(),
      timestamp: Some("2025-01-15T10:30:00Z".into()),
      files_changed: files.map(|v| v.into_iter().map(String::from).collect()),
      lines_added: 3,
      lines_deleted: 1,
    }
  }

  #[test]
  fn normalize_path_basics() {
    assert_eq!(normalize_path("src\\auth\\jwt.go"), "src/auth/jwt.go");
    assert_eq!(normalize_path("./src//utils/index.ts"), "src/utils/index.ts");
    assert_eq!(normalize_path("SRC/App.tsx"), "src/app.tsx");
    assert_eq!(normalize_path("  "), "");
  }

  #[test]
  fn normalize_rejects_missing_files() {
    let err = normalize(&inbound(None)).unwrap_err();
    assert!(err.is_invalid_input());
    assert!(err.to_string().contains("files_changed"));
  }

  #[test]
  fn normalize_accepts_empty_files() {
    let change = normalize(&inbound(Some(vec![]))).unwrap();
    assert!(change.files_changed.is_empty());
  }

  #[test]
  fn normalize_rejects_bad_timestamp() {
    let mut raw = inbound(Some(vec!["a.rs"]));
    raw.timestamp = Some("yesterday".into());
    let err = normalize(&raw).unwrap_err();
    assert!(err.to_string().contains("timestamp"));
  }

  #[test]
  fn normalize_valid_commit() {
    let change = normalize(&inbound(Some(vec!["Src/A.rs", "src/a.rs", "", "docs/x.md"]))).unwrap();
    assert_eq!(change.commit_id, "abc123");
    assert_eq!(change.files_changed, vec!["src/a.rs", "docs/x.md"]);
    assert_eq!(change.lines_changed(), 4);
    assert!(change.timestamp.is_some());
  }

  #[test]
  fn author_key_is_case_insensitive() {
    assert_eq!(author_key("  Dev@Example.com "), "dev@example.com");
  }
}
