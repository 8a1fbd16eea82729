//! Binary entrypoint: read JSON lines from stdin, write one line per commit to stdout.
//!
//! Each input line is an InboundCommit; an object may also span several
//! lines. A malformed object yields an error line and the next one is still
//! scored. Each output line is either:
//! - A RiskResult (or a text report with `--format text`)
//! - An ErrorOutput (when the commit fails to parse or validate)
//!
//! Exit codes: 0 all commits scored, 1 at least one invalid commit,
//! 2 configuration or I/O failure.

use clap::{Parser, ValueEnum};
use deploy_risk_engine::types::ErrorOutput;
use deploy_risk_engine::{
  report, Engine, EngineError, HistoryStore, InMemoryHistory, InboundCommit, NoHistory,
  RiskConfiguration,
};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Score commit deployment risk and recommend a rollout strategy.
#[derive(Parser)]
#[command(name = "deploy-risk-engine", version, about, long_about = None)]
struct Cli {
  /// Risk configuration file (YAML, or JSON when the extension is .json)
  #[arg(long, env = "RISK_ENGINE_CONFIG")]
  config: Option<PathBuf>,

  /// Historical author profiles (JSON object keyed by author)
  #[arg(long, env = "RISK_ENGINE_HISTORY")]
  history: Option<PathBuf>,

  /// Write results to this file instead of stdout
  #[arg(long, short)]
  output: Option<PathBuf>,

  /// Output format
  #[arg(long, value_enum, default_value_t = Format::Json)]
  format: Format,

  /// Validate the configuration and exit
  #[arg(long)]
  check_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
  Json,
  Text,
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();
  let code = match run_binary(&cli) {
    Ok(code) => code,
    Err(e) => {
      let _ = writeln!(io::stderr(), "deploy-risk-engine error: {}", e);
      2
    }
  };
  std::process::exit(code);
}

fn run_binary(cli: &Cli) -> Result<i32, EngineError> {
  let config = match &cli.config {
    Some(path) => RiskConfiguration::load(path)?,
    None => RiskConfiguration::default(),
  };
  let engine = Engine::new(config)?;

  if cli.check_config {
    let c = engine.config();
    println!(
      "configuration ok: thresholds {}/{}/{}, {} critical paths",
      c.thresholds.medium,
      c.thresholds.high,
      c.thresholds.critical,
      c.critical_paths.len()
    );
    return Ok(0);
  }

  let history: Box<dyn HistoryStore> = match &cli.history {
    Some(path) => Box::new(InMemoryHistory::load(path)?),
    None => Box::new(NoHistory),
  };

  let sink: Box<dyn Write> = match &cli.output {
    Some(path) => Box::new(File::create(path)?),
    None => Box::new(io::stdout().lock()),
  };
  let mut out = BufWriter::new(sink);
  let mut any_invalid = false;
  let mut pending = String::new();

  for line in io::stdin().lock().lines() {
    let line = line?;
    if pending.is_empty() && line.trim().is_empty() {
      continue;
    }
    pending.push_str(&line);
    pending.push('\n');

    // An object may span several lines; keep reading until it closes.
    let raw: InboundCommit = match serde_json::from_str(&pending) {
      Ok(v) => v,
      Err(e) if e.is_eof() => continue,
      Err(e) => {
        any_invalid = true;
        pending.clear();
        write_line(&mut out, &ErrorOutput::new(format!("json parse: {}", e)))?;
        continue;
      }
    };
    pending.clear();

    match engine.evaluate_inbound(&raw, &*history) {
      Ok(result) => match cli.format {
        Format::Json => write_line(&mut out, &result)?,
        Format::Text => write!(out, "{}", report::render_text(&result))?,
      },
      Err(e) => {
        any_invalid = true;
        let err = match &e {
          EngineError::InvalidInput { field, reason } => {
            ErrorOutput::new(reason.clone()).with_field(field.clone())
          }
          _ => ErrorOutput::new(e.to_string()),
        };
        write_line(&mut out, &err.with_commit(raw.commit_id.clone()))?;
      }
    }
  }

  if !pending.trim().is_empty() {
    any_invalid = true;
    write_line(&mut out, &ErrorOutput::new("json parse: unexpected end of input"))?;
  }

  out.flush()?;
  Ok(if any_invalid { 1 } else { 0 })
}

fn write_line<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<(), EngineError> {
  serde_json::to_writer(&mut *out, value)?;
  writeln!(out)?;
  Ok(())
}
