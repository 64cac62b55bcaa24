//! Binary entrypoint: read JSON lines from stdin, write JSON lines to stdout.
//!
//! Each input line is a RelatedRequest (`{"tool", "slug", "limit"?}`). Output
//! lines are either:
//! - A RelatedReport
//! - An ErrorOutput (bad JSON, unknown target, invalid record)
//!
//! The catalog comes from RELATED_ENGINE_CATALOG (dataset JSON file) or the
//! bundled static dataset. Logs go to stderr.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use related_engine::types::{ErrorOutput, RelatedRequest};
use related_engine::{Catalog, Engine, EngineError};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  if let Err(e) = run() {
    error!("related-engine: {}", e);
    std::process::exit(1);
  }
}

fn load_catalog() -> Result<Catalog, EngineError> {
  match std::env::var("RELATED_ENGINE_CATALOG") {
    Ok(path) => {
      info!(%path, "loading catalog file");
      Catalog::from_path(Path::new(&path))
    }
    Err(_) => Catalog::builtin(),
  }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
  let catalog = load_catalog()?;
  info!(records = catalog.len(), "catalog ready");
  let engine = Engine::with_defaults(Arc::new(catalog));

  let stdin = io::stdin();
  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());

  for line in stdin.lock().lines() {
    let line = line?;

    // Skip blank lines.
    let trimmed = line.trim();
    if trimmed.is_empty() {
      continue;
    }

    let request: RelatedRequest = match serde_json::from_str(trimmed) {
      Ok(v) => v,
      Err(e) => {
        write_line(&mut out, &ErrorOutput::new(format!("json parse: {}", e)))?;
        continue;
      }
    };

    match engine.related(&request.tool, &request.slug, request.limit) {
      Ok(report) => write_line(&mut out, &report)?,
      Err(e) => {
        let err = match &e {
          EngineError::Validation { field, reason } => ErrorOutput::new(reason.clone()).with_field(field.clone()),
          _ => ErrorOutput::new(e.to_string()),
        };
        write_line(&mut out, &err)?;
      }
    }
  }

  out.flush()?;
  Ok(())
}

fn write_line<W: Write, T: serde::Serialize>(out: &mut W, value: &T) -> io::Result<()> {
  serde_json::to_writer(&mut *out, value)?;
  writeln!(out)
}
