//! Startup catalog loading: PostgreSQL first, static dataset as fallback.

use std::time::Duration;

use related_engine::types::{DataSource, InboundRecord};
use related_engine::{Catalog, EngineError, ErrorRepository};
use sqlx_postgres::{PgPoolOptions, Postgres};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::ServerConfig;

const ERRORS_QUERY: &str = "SELECT doc::text FROM errors";

#[derive(Debug, Error)]
pub enum LoadError {
  #[error("database: {0}")]
  Database(#[from] sqlx_core::error::Error),

  #[error(transparent)]
  Engine(#[from] EngineError),
}

/// Load the catalog for the service.
///
/// With `DATABASE_URL` set, reads every `errors.doc` row. A connection or
/// query failure, or a table with no valid documents, falls back to the
/// static dataset (`CATALOG_PATH` or the bundled one).
pub async fn load_catalog(config: &ServerConfig) -> Result<Catalog, LoadError> {
  if let Some(url) = config.database_url.as_deref() {
    match load_from_database(url).await {
      Ok(catalog) if !catalog.is_empty() => {
        info!(records = catalog.len(), version = %catalog.version(), "catalog loaded from database");
        return Ok(catalog);
      }
      Ok(_) => warn!("database has no valid error documents, using static dataset"),
      Err(e) => warn!(error = %e, "database unavailable, using static dataset"),
    }
  }
  load_static(config)
}

async fn load_from_database(url: &str) -> Result<Catalog, LoadError> {
  let pool = PgPoolOptions::new()
    .max_connections(2)
    .acquire_timeout(Duration::from_secs(5))
    .connect(url)
    .await?;

  let rows = sqlx_core::query_scalar::query_scalar::<Postgres, String>(ERRORS_QUERY)
    .fetch_all(&pool)
    .await;
  pool.close().await;

  let docs: Vec<InboundRecord> = rows?
    .iter()
    .enumerate()
    .filter_map(|(idx, row)| match serde_json::from_str(row) {
      Ok(doc) => Some(doc),
      Err(e) => {
        warn!(row = idx, error = %e, "unparseable error document skipped");
        None
      }
    })
    .collect();

  Ok(Catalog::from_inbound(&docs, DataSource::Database))
}

fn load_static(config: &ServerConfig) -> Result<Catalog, LoadError> {
  let catalog = match config.catalog_path.as_deref() {
    Some(path) => {
      info!(path = %path.display(), "loading catalog file");
      Catalog::from_path(path)?
    }
    None => Catalog::builtin()?,
  };
  info!(records = catalog.len(), "catalog loaded from static dataset");
  Ok(catalog)
}
