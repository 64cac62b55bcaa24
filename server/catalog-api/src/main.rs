//! Binary entrypoint for the error catalog API.

use std::sync::Arc;

use catalog_api::{load_catalog, router, AppState, ServerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let config = ServerConfig::from_env()?;
  let catalog = load_catalog(&config).await?;
  let state = Arc::new(AppState::new(catalog, config.cache_capacity));
  let app = router(state);

  let addr = config.socket_addr();
  info!(%addr, "catalog-api listening");

  let listener = tokio::net::TcpListener::bind(addr).await?;
  axum::serve(listener, app).await?;

  Ok(())
}
