//! Error Catalog API
//!
//! HTTP service over the relatedness engine: record lookup, related errors,
//! search and suggestions, error-text explanation, catalog stats. Bind to 127.0.0.1 by default
//! (internal only).

mod cache;
mod config;
mod error;
mod handlers;
mod loader;
mod state;
mod types;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use cache::ReportCache;
pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;
pub use handlers::{category, explain, get_error, health, list_errors, related, search, search_post, stats};
pub use loader::{load_catalog, LoadError};
pub use state::AppState;
pub use types::{ListParams, RelatedParams, SearchParams};

/// All routes, with CORS and request tracing.
pub fn router(state: Arc<AppState>) -> Router {
  Router::new()
    .route("/health", get(health))
    .route("/api/stats", get(stats))
    .route("/api/categories/:id", get(category))
    .route("/api/errors", get(list_errors))
    .route("/api/errors/:tool/:slug", get(get_error))
    .route("/api/errors/:tool/:slug/related", get(related))
    .route("/api/search", get(search).post(search_post))
    .route("/api/explain", post(explain))
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
    .with_state(state)
}
