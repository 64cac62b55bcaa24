//! HTTP handlers for the catalog API.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use related_engine::category::{category_info, CategoryInfo};
use related_engine::types::{CatalogStats, ErrorRecord};
use related_engine::{ErrorRepository, ExplainRequest, ExplainResponse, RelatedReport, SearchRequest, SearchResponse};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;
use crate::types::{ListParams, RelatedParams, SearchParams, SuggestionsResponse};

pub async fn health() -> &'static str {
  "ok"
}

pub async fn stats(State(state): State<Arc<AppState>>) -> Json<CatalogStats> {
  Json(state.engine.stats())
}

pub async fn category(Path(id): Path<String>) -> Json<CategoryInfo> {
  Json(category_info(&id))
}

pub async fn list_errors(
  State(state): State<Arc<AppState>>,
  Query(params): Query<ListParams>,
) -> Json<Vec<ErrorRecord>> {
  let tool = params.tool.as_deref().filter(|t| !t.trim().is_empty());
  Json(state.engine.repository().all_records(tool))
}

pub async fn get_error(
  State(state): State<Arc<AppState>>,
  Path((tool, slug)): Path<(String, String)>,
) -> Result<Json<ErrorRecord>, ApiError> {
  Ok(Json(state.engine.record(&tool, &slug)?))
}

/// Related errors for one record, served from the report cache when the
/// catalog version and limit match.
pub async fn related(
  State(state): State<Arc<AppState>>,
  Path((tool, slug)): Path<(String, String)>,
  Query(params): Query<RelatedParams>,
) -> Result<Json<RelatedReport>, ApiError> {
  let limit = params.limit.unwrap_or(state.engine.config().default_limit);
  let version = state.engine.repository().version();

  if let Some(report) = state.cache.get(&version, &tool, &slug, limit) {
    debug!(%tool, %slug, limit, "related report cache hit");
    return Ok(Json(report));
  }

  let report = state.engine.related(&tool, &slug, Some(limit))?;
  state.cache.insert(&version, &tool, &slug, limit, report.clone());
  Ok(Json(report))
}

/// `GET /api/search`. With `suggestions=true` returns completions for `q`
/// instead of results.
pub async fn search(State(state): State<Arc<AppState>>, Query(params): Query<SearchParams>) -> Response {
  let query = params.q.unwrap_or_default();

  if params.suggestions.unwrap_or(false) {
    let suggestions = state.engine.suggestions(&query);
    return Json(SuggestionsResponse { suggestions }).into_response();
  }

  let mut request = SearchRequest::new(query);
  request.category = params.category;
  if let Some(page) = params.page {
    request.page = page;
  }
  if let Some(limit) = params.limit {
    request.page_size = limit;
  }
  Json(state.engine.search(&request)).into_response()
}

pub async fn search_post(
  State(state): State<Arc<AppState>>,
  Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
  if request.query.trim().is_empty() {
    return Err(ApiError::BadRequest("Query is required".into()));
  }
  Ok(Json(state.engine.search(&request)))
}

/// `POST /api/explain`: match pasted error output to a record.
pub async fn explain(
  State(state): State<Arc<AppState>>,
  Json(request): Json<ExplainRequest>,
) -> Result<Json<ExplainResponse>, ApiError> {
  if request.text.trim().is_empty() {
    return Err(ApiError::BadRequest("Text is required".into()));
  }
  Ok(Json(state.engine.explain(&request)))
}
