//! API error type and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use related_engine::EngineError;
use thiserror::Error;
use tracing::error;

use crate::types::ErrorBody;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Engine(#[from] EngineError),

  #[error("bad request: {0}")]
  BadRequest(String),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      Self::Engine(EngineError::NotFound { .. }) => StatusCode::NOT_FOUND,
      Self::Engine(EngineError::Validation { .. }) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      error!(error = %self, "request failed");
    }
    (status, Json(ErrorBody { error: self.to_string() })).into_response()
  }
}
