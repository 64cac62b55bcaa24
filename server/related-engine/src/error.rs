//! Structured error types for the relatedness engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
  #[error("validation: {field}: {reason}")]
  Validation { field: String, reason: String },

  #[error("not found: {tool}/{slug}")]
  NotFound { tool: String, slug: String },

  #[error("io: {0}")]
  Io(#[from] std::io::Error),

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),
}

impl EngineError {
  pub fn validation(field: &str, reason: &str) -> Self {
    Self::Validation {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }

  pub fn not_found(tool: &str, slug: &str) -> Self {
    Self::NotFound {
      tool: tool.to_string(),
      slug: slug.to_string(),
    }
  }
}
