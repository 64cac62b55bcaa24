//! Request/response types for the catalog API.

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub tool: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RelatedParams {
  pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
  pub q: Option<String>,
  pub category: Option<String>,
  pub page: Option<usize>,
  pub limit: Option<usize>,
  pub suggestions: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
  pub suggestions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
  pub error: String,
}
