//! Core types for the relatedness engine (JSON contracts + internal models).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Inbound types (JSON contract: stored documents)
// ---------------------------------------------------------------------------

/// One stored error document as it arrives from the database or a dataset
/// file. Required strings are optional here so that missing fields surface
/// as validation errors rather than parse failures. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundRecord {
  #[serde(default)]
  pub tool: Option<String>,
  #[serde(default)]
  pub canonical_slug: Option<String>,
  #[serde(default)]
  pub title: Option<String>,
  #[serde(default)]
  pub category: Option<String>,
  #[serde(default)]
  pub aliases: Vec<String>,
  #[serde(default)]
  pub matchers: Matchers,
  #[serde(default)]
  pub summary: String,
  #[serde(default)]
  pub root_causes: Vec<RootCause>,
  #[serde(default)]
  pub fix_steps: Vec<FixStep>,
  #[serde(default)]
  pub clarifying_questions: Vec<String>,
  #[serde(default)]
  pub examples: Vec<Example>,
  #[serde(default)]
  pub created_at: Option<String>,
  #[serde(default)]
  pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Matchers {
  #[serde(default)]
  pub regex: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceLink {
  pub url: String,
  pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootCause {
  pub name: String,
  pub why: String,
  pub confidence: f64,
  #[serde(default)]
  pub sources: Vec<SourceLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixStep {
  pub step: String,
  #[serde(default)]
  pub commands: Vec<String>,
  #[serde(default)]
  pub sources: Vec<SourceLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
  pub name: String,
  pub symptom: String,
  pub fix: String,
  #[serde(default)]
  pub sources: Vec<SourceLink>,
}

// ---------------------------------------------------------------------------
// Validated record
// ---------------------------------------------------------------------------

/// Canonical error record after validation. Read-only to the ranker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
  pub tool: String,
  pub canonical_slug: String,
  pub title: String,
  pub category: String,
  pub aliases: Vec<String>,
  pub matchers: Matchers,
  pub summary: String,
  pub root_causes: Vec<RootCause>,
  pub fix_steps: Vec<FixStep>,
  pub clarifying_questions: Vec<String>,
  pub examples: Vec<Example>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub created_at: Option<DateTime<Utc>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub updated_at: Option<DateTime<Utc>>,
}

impl ErrorRecord {
  /// Identity of a record: `(tool, canonical_slug)`.
  pub fn key(&self) -> (&str, &str) {
    (self.tool.as_str(), self.canonical_slug.as_str())
  }
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// A pool record with its similarity score. Built fresh per ranking call.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate<'a> {
  pub record: &'a ErrorRecord,
  pub similarity_score: u32,
  /// Human-readable reasons the score is non-zero, in scoring order.
  pub evidence: Vec<String>,
}

/// Presentation band for a similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityTier {
  Strong,
  Moderate,
  Weak,
}

impl SimilarityTier {
  pub fn from_score(score: u32) -> Self {
    if score >= 70 {
      Self::Strong
    } else if score >= 40 {
      Self::Moderate
    } else {
      Self::Weak
    }
  }
}

/// Which bucket a ranked entry falls into relative to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
  SameCategory,
  SameTool,
  SimilarPattern,
  Other,
}

// ---------------------------------------------------------------------------
// Output types (JSON contract: what we emit)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetSummary {
  pub tool: String,
  pub canonical_slug: String,
  pub title: String,
  pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedError {
  pub tool: String,
  pub canonical_slug: String,
  pub title: String,
  pub category: String,
  pub summary: String,
  pub similarity_score: u32,
  pub tier: SimilarityTier,
  pub relationship: Relationship,
  pub evidence: Vec<String>,
}

/// Ranked related errors for one target, plus relationship buckets.
///
/// Buckets list `canonical_slug`s of entries in `related`; they are computed
/// after truncation to `limit`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedReport {
  pub target: TargetSummary,
  pub pool_version: String,
  pub limit: usize,
  pub related: Vec<RelatedError>,
  pub same_category: Vec<String>,
  pub same_tool: Vec<String>,
  pub similar_pattern: Vec<String>,
}

/// Where the catalog's records came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
  Database,
  Static,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
  pub source: DataSource,
  pub version: String,
  pub total: usize,
  pub by_tool: BTreeMap<String, usize>,
  pub by_category: BTreeMap<String, usize>,
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

fn default_page() -> usize {
  1
}

fn default_page_size() -> usize {
  20
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
  pub query: String,
  #[serde(default)]
  pub category: Option<String>,
  #[serde(default = "default_page")]
  pub page: usize,
  #[serde(default = "default_page_size")]
  pub page_size: usize,
}

impl SearchRequest {
  pub fn new(query: impl Into<String>) -> Self {
    Self {
      query: query.into(),
      category: None,
      page: default_page(),
      page_size: default_page_size(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
  Exact,
  Alias,
  Regex,
  Fuzzy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
  pub error: ErrorRecord,
  pub score: u32,
  pub match_type: MatchType,
  pub matched_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
  pub results: Vec<SearchHit>,
  pub total: usize,
  pub query: String,
  pub page: usize,
  pub page_size: usize,
  pub categories: Vec<String>,
  pub data_source: DataSource,
}

// ---------------------------------------------------------------------------
// Explain (free-text matching)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ExplainRequest {
  pub text: String,
  /// Restrict matching to one tool's records.
  #[serde(default)]
  pub tool: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
  Exact,
  Regex,
  Alias,
  Title,
  Summary,
  Cause,
  Semantic,
}

/// One signal that contributed to a record's match score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchDetail {
  #[serde(rename = "type")]
  pub kind: MatchKind,
  pub pattern: String,
  pub matched_text: String,
  pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
  pub tool: String,
  pub slug: String,
  pub title: String,
  pub category: String,
  pub score: f64,
}

/// Best record for a piece of error text. `slug` is `None` when nothing
/// scored above zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
  pub tool: Option<String>,
  pub slug: Option<String>,
  pub confidence: f64,
  pub score: f64,
  pub match_details: Vec<MatchDetail>,
  pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
  pub slug: Option<String>,
  pub confidence: f64,
}

/// Explanation for pasted error text: the matched record's content, plus a
/// clarifying question and alternatives when confidence is low.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainResponse {
  pub tool: Option<String>,
  #[serde(rename = "match")]
  pub matched: MatchSummary,
  pub title: Option<String>,
  pub summary: Option<String>,
  pub root_causes: Vec<RootCause>,
  pub fix_steps: Vec<FixStep>,
  pub sources: Vec<SourceLink>,
  pub clarifying_question: Option<String>,
  pub suggestions: Vec<Suggestion>,
}

// ---------------------------------------------------------------------------
// CLI stream wrappers
// ---------------------------------------------------------------------------

/// One stdin line for the binary: rank errors related to `tool/slug`.
#[derive(Debug, Clone, Deserialize)]
pub struct RelatedRequest {
  pub tool: String,
  pub slug: String,
  #[serde(default)]
  pub limit: Option<usize>,
}

/// Structured error output for invalid input lines.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      field: None,
    }
  }

  pub fn with_field(mut self, field: impl Into<String>) -> Self {
    self.field = Some(field.into());
    self
  }
}
