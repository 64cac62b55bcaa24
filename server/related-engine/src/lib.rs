//! Error Catalog Relatedness Engine: deterministic, rule-based.
//!
//! Validates error records, ranks related errors by shared category, tool,
//! title keywords and aliases, buckets the ranked list by relationship, and
//! runs simple catalog search and free-text error matching over an injected
//! read-only repository.
//!
//! No DB, no network; pure computation over in-memory records.

pub mod catalog;
pub mod category;
pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod normalize;
pub mod related;
pub mod search;
pub mod types;

pub use catalog::{Catalog, ErrorRepository};
pub use config::Config;
pub use engine::Engine;
pub use error::EngineError;
pub use types::{
  ErrorRecord, ExplainRequest, ExplainResponse, InboundRecord, RelatedReport, ScoredCandidate, SearchRequest,
  SearchResponse,
};
