//! Core engine: ranks related errors, runs searches and explains pasted
//! error text over an injected read-only repository.

use std::sync::Arc;

use tracing::debug;

use crate::catalog::ErrorRepository;
use crate::config::Config;
use crate::error::EngineError;
use crate::matcher;
use crate::normalize::normalize_text;
use crate::related;
use crate::search;
use crate::types::*;

fn slugs(entries: &[&ScoredCandidate<'_>]) -> Vec<String> {
  entries.iter().map(|c| c.record.canonical_slug.clone()).collect()
}

/// The relatedness engine. Holds no mutable state; safe to share.
#[derive(Clone)]
pub struct Engine {
  config: Config,
  repository: Arc<dyn ErrorRepository>,
}

impl Engine {
  pub fn new(config: Config, repository: Arc<dyn ErrorRepository>) -> Self {
    Self { config, repository }
  }

  pub fn with_defaults(repository: Arc<dyn ErrorRepository>) -> Self {
    Self::new(Config::default(), repository)
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn repository(&self) -> &dyn ErrorRepository {
    self.repository.as_ref()
  }

  /// Look up one record.
  pub fn record(&self, tool: &str, slug: &str) -> Result<ErrorRecord, EngineError> {
    self
      .repository
      .find_by_slug(tool, slug)
      .ok_or_else(|| EngineError::not_found(tool, slug))
  }

  /// Rank errors related to `tool/slug` across the whole catalog.
  ///
  /// `limit` of `None` uses the configured default. An empty `related` list
  /// is a normal outcome, not an error.
  pub fn related(&self, tool: &str, slug: &str, limit: Option<usize>) -> Result<RelatedReport, EngineError> {
    let limit = limit.unwrap_or(self.config.default_limit);
    let target = self.record(tool, slug)?;
    let pool = self.repository.all_records(None);

    let ranked = related::rank(&target, &pool, limit, &self.config)?;
    let buckets = related::bucket(&target, &ranked, &self.config);

    debug!(
      tool = %target.tool,
      slug = %target.canonical_slug,
      pool = pool.len(),
      related = ranked.len(),
      "ranked related errors"
    );

    let related = ranked
      .iter()
      .map(|c| RelatedError {
        tool: c.record.tool.clone(),
        canonical_slug: c.record.canonical_slug.clone(),
        title: c.record.title.clone(),
        category: c.record.category.clone(),
        summary: c.record.summary.clone(),
        similarity_score: c.similarity_score,
        tier: SimilarityTier::from_score(c.similarity_score),
        relationship: related::relationship(&target, c, &self.config),
        evidence: c.evidence.clone(),
      })
      .collect();

    Ok(RelatedReport {
      target: TargetSummary {
        tool: target.tool.clone(),
        canonical_slug: target.canonical_slug.clone(),
        title: target.title.clone(),
        category: target.category.clone(),
      },
      pool_version: self.repository.version(),
      limit,
      related,
      same_category: slugs(&buckets.same_category),
      same_tool: slugs(&buckets.same_tool),
      similar_pattern: slugs(&buckets.similar_pattern),
    })
  }

  pub fn search(&self, request: &SearchRequest) -> SearchResponse {
    let records = self.repository.all_records(None);
    search::search(&records, request, self.repository.source())
  }

  pub fn suggestions(&self, query: &str) -> Vec<String> {
    let records = self.repository.all_records(None);
    search::suggestions(&records, query)
  }

  /// Match pasted error text against the catalog (or one tool's records).
  pub fn explain(&self, request: &ExplainRequest) -> ExplainResponse {
    let tool = request.tool.as_deref().map(str::trim).filter(|t| !t.is_empty());
    let records = self.repository.all_records(tool);
    let text = normalize_text(&request.text);
    let result = matcher::match_error(&text, &records, &self.config.explain);

    debug!(
      candidates = records.len(),
      slug = result.slug.as_deref().unwrap_or("-"),
      confidence = result.confidence,
      "explained error text"
    );

    let record = match (&result.tool, &result.slug) {
      (Some(tool), Some(slug)) => records.iter().find(|r| r.key() == (tool.as_str(), slug.as_str())),
      _ => None,
    };
    matcher::explain_response(result, record)
  }

  pub fn stats(&self) -> CatalogStats {
    self.repository.stats()
  }
}
