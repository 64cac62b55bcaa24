//! Read-only error catalog: the repository seam the ranker's callers use.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::EngineError;
use crate::normalize::normalize_record;
use crate::types::{CatalogStats, DataSource, ErrorRecord, InboundRecord};

/// Static dataset bundled with the engine; used when no database is available.
const BUILTIN_DATASET: &str = include_str!("../data/errors.json");

/// Read-only access to error records.
pub trait ErrorRepository: Send + Sync {
  /// Every record, or only those of `tool` when given.
  fn all_records(&self, tool: Option<&str>) -> Vec<ErrorRecord>;

  /// The record identified by `(tool, slug)`, if present.
  fn find_by_slug(&self, tool: &str, slug: &str) -> Option<ErrorRecord>;

  fn source(&self) -> DataSource;

  /// Fingerprint of the record set; changes whenever a record is added,
  /// removed or updated.
  fn version(&self) -> String;

  fn stats(&self) -> CatalogStats {
    summarize(&self.all_records(None), self.source(), self.version())
  }
}

/// In-memory catalog of validated records, immutable once built.
#[derive(Debug, Clone)]
pub struct Catalog {
  records: Vec<ErrorRecord>,
  source: DataSource,
  version: String,
}

impl Catalog {
  /// Build from validated records. Duplicate `(tool, canonical_slug)` keeps
  /// the first occurrence.
  pub fn new(records: Vec<ErrorRecord>, source: DataSource) -> Self {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(records.len());
    for record in records {
      let key = (record.tool.clone(), record.canonical_slug.clone());
      if seen.insert(key) {
        unique.push(record);
      } else {
        warn!(
          tool = %record.tool,
          slug = %record.canonical_slug,
          "duplicate error record skipped"
        );
      }
    }

    let version = fingerprint(&unique);
    debug!(count = unique.len(), %version, "catalog built");
    Self {
      records: unique,
      source,
      version,
    }
  }

  /// Build from raw documents; invalid documents are logged and dropped.
  pub fn from_inbound(raw: &[InboundRecord], source: DataSource) -> Self {
    let records = raw
      .iter()
      .enumerate()
      .filter_map(|(idx, doc)| match normalize_record(doc) {
        Ok(record) => Some(record),
        Err(e) => {
          warn!(index = idx, error = %e, "invalid error document skipped");
          None
        }
      })
      .collect();
    Self::new(records, source)
  }

  /// Parse a JSON array of error documents.
  pub fn from_json(json: &str, source: DataSource) -> Result<Self, EngineError> {
    let raw: Vec<InboundRecord> = serde_json::from_str(json)?;
    Ok(Self::from_inbound(&raw, source))
  }

  /// Load a static dataset file (JSON array of error documents).
  pub fn from_path(path: &Path) -> Result<Self, EngineError> {
    let json = std::fs::read_to_string(path)?;
    Self::from_json(&json, DataSource::Static)
  }

  /// The bundled static dataset.
  pub fn builtin() -> Result<Self, EngineError> {
    Self::from_json(BUILTIN_DATASET, DataSource::Static)
  }

  pub fn records(&self) -> &[ErrorRecord] {
    &self.records
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }
}

impl ErrorRepository for Catalog {
  fn all_records(&self, tool: Option<&str>) -> Vec<ErrorRecord> {
    match tool {
      Some(tool) => self
        .records
        .iter()
        .filter(|r| r.tool.eq_ignore_ascii_case(tool))
        .cloned()
        .collect(),
      None => self.records.clone(),
    }
  }

  fn find_by_slug(&self, tool: &str, slug: &str) -> Option<ErrorRecord> {
    let slug = slug.trim();
    self
      .records
      .iter()
      .find(|r| r.tool.eq_ignore_ascii_case(tool.trim()) && r.canonical_slug == slug)
      .cloned()
  }

  fn source(&self) -> DataSource {
    self.source
  }

  fn version(&self) -> String {
    self.version.clone()
  }
}

/// Counts per tool and per category.
pub fn summarize(records: &[ErrorRecord], source: DataSource, version: String) -> CatalogStats {
  let mut by_tool = BTreeMap::new();
  let mut by_category = BTreeMap::new();
  for record in records {
    *by_tool.entry(record.tool.clone()).or_insert(0) += 1;
    *by_category.entry(record.category.clone()).or_insert(0) += 1;
  }
  CatalogStats {
    source,
    version,
    total: records.len(),
    by_tool,
    by_category,
  }
}

/// Stable fingerprint of a record set: blake3 over sorted
/// `tool|slug|updated_at` lines, first 16 hex chars. Insertion order does
/// not matter.
pub fn fingerprint(records: &[ErrorRecord]) -> String {
  let mut lines: Vec<String> = records
    .iter()
    .map(|r| {
      let updated = r.updated_at.map(|t| t.to_rfc3339()).unwrap_or_default();
      format!("{}|{}|{}", r.tool, r.canonical_slug, updated)
    })
    .collect();
  lines.sort();

  let mut hasher = blake3::Hasher::new();
  for line in &lines {
    hasher.update(line.as_bytes());
    hasher.update(b"\n");
  }
  let hex = hasher.finalize().to_hex();
  hex[..16].to_string()
}
