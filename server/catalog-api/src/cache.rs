//! Related-report cache keyed by catalog version.

use std::collections::HashMap;
use std::sync::RwLock;

use related_engine::RelatedReport;

type CacheKey = (String, String, String, usize);

/// Bounded cache of related reports. Keys include the catalog version, so a
/// reloaded catalog never serves stale reports. When full, the cache is
/// cleared before inserting.
pub struct ReportCache {
  capacity: usize,
  entries: RwLock<HashMap<CacheKey, RelatedReport>>,
}

impl ReportCache {
  pub fn new(capacity: usize) -> Self {
    Self {
      capacity,
      entries: RwLock::new(HashMap::new()),
    }
  }

  fn key(version: &str, tool: &str, slug: &str, limit: usize) -> CacheKey {
    (
      version.to_string(),
      tool.trim().to_ascii_lowercase(),
      slug.trim().to_string(),
      limit,
    )
  }

  pub fn get(&self, version: &str, tool: &str, slug: &str, limit: usize) -> Option<RelatedReport> {
    let entries = self.entries.read().ok()?;
    entries.get(&Self::key(version, tool, slug, limit)).cloned()
  }

  pub fn insert(&self, version: &str, tool: &str, slug: &str, limit: usize, report: RelatedReport) {
    if self.capacity == 0 {
      return;
    }
    if let Ok(mut entries) = self.entries.write() {
      if entries.len() >= self.capacity {
        entries.clear();
      }
      entries.insert(Self::key(version, tool, slug, limit), report);
    }
  }

  pub fn len(&self) -> usize {
    self.entries.read().map(|e| e.len()).unwrap_or(0)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use related_engine::types::TargetSummary;

  fn report(slug: &str) -> RelatedReport {
    RelatedReport {
      target: TargetSummary {
        tool: "kubernetes".into(),
        canonical_slug: slug.into(),
        title: slug.into(),
        category: "runtime".into(),
      },
      pool_version: "v1".into(),
      limit: 10,
      related: vec![],
      same_category: vec![],
      same_tool: vec![],
      similar_pattern: vec![],
    }
  }

  #[test]
  fn hit_requires_same_version_and_limit() {
    let cache = ReportCache::new(4);
    cache.insert("v1", "kubernetes", "a", 10, report("a"));
    assert!(cache.get("v1", "Kubernetes", "a", 10).is_some());
    assert!(cache.get("v2", "kubernetes", "a", 10).is_none());
    assert!(cache.get("v1", "kubernetes", "a", 5).is_none());
  }

  #[test]
  fn key_ignores_surrounding_whitespace() {
    let cache = ReportCache::new(4);
    cache.insert("v1", " kubernetes", "a ", 10, report("a"));
    assert!(cache.get("v1", "kubernetes", "a", 10).is_some());
    cache.insert("v1", "kubernetes", "a", 10, report("a"));
    assert_eq!(cache.len(), 1);
  }

  #[test]
  fn full_cache_is_cleared() {
    let cache = ReportCache::new(2);
    cache.insert("v1", "kubernetes", "a", 10, report("a"));
    cache.insert("v1", "kubernetes", "b", 10, report("b"));
    cache.insert("v1", "kubernetes", "c", 10, report("c"));
    assert_eq!(cache.len(), 1);
    assert!(cache.get("v1", "kubernetes", "c", 10).is_some());
  }

  #[test]
  fn zero_capacity_disables_cache() {
    let cache = ReportCache::new(0);
    cache.insert("v1", "kubernetes", "a", 10, report("a"));
    assert!(cache.is_empty());
  }
}
