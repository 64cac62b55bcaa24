//! Catalog search: exact slug, alias, regex and content matching with
//! category boosts, pagination and facets; plus query suggestions.

use std::collections::HashSet;

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::normalize::normalize_text;
use crate::types::{DataSource, ErrorRecord, MatchType, SearchHit, SearchRequest, SearchResponse};

const EXACT_MATCH_SCORE: u32 = 100;
const ALIAS_MATCH_SCORE: u32 = 80;
const EXACT_ALIAS_BONUS: u32 = 20;
const REGEX_MATCH_SCORE: u32 = 60;
const SUMMARY_BOOST: u32 = 10;
const FUZZY_MATCH_SCORE: u32 = 40;
const TITLE_BOOST: u32 = 15;
const FUZZY_MIN_SCORE: u32 = 10;
const MAX_PAGE_SIZE: usize = 100;
const MAX_ALIAS_SUGGESTIONS: usize = 8;
const MAX_SUGGESTIONS: usize = 10;

/// Shown when the query is too short to suggest from.
pub const POPULAR_SEARCHES: &[&str] = &[
  "pod pending",
  "image pull error",
  "node not ready",
  "crashloopbackoff",
  "service unavailable",
  "forbidden",
  "network unreachable",
  "oom killed",
  "volume mount failed",
  "certificate expired",
];

/// Boost for frequently searched categories.
fn category_boost(category: &str) -> u32 {
  match category {
    "runtime" => 20,
    "network" => 16,
    "auth" | "storage" => 12,
    "config" | "scheduler" | "cluster" => 8,
    _ => 0,
  }
}

fn hit(record: &ErrorRecord, score: u32, match_type: MatchType, matched_text: String) -> SearchHit {
  SearchHit {
    error: record.clone(),
    score: score + category_boost(&record.category),
    match_type,
    matched_text,
  }
}

fn exact_matches(query: &str, records: &[ErrorRecord]) -> Vec<SearchHit> {
  records
    .iter()
    .filter(|r| r.canonical_slug == query)
    .map(|r| hit(r, EXACT_MATCH_SCORE, MatchType::Exact, r.canonical_slug.clone()))
    .collect()
}

/// First alias per record that contains, or is contained in, the query.
fn alias_matches(query: &str, records: &[ErrorRecord]) -> Vec<SearchHit> {
  let mut hits = Vec::new();
  for record in records {
    for alias in &record.aliases {
      let normalized = normalize_text(alias);
      if normalized.is_empty() {
        continue;
      }
      if normalized.contains(query) || query.contains(&normalized) {
        let mut score = ALIAS_MATCH_SCORE;
        if normalized == query {
          score += EXACT_ALIAS_BONUS;
        }
        if normalize_text(&record.title).contains(query) {
          score += TITLE_BOOST;
        }
        hits.push(hit(record, score, MatchType::Alias, alias.clone()));
        break;
      }
    }
  }
  hits
}

/// Case-insensitive matcher for a stored pattern; `None` when it does not
/// compile.
pub(crate) fn compile_matcher(pattern: &str) -> Option<Regex> {
  match RegexBuilder::new(pattern).case_insensitive(true).build() {
    Ok(re) => Some(re),
    Err(e) => {
      debug!(%pattern, error = %e, "invalid matcher pattern skipped");
      None
    }
  }
}

/// First stored pattern per record that matches the query.
fn regex_matches(query: &str, records: &[ErrorRecord]) -> Vec<SearchHit> {
  let mut hits = Vec::new();
  for record in records {
    let matched = record
      .matchers
      .regex
      .iter()
      .find(|pattern| compile_matcher(pattern).is_some_and(|re| re.is_match(query)));
    if let Some(pattern) = matched {
      let mut score = REGEX_MATCH_SCORE;
      if normalize_text(&record.summary).contains(query) {
        score += SUMMARY_BOOST;
      }
      hits.push(hit(record, score, MatchType::Regex, pattern.clone()));
    }
  }
  hits
}

fn searchable_text(record: &ErrorRecord) -> String {
  let mut parts = vec![record.title.clone(), record.summary.clone()];
  parts.extend(record.root_causes.iter().map(|c| format!("{} {}", c.name, c.why)));
  parts.extend(record.fix_steps.iter().map(|s| s.step.clone()));
  parts.extend(record.examples.iter().map(|e| format!("{} {}", e.name, e.symptom)));
  normalize_text(&parts.join(" "))
}

/// Word-level matches against title, summary, causes, fix steps and examples.
fn fuzzy_matches(query: &str, records: &[ErrorRecord]) -> Vec<SearchHit> {
  let query_words: Vec<&str> = query.split(' ').collect();
  let mut hits = Vec::new();

  for record in records {
    let text = searchable_text(record);
    let match_count = query_words
      .iter()
      .filter(|w| w.chars().count() > 2 && text.contains(*w))
      .count();
    if match_count == 0 {
      continue;
    }

    let mut score = FUZZY_MATCH_SCORE * match_count as u32 / query_words.len() as u32;

    let title = normalize_text(&record.title);
    let title_hit = query_words
      .iter()
      .any(|w| title.split(' ').any(|tw| tw.contains(*w) || w.contains(tw)));
    if title_hit {
      score += TITLE_BOOST;
    }

    if score > FUZZY_MIN_SCORE {
      let matched: Vec<&str> = query_words.iter().copied().filter(|w| text.contains(*w)).collect();
      hits.push(hit(record, score, MatchType::Fuzzy, matched.join(" ")));
    }
  }
  hits
}

/// Merge hits for the same record, keeping the first position and the
/// highest-scoring match.
fn dedup(hits: Vec<SearchHit>) -> Vec<SearchHit> {
  let mut unique: Vec<SearchHit> = Vec::with_capacity(hits.len());
  for hit in hits {
    match unique.iter_mut().find(|u| u.error.key() == hit.error.key()) {
      Some(existing) => {
        if hit.score > existing.score {
          existing.score = hit.score;
          existing.match_type = hit.match_type;
          existing.matched_text = hit.matched_text;
        }
      }
      None => unique.push(hit),
    }
  }
  unique
}

/// Search `records` for `request.query`.
///
/// Results are sorted by score descending (stable), filtered by category
/// when one is given, then paginated. `total` and `categories` describe the
/// filtered set before pagination.
pub fn search(records: &[ErrorRecord], request: &SearchRequest, source: DataSource) -> SearchResponse {
  let page = request.page.max(1);
  let page_size = request.page_size.clamp(1, MAX_PAGE_SIZE);
  let query = normalize_text(&request.query);

  let mut response = SearchResponse {
    results: Vec::new(),
    total: 0,
    query: request.query.clone(),
    page,
    page_size,
    categories: Vec::new(),
    data_source: source,
  };
  if query.is_empty() {
    return response;
  }

  let mut hits = exact_matches(&query, records);
  hits.extend(alias_matches(&query, records));
  hits.extend(regex_matches(&query, records));
  hits.extend(fuzzy_matches(&query, records));

  let mut hits = dedup(hits);
  if let Some(category) = request.category.as_deref().filter(|c| !c.is_empty()) {
    hits.retain(|h| h.error.category.eq_ignore_ascii_case(category));
  }
  hits.sort_by(|a, b| b.score.cmp(&a.score));

  let mut seen = HashSet::new();
  response.categories = hits
    .iter()
    .filter(|h| seen.insert(h.error.category.clone()))
    .map(|h| h.error.category.clone())
    .collect();
  response.total = hits.len();
  response.results = hits
    .into_iter()
    .skip((page - 1).saturating_mul(page_size))
    .take(page_size)
    .collect();
  response
}

/// Query completions: matching aliases first, then titles.
pub fn suggestions(records: &[ErrorRecord], query: &str) -> Vec<String> {
  if query.chars().count() < 2 {
    return POPULAR_SEARCHES.iter().map(|s| s.to_string()).collect();
  }

  let query = normalize_text(query);
  let mut out: Vec<String> = Vec::new();

  'aliases: for record in records {
    for alias in &record.aliases {
      if normalize_text(alias).contains(&query) && !out.contains(alias) {
        out.push(alias.clone());
        if out.len() >= MAX_ALIAS_SUGGESTIONS {
          break 'aliases;
        }
      }
    }
  }

  for record in records {
    if out.len() >= MAX_SUGGESTIONS {
      break;
    }
    if normalize_text(&record.title).contains(&query) && !out.contains(&record.title) {
      out.push(record.title.clone());
    }
  }

  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::Catalog;

  fn records() -> Vec<ErrorRecord> {
    Catalog::builtin().unwrap().records().to_vec()
  }

  #[test]
  fn slug_query_ranks_record_first() {
    let records = records();
    let resp = search(&records, &SearchRequest::new("OOMKilled"), DataSource::Static);
    assert!(resp.total >= 1);
    let top = &resp.results[0];
    assert_eq!(top.error.canonical_slug, "oomkilled");
    // Exact slug scores 100 + 20; the exact alias hit (80 + 20 + 15 title + 20) replaces it.
    assert_eq!(top.match_type, MatchType::Alias);
    assert_eq!(top.score, 135);
  }

  #[test]
  fn exact_slug_without_alias() {
    let records = records();
    let resp = search(&records, &SearchRequest::new("upgrade-failed"), DataSource::Static);
    let top = &resp.results[0];
    assert_eq!(top.error.canonical_slug, "upgrade-failed");
    assert_eq!(top.match_type, MatchType::Exact);
    assert_eq!(top.score, 108);
  }

  #[test]
  fn alias_match_finds_record() {
    let records = records();
    let resp = search(&records, &SearchRequest::new("RBAC Denied"), DataSource::Static);
    assert_eq!(resp.results[0].error.canonical_slug, "forbidden");
    assert_eq!(resp.results[0].match_type, MatchType::Alias);
    assert_eq!(resp.results[0].matched_text, "rbac denied");
  }

  fn memory_fixture() -> Vec<ErrorRecord> {
    let json = r#"[
      {
        "tool": "kubernetes",
        "canonical_slug": "oomkilled",
        "title": "OOMKilled Container",
        "category": "runtime",
        "summary": "Memory limit hit.",
        "matchers": {"regex": ["(unclosed", "Exit Code 137"]}
      },
      {
        "tool": "helm",
        "canonical_slug": "hook-failed",
        "title": "Hook Failed",
        "category": "config",
        "summary": "pre-install hook failed",
        "matchers": {"regex": ["hook.*failed"]}
      }
    ]"#;
    Catalog::from_json(json, DataSource::Static).unwrap().records().to_vec()
  }

  #[test]
  fn regex_matcher_finds_record() {
    let records = memory_fixture();
    let resp = search(&records, &SearchRequest::new("exit code 137"), DataSource::Static);
    assert_eq!(resp.total, 1);
    let top = &resp.results[0];
    assert_eq!(top.error.canonical_slug, "oomkilled");
    assert_eq!(top.match_type, MatchType::Regex);
    // 60 + runtime boost 20; the invalid first pattern is skipped.
    assert_eq!(top.score, 80);
    assert_eq!(top.matched_text, "Exit Code 137");
  }

  #[test]
  fn regex_summary_boost() {
    let records = memory_fixture();
    let resp = search(&records, &SearchRequest::new("pre-install hook failed"), DataSource::Static);
    let top = &resp.results[0];
    assert_eq!(top.error.canonical_slug, "hook-failed");
    assert_eq!(top.match_type, MatchType::Regex);
    // 60 + summary 10 + config boost 8.
    assert_eq!(top.score, 78);
  }

  #[test]
  fn alias_outranks_regex_in_bundled_data() {
    let records = records();
    let resp = search(&records, &SearchRequest::new("exit code 137"), DataSource::Static);
    assert_eq!(resp.results[0].error.canonical_slug, "container-exited");
    assert_eq!(resp.results[0].match_type, MatchType::Alias);
    assert_eq!(resp.results[0].score, 120);
    assert_eq!(resp.results[1].error.canonical_slug, "oomkilled");
    assert_eq!(resp.results[1].match_type, MatchType::Regex);
    assert_eq!(resp.results[1].score, 80);
  }

  #[test]
  fn empty_query_returns_nothing() {
    let records = records();
    let resp = search(&records, &SearchRequest::new("   "), DataSource::Static);
    assert!(resp.results.is_empty());
    assert_eq!(resp.total, 0);
  }

  #[test]
  fn category_filter_and_facets() {
    let records = records();
    let mut req = SearchRequest::new("container");
    let all = search(&records, &req, DataSource::Static);
    assert!(all.categories.len() >= 1);

    req.category = Some("runtime".into());
    let filtered = search(&records, &req, DataSource::Static);
    assert!(filtered.results.iter().all(|h| h.error.category == "runtime"));
    assert_eq!(filtered.categories, vec!["runtime".to_string()]);
  }

  #[test]
  fn pagination_slices_results() {
    let records = records();
    let mut req = SearchRequest::new("pod");
    req.page_size = 1;
    let first = search(&records, &req, DataSource::Static);
    assert!(first.total >= 2);
    assert_eq!(first.results.len(), 1);

    req.page = 2;
    let second = search(&records, &req, DataSource::Static);
    assert_eq!(second.results.len(), 1);
    assert_ne!(first.results[0].error.key(), second.results[0].error.key());

    req.page = 999;
    assert!(search(&records, &req, DataSource::Static).results.is_empty());
  }

  #[test]
  fn page_size_is_clamped() {
    let records = records();
    let mut req = SearchRequest::new("pod");
    req.page_size = 5000;
    req.page = 0;
    let resp = search(&records, &req, DataSource::Static);
    assert_eq!(resp.page_size, 100);
    assert_eq!(resp.page, 1);
  }

  #[test]
  fn results_are_sorted_and_unique() {
    let records = records();
    let resp = search(&records, &SearchRequest::new("out of memory"), DataSource::Static);
    for pair in resp.results.windows(2) {
      assert!(pair[0].score >= pair[1].score);
    }
    let keys: HashSet<_> = resp.results.iter().map(|h| h.error.key()).collect();
    assert_eq!(keys.len(), resp.results.len());
  }

  #[test]
  fn short_query_suggests_popular_searches() {
    let records = records();
    let out = suggestions(&records, "p");
    assert_eq!(out.len(), POPULAR_SEARCHES.len());
    assert_eq!(out[0], "pod pending");
  }

  #[test]
  fn suggestions_prefer_aliases_then_titles() {
    let records = records();
    let out = suggestions(&records, "cert");
    assert!(out.contains(&"certificate expired".to_string()));
    assert!(out.contains(&"Certificate Expired".to_string()));
    let alias_pos = out.iter().position(|s| s == "certificate expired").unwrap();
    let title_pos = out.iter().position(|s| s == "Certificate Expired").unwrap();
    assert!(alias_pos < title_pos);
    assert!(out.len() <= MAX_SUGGESTIONS);
  }
}
