//! Rank catalog errors by relatedness to a target error.
//!
//! Scoring is additive: shared category, same tool, shared title keywords and
//! shared aliases. Candidates scoring zero are dropped; the rest are sorted by
//! score descending with ties kept in pool order, then truncated to `limit`.

use std::collections::HashSet;

use crate::config::Config;
use crate::error::EngineError;
use crate::normalize::ensure_rankable;
use crate::types::{ErrorRecord, Relationship, ScoredCandidate};

/// Lowercase, whitespace-split title tokens longer than `min_len` chars.
pub fn title_keywords(title: &str, min_len: usize) -> HashSet<String> {
  title
    .to_lowercase()
    .split_whitespace()
    .filter(|token| token.chars().count() > min_len)
    .map(str::to_string)
    .collect()
}

/// Target-side data computed once per ranking call.
struct TargetProfile<'t> {
  record: &'t ErrorRecord,
  keywords: HashSet<String>,
  aliases: HashSet<&'t str>,
}

impl<'t> TargetProfile<'t> {
  fn new(record: &'t ErrorRecord, config: &Config) -> Self {
    Self {
      record,
      keywords: title_keywords(&record.title, config.min_keyword_len),
      aliases: record.aliases.iter().map(String::as_str).collect(),
    }
  }

  /// Score one candidate; returns the score and the evidence behind it.
  fn score(&self, candidate: &ErrorRecord, config: &Config) -> (u32, Vec<String>) {
    let mut score = 0;
    let mut evidence = Vec::new();

    if candidate.category == self.record.category {
      score += config.category_weight;
      evidence.push(format!("same category ({})", candidate.category));
    }

    if candidate.tool == self.record.tool {
      score += config.tool_weight;
      evidence.push(format!("same tool ({})", candidate.tool));
    }

    let candidate_keywords = title_keywords(&candidate.title, config.min_keyword_len);
    let mut shared_keywords: Vec<&str> = self
      .keywords
      .intersection(&candidate_keywords)
      .map(String::as_str)
      .collect();
    if !shared_keywords.is_empty() {
      shared_keywords.sort_unstable();
      score += config.keyword_weight * shared_keywords.len() as u32;
      evidence.push(format!("shared title keywords: {}", shared_keywords.join(", ")));
    }

    let candidate_aliases: HashSet<&str> = candidate.aliases.iter().map(String::as_str).collect();
    let mut shared_aliases: Vec<&str> = self
      .aliases
      .intersection(&candidate_aliases)
      .copied()
      .collect();
    if !shared_aliases.is_empty() {
      shared_aliases.sort_unstable();
      score += config.alias_weight * shared_aliases.len() as u32;
      evidence.push(format!("shared aliases: {}", shared_aliases.join(", ")));
    }

    (score, evidence)
  }
}

/// Rank `pool` by relatedness to `target`.
///
/// - Fails fast when the target or any pool record has a blank
///   tool / canonical_slug / category / title.
/// - Excludes records whose `(tool, canonical_slug)` equals the target's.
/// - Drops zero scores; sorts by score descending. The sort is stable, so
///   equal scores keep their pool order.
/// - Returns at most `limit` candidates; `limit == 0` yields an empty list.
pub fn rank<'a>(
  target: &ErrorRecord,
  pool: &'a [ErrorRecord],
  limit: usize,
  config: &Config,
) -> Result<Vec<ScoredCandidate<'a>>, EngineError> {
  ensure_rankable(target, "target")?;
  let profile = TargetProfile::new(target, config);

  let mut scored = Vec::new();
  for (idx, candidate) in pool.iter().enumerate() {
    ensure_rankable(candidate, &format!("pool[{}]", idx))?;
    if candidate.key() == target.key() {
      continue;
    }

    let (similarity_score, evidence) = profile.score(candidate, config);
    if similarity_score > 0 {
      scored.push(ScoredCandidate {
        record: candidate,
        similarity_score,
        evidence,
      });
    }
  }

  scored.sort_by(|a, b| b.similarity_score.cmp(&a.similarity_score));
  scored.truncate(limit);
  Ok(scored)
}

/// Classify a ranked candidate relative to the target.
///
/// The three non-`Other` predicates are mutually exclusive.
pub fn relationship(target: &ErrorRecord, candidate: &ScoredCandidate<'_>, config: &Config) -> Relationship {
  let record = candidate.record;
  if record.category == target.category {
    Relationship::SameCategory
  } else if record.tool == target.tool {
    Relationship::SameTool
  } else if candidate.similarity_score >= config.similar_pattern_min_score {
    Relationship::SimilarPattern
  } else {
    Relationship::Other
  }
}

/// Ranked candidates partitioned by relationship, in ranked order.
#[derive(Debug, Default)]
pub struct Buckets<'r, 'a> {
  pub same_category: Vec<&'r ScoredCandidate<'a>>,
  pub same_tool: Vec<&'r ScoredCandidate<'a>>,
  pub similar_pattern: Vec<&'r ScoredCandidate<'a>>,
}

/// Partition an already ranked (and truncated) list. Nothing is re-scored,
/// so a smaller `limit` upstream means fewer entries per bucket.
pub fn bucket<'r, 'a>(
  target: &ErrorRecord,
  ranked: &'r [ScoredCandidate<'a>],
  config: &Config,
) -> Buckets<'r, 'a> {
  let mut buckets = Buckets::default();
  for candidate in ranked {
    match relationship(target, candidate, config) {
      Relationship::SameCategory => buckets.same_category.push(candidate),
      Relationship::SameTool => buckets.same_tool.push(candidate),
      Relationship::SimilarPattern => buckets.similar_pattern.push(candidate),
      Relationship::Other => {}
    }
  }
  buckets
}
