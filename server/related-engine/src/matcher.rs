//! Match pasted error output against catalog records.
//!
//! Each record is scored from independent signals (exact slug, stored regex
//! patterns, aliases, title, summary, top root causes, Kubernetes context
//! words in the fix steps) plus a category boost. The best record and a
//! confidence band form the result; the top five records are suggestions.

use std::collections::HashSet;

use crate::config::ExplainWeights;
use crate::normalize::normalize_text;
use crate::search::compile_matcher;
use crate::types::{
  ErrorRecord, ExplainResponse, MatchDetail, MatchKind, MatchResult, MatchSummary, SourceLink, Suggestion,
};

const MAX_SUGGESTIONS: usize = 5;
const MAX_CAUSES: usize = 3;
const MAX_CONTEXT_KEYWORDS: usize = 5;
const SHORT_TEXT_CHARS: usize = 10;
const SHORT_TEXT_FACTOR: f64 = 0.8;

/// Below this confidence the response asks a clarifying question and lists
/// alternatives.
pub const LOW_CONFIDENCE: f64 = 0.6;

/// Asked when the matched record has no clarifying questions of its own.
pub const DEFAULT_QUESTION: &str = "Can you provide more context about when this error occurs?";

const K8S_KEYWORDS: &[&str] = &[
  "pod",
  "container",
  "deployment",
  "service",
  "node",
  "cluster",
  "image",
  "volume",
  "secret",
  "configmap",
  "namespace",
  "ingress",
  "kubelet",
  "api",
  "scheduler",
  "controller",
  "etcd",
  "proxy",
];

fn category_boost(category: &str) -> f64 {
  match category {
    "runtime" => 15.0,
    "network" => 12.0,
    "auth" | "storage" => 10.0,
    "config" | "scheduler" | "cluster" => 8.0,
    _ => 0.0,
  }
}

fn round1(x: f64) -> f64 {
  (x * 10.0).round() / 10.0
}

/// Lowercase word tokens longer than 2 chars; punctuation splits words.
pub fn tokenize(text: &str) -> Vec<String> {
  text
    .to_lowercase()
    .chars()
    .map(|c| if c.is_alphanumeric() || c == '_' || c.is_whitespace() { c } else { ' ' })
    .collect::<String>()
    .split_whitespace()
    .filter(|t| t.chars().count() > 2)
    .map(str::to_string)
    .collect()
}

/// Confidence band for a best score, adjusted for input length.
pub fn confidence(score: f64, text_len: usize) -> f64 {
  let base = if score >= 80.0 {
    0.95
  } else if score >= 60.0 {
    0.85
  } else if score >= 40.0 {
    0.75
  } else if score >= 25.0 {
    0.65
  } else if score >= 15.0 {
    0.5
  } else if score >= 8.0 {
    0.35
  } else {
    0.1
  };

  let adjusted: f64 = if text_len < 20 {
    base * 0.8
  } else if text_len > 100 {
    base * 0.9
  } else {
    base
  };
  adjusted.min(0.99)
}

struct Scorer<'w> {
  text: &'w str,
  text_len: f64,
  tokens: Vec<String>,
  weights: &'w ExplainWeights,
}

impl Scorer<'_> {
  fn detail(kind: MatchKind, pattern: &str, matched_text: String, score: f64) -> MatchDetail {
    MatchDetail {
      kind,
      pattern: pattern.to_string(),
      matched_text,
      score: round1(score),
    }
  }

  /// Query tokens for which `keep(token)` holds, joined by spaces.
  fn joined(&self, keep: impl Fn(&str) -> bool) -> String {
    self
      .tokens
      .iter()
      .filter(|t| keep(t))
      .map(String::as_str)
      .collect::<Vec<_>>()
      .join(" ")
  }

  fn score(&self, record: &ErrorRecord) -> (f64, Vec<MatchDetail>) {
    let mut details = Vec::new();
    let mut total = 0.0;

    if self.text == record.canonical_slug {
      total += self.weights.exact;
      details.push(Self::detail(
        MatchKind::Exact,
        &record.canonical_slug,
        self.text.to_string(),
        self.weights.exact,
      ));
    }

    total += self.regex(record, &mut details);
    total += self.aliases(record, &mut details);
    total += self.title(record, &mut details);
    total += self.summary(record, &mut details);
    total += self.causes(record, &mut details);
    total += self.context(record, &mut details);

    let boost = category_boost(&record.category);
    if boost > 0.0 {
      total += boost;
      details.push(Self::detail(
        MatchKind::Semantic,
        &format!("category:{}", record.category),
        record.category.clone(),
        boost,
      ));
    }

    if self.weights.length_penalty && (self.text_len as usize) < SHORT_TEXT_CHARS {
      total *= SHORT_TEXT_FACTOR;
    }
    (total, details)
  }

  /// Every distinct stored pattern that matches; longer matches weigh more.
  fn regex(&self, record: &ErrorRecord, details: &mut Vec<MatchDetail>) -> f64 {
    let mut seen = HashSet::new();
    let mut score = 0.0;
    for pattern in &record.matchers.regex {
      if seen.contains(pattern.as_str()) {
        continue;
      }
      let Some(found) = compile_matcher(pattern).and_then(|re| re.find(self.text).map(|m| m.as_str().to_string()))
      else {
        continue;
      };
      seen.insert(pattern.as_str());
      let s = self.weights.regex * (1.0 + found.chars().count() as f64 / self.text_len);
      score += s;
      details.push(Self::detail(MatchKind::Regex, pattern, found, s));
    }
    score
  }

  fn aliases(&self, record: &ErrorRecord, details: &mut Vec<MatchDetail>) -> f64 {
    let mut score = 0.0;
    for alias in &record.aliases {
      let normalized = normalize_text(alias);
      if normalized.is_empty() {
        continue;
      }

      if self.text.contains(&normalized) {
        let s = self.weights.alias * (normalized.chars().count() as f64 / self.text_len);
        score += s;
        details.push(Self::detail(MatchKind::Alias, alias, normalized, s));
        continue;
      }

      let alias_tokens = tokenize(&normalized);
      let count = self
        .tokens
        .iter()
        .filter(|t| alias_tokens.iter().any(|a| a.contains(t.as_str()) || t.contains(a.as_str())))
        .count();
      if count > 0 {
        let s = self.weights.alias * 0.5 * (count as f64 / self.tokens.len().max(alias_tokens.len()) as f64);
        score += s;
        let matched = self.joined(|t| alias_tokens.iter().any(|a| a.contains(t)));
        details.push(Self::detail(MatchKind::Alias, alias, matched, s));
      }
    }
    score
  }

  fn title(&self, record: &ErrorRecord, details: &mut Vec<MatchDetail>) -> f64 {
    let title = normalize_text(&record.title);
    if self.text.contains(&title) || title.contains(self.text) {
      details.push(Self::detail(
        MatchKind::Title,
        &record.title,
        record.title.clone(),
        self.weights.title,
      ));
      return self.weights.title;
    }

    let title_tokens = tokenize(&title);
    let count = self
      .tokens
      .iter()
      .filter(|t| title_tokens.iter().any(|tt| tt.contains(t.as_str()) || t.contains(tt.as_str())))
      .count();
    if count == 0 {
      return 0.0;
    }
    let s = self.weights.title * 0.7 * (count as f64 / title_tokens.len() as f64);
    let matched = self.joined(|t| title_tokens.iter().any(|tt| tt.contains(t)));
    details.push(Self::detail(MatchKind::Title, &record.title, matched, s));
    s
  }

  /// Count of query tokens longer than 3 chars found inside `text`'s tokens,
  /// plus those tokens.
  fn overlap(&self, text: &str) -> (usize, Vec<String>) {
    let tokens = tokenize(&normalize_text(text));
    let count = self
      .tokens
      .iter()
      .filter(|t| t.chars().count() > 3 && tokens.iter().any(|x| x.contains(t.as_str())))
      .count();
    (count, tokens)
  }

  fn summary(&self, record: &ErrorRecord, details: &mut Vec<MatchDetail>) -> f64 {
    let (count, summary_tokens) = self.overlap(&record.summary);
    if count == 0 {
      return 0.0;
    }
    let s = self.weights.summary * (count as f64 / self.tokens.len() as f64);
    let pattern: String = record.summary.chars().take(50).collect();
    let matched = self.joined(|t| summary_tokens.iter().any(|x| x.contains(t)));
    details.push(Self::detail(MatchKind::Summary, &format!("{}...", pattern), matched, s));
    s
  }

  /// First three root causes, each weighted by its confidence.
  fn causes(&self, record: &ErrorRecord, details: &mut Vec<MatchDetail>) -> f64 {
    let mut score = 0.0;
    for cause in record.root_causes.iter().take(MAX_CAUSES) {
      let (count, cause_tokens) = self.overlap(&format!("{} {}", cause.name, cause.why));
      if count == 0 {
        continue;
      }
      let s = self.weights.cause * (count as f64 / self.tokens.len() as f64) * cause.confidence;
      score += s;
      let matched = self.joined(|t| cause_tokens.iter().any(|x| x.contains(t)));
      details.push(Self::detail(MatchKind::Cause, &cause.name, matched, s));
    }
    score
  }

  /// Query tokens that are Kubernetes keywords used in the record's fix steps.
  fn context(&self, record: &ErrorRecord, details: &mut Vec<MatchDetail>) -> f64 {
    let keywords: Vec<String> = record
      .fix_steps
      .iter()
      .flat_map(|step| tokenize(&step.step))
      .filter(|t| K8S_KEYWORDS.contains(&t.as_str()))
      .take(MAX_CONTEXT_KEYWORDS)
      .collect();

    let matched: Vec<&str> = self
      .tokens
      .iter()
      .filter(|t| keywords.contains(t))
      .map(String::as_str)
      .collect();
    if matched.is_empty() {
      return 0.0;
    }
    let s = self.weights.semantic * matched.len() as f64;
    details.push(Self::detail(MatchKind::Semantic, "kubernetes-context", matched.join(" "), s));
    s
  }
}

/// Score every record against already normalized `text`.
///
/// Ties keep catalog order. Empty text, or no record scoring above zero,
/// yields no match.
pub fn match_error(text: &str, records: &[ErrorRecord], weights: &ExplainWeights) -> MatchResult {
  let mut result = MatchResult {
    tool: None,
    slug: None,
    confidence: 0.0,
    score: 0.0,
    match_details: Vec::new(),
    suggestions: Vec::new(),
  };
  if text.trim().is_empty() {
    return result;
  }

  let text_len = text.chars().count();
  let scorer = Scorer {
    text,
    text_len: text_len as f64,
    tokens: tokenize(text),
    weights,
  };

  let mut scored: Vec<(&ErrorRecord, f64, Vec<MatchDetail>)> = records
    .iter()
    .map(|r| {
      let (score, details) = scorer.score(r);
      (r, score, details)
    })
    .collect();
  scored.sort_by(|a, b| b.1.total_cmp(&a.1));

  result.suggestions = scored
    .iter()
    .take(MAX_SUGGESTIONS)
    .map(|(r, score, _)| Suggestion {
      tool: r.tool.clone(),
      slug: r.canonical_slug.clone(),
      title: r.title.clone(),
      category: r.category.clone(),
      score: round1(*score),
    })
    .collect();

  let top_score = scored.first().map_or(0.0, |s| s.1);
  result.confidence = confidence(top_score, text_len);
  if let Some((record, score, details)) = scored.into_iter().next().filter(|s| s.1 > 0.0) {
    result.tool = Some(record.tool.clone());
    result.slug = Some(record.canonical_slug.clone());
    result.score = round1(score);
    result.match_details = details;
  }
  result
}

/// Sources of causes, fix steps and examples, first occurrence per URL.
pub fn unique_sources(record: &ErrorRecord) -> Vec<SourceLink> {
  let all = record
    .root_causes
    .iter()
    .flat_map(|c| &c.sources)
    .chain(record.fix_steps.iter().flat_map(|s| &s.sources))
    .chain(record.examples.iter().flat_map(|e| &e.sources));

  let mut seen = HashSet::new();
  all.filter(|s| seen.insert(s.url.as_str())).cloned().collect()
}

/// Build the explain response for a match against `record` (the matched
/// record, if any).
pub fn explain_response(result: MatchResult, record: Option<&ErrorRecord>) -> ExplainResponse {
  let low = result.confidence < LOW_CONFIDENCE;
  let clarifying_question = match record {
    Some(r) if low => Some(
      r.clarifying_questions
        .first()
        .cloned()
        .unwrap_or_else(|| DEFAULT_QUESTION.to_string()),
    ),
    _ => None,
  };

  ExplainResponse {
    tool: result.tool,
    matched: MatchSummary {
      slug: result.slug,
      confidence: result.confidence,
    },
    title: record.map(|r| r.title.clone()),
    summary: record.map(|r| r.summary.clone()),
    root_causes: record.map(|r| r.root_causes.clone()).unwrap_or_default(),
    fix_steps: record.map(|r| r.fix_steps.clone()).unwrap_or_default(),
    sources: record.map(unique_sources).unwrap_or_default(),
    clarifying_question,
    suggestions: if low { result.suggestions } else { Vec::new() },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::Catalog;
  use crate::types::DataSource;

  fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
  }

  fn fixture() -> Vec<ErrorRecord> {
    let json = r#"[
      {
        "tool": "kubernetes",
        "canonical_slug": "oomkilled",
        "title": "OOMKilled",
        "category": "runtime",
        "aliases": ["out of memory"],
        "matchers": {"regex": ["exit code 137", "exit code 137"]},
        "summary": "Killed for memory.",
        "root_causes": [
          {
            "name": "Memory limit",
            "why": "Limit too low",
            "confidence": 0.5,
            "sources": [{"url": "https://kubernetes.io/oom", "label": "OOM"}]
          }
        ],
        "fix_steps": [
          {
            "step": "Raise the container memory limit",
            "sources": [
              {"url": "https://kubernetes.io/oom", "label": "OOM again"},
              {"url": "https://kubernetes.io/limits", "label": "Limits"}
            ]
          }
        ],
        "clarifying_questions": ["What is the memory limit?"]
      },
      {
        "tool": "helm",
        "canonical_slug": "chart-missing",
        "title": "Chart Not Found",
        "category": "unlisted",
        "aliases": ["chart not found"]
      }
    ]"#;
    Catalog::from_json(json, DataSource::Static).unwrap().records().to_vec()
  }

  #[test]
  fn tokenize_splits_punctuation_and_drops_short() {
    assert_eq!(tokenize("Back-off: pod/x OK"), vec!["back", "off", "pod"]);
  }

  #[test]
  fn confidence_bands() {
    assert!(close(confidence(85.0, 50), 0.95));
    assert!(close(confidence(60.0, 50), 0.85));
    assert!(close(confidence(40.0, 50), 0.75));
    assert!(close(confidence(25.0, 50), 0.65));
    assert!(close(confidence(15.0, 50), 0.5));
    assert!(close(confidence(8.0, 50), 0.35));
    assert!(close(confidence(0.0, 50), 0.1));
    // Short and long inputs are discounted.
    assert!(close(confidence(85.0, 10), 0.95 * 0.8));
    assert!(close(confidence(85.0, 150), 0.95 * 0.9));
  }

  #[test]
  fn regex_alias_and_context_signals() {
    let records = fixture();
    let result = match_error("container exit code 137", &records, &ExplainWeights::default());
    assert_eq!(result.slug.as_deref(), Some("oomkilled"));
    // regex 25 * (1 + 13/23) once despite the repeated pattern, context 5, runtime 15.
    assert!(close(result.score, 59.1));
    assert!(close(result.confidence, 0.75));

    let kinds: Vec<MatchKind> = result.match_details.iter().map(|d| d.kind).collect();
    assert_eq!(kinds, vec![MatchKind::Regex, MatchKind::Semantic, MatchKind::Semantic]);
    assert_eq!(result.match_details[0].matched_text, "exit code 137");
    assert_eq!(result.match_details[1].matched_text, "container");
  }

  #[test]
  fn short_text_is_penalized() {
    let records = fixture();
    let result = match_error("oomkilled", &records, &ExplainWeights::default());
    // (exact 50 + title 15 + runtime 15) * 0.8
    assert!(close(result.score, 64.0));
    assert!(close(result.confidence, 0.85 * 0.8));
  }

  #[test]
  fn suggestions_are_ranked_and_capped() {
    let records = fixture();
    let result = match_error("chart not found", &records, &ExplainWeights::default());
    assert_eq!(result.slug.as_deref(), Some("chart-missing"));
    assert_eq!(result.tool.as_deref(), Some("helm"));
    assert_eq!(result.suggestions.len(), 2);
    assert!(result.suggestions[0].score >= result.suggestions[1].score);
  }

  #[test]
  fn empty_text_has_no_match() {
    let result = match_error("   ", &fixture(), &ExplainWeights::default());
    assert!(result.slug.is_none());
    assert!(result.suggestions.is_empty());
  }

  #[test]
  fn nothing_above_zero_is_no_match() {
    let records: Vec<ErrorRecord> = fixture().into_iter().filter(|r| r.tool == "helm").collect();
    let result = match_error("zzzz qqqq", &records, &ExplainWeights::default());
    assert!(result.slug.is_none());
    assert_eq!(result.suggestions.len(), 1);
  }

  #[test]
  fn sources_deduplicated_by_url() {
    let records = fixture();
    let sources = unique_sources(&records[0]);
    let urls: Vec<&str> = sources.iter().map(|s| s.url.as_str()).collect();
    assert_eq!(urls, vec!["https://kubernetes.io/oom", "https://kubernetes.io/limits"]);
    assert_eq!(sources[0].label, "OOM");
  }

  #[test]
  fn low_confidence_asks_a_question() {
    let records = fixture();
    // alias 5 + summary 10 + cause 4 + runtime 15, short-text penalty.
    let result = match_error("memory", &records, &ExplainWeights::default());
    assert_eq!(result.slug.as_deref(), Some("oomkilled"));
    assert!(close(result.score, 27.2));
    assert!(result.confidence < LOW_CONFIDENCE);
    let response = explain_response(result, Some(&records[0]));
    assert_eq!(response.clarifying_question.as_deref(), Some("What is the memory limit?"));
    assert_eq!(response.suggestions.len(), 2);
    assert_eq!(response.sources.len(), 2);
  }

  #[test]
  fn high_confidence_omits_question_and_suggestions() {
    let records = fixture();
    let text = "pod container was oomkilled with exit code 137 because it ran out of memory";
    let result = match_error(text, &records, &ExplainWeights::default());
    assert!(result.confidence >= LOW_CONFIDENCE);
    let response = explain_response(result, Some(&records[0]));
    assert!(response.clarifying_question.is_none());
    assert!(response.suggestions.is_empty());
    assert_eq!(response.title.as_deref(), Some("OOMKilled"));
  }

  #[test]
  fn record_without_questions_gets_default() {
    let records = fixture();
    let result = match_error("chart", &records, &ExplainWeights::default());
    assert!(result.confidence < LOW_CONFIDENCE);
    let response = explain_response(result, Some(&records[1]));
    assert_eq!(response.clarifying_question.as_deref(), Some(DEFAULT_QUESTION));
  }
}
