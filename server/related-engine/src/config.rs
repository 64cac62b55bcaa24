//! Ranking configuration with the catalog's standard weights.

/// Tunable weights and thresholds for relatedness scoring.
#[derive(Debug, Clone)]
pub struct Config {
  /// Added when candidate and target share a category.
  pub category_weight: u32,
  /// Added when candidate and target come from the same tool.
  pub tool_weight: u32,
  /// Added per shared title keyword.
  pub keyword_weight: u32,
  /// Added per shared alias.
  pub alias_weight: u32,
  /// Title tokens must be strictly longer than this (in chars) to count.
  pub min_keyword_len: usize,
  /// Minimum score for a cross-tool, cross-category entry to be a "similar pattern".
  pub similar_pattern_min_score: u32,
  /// Limit used when a caller does not pass one.
  pub default_limit: usize,
  /// Weights for matching pasted error text against records.
  pub explain: ExplainWeights,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      category_weight: 50,
      tool_weight: 30,
      keyword_weight: 15,
      alias_weight: 20,
      min_keyword_len: 3,
      similar_pattern_min_score: 15,
      default_limit: 10,
      explain: ExplainWeights::default(),
    }
  }
}

/// Per-signal weights for free-text matching (`matcher`).
#[derive(Debug, Clone)]
pub struct ExplainWeights {
  pub exact: f64,
  pub regex: f64,
  pub alias: f64,
  pub title: f64,
  pub summary: f64,
  pub cause: f64,
  pub semantic: f64,
  /// Scale scores of inputs shorter than 10 chars by 0.8.
  pub length_penalty: bool,
}

impl Default for ExplainWeights {
  fn default() -> Self {
    Self {
      exact: 50.0,
      regex: 25.0,
      alias: 20.0,
      title: 15.0,
      summary: 10.0,
      cause: 8.0,
      semantic: 5.0,
      length_penalty: true,
    }
  }
}
