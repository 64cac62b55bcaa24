//! Validate inbound documents into canonical ErrorRecords; normalize free text.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::error::EngineError;
use crate::types::*;

/// Free text is clipped to this many chars before any other processing.
pub const MAX_TEXT_CHARS: usize = 20_000;

static ANSI_SGR: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("ANSI SGR pattern compiles"));

/// Parse and validate an InboundRecord into a canonical ErrorRecord.
pub fn normalize_record(raw: &InboundRecord) -> Result<ErrorRecord, EngineError> {
  let tool = required("tool", raw.tool.as_deref())?.to_ascii_lowercase();
  let canonical_slug = required("canonical_slug", raw.canonical_slug.as_deref())?;
  let title = required("title", raw.title.as_deref())?;
  let category = required("category", raw.category.as_deref())?.to_ascii_lowercase();

  for cause in &raw.root_causes {
    if !(0.0..=1.0).contains(&cause.confidence) {
      return Err(EngineError::validation(
        "root_causes[].confidence",
        "must be between 0 and 1",
      ));
    }
  }

  let created_at = parse_timestamp("created_at", raw.created_at.as_deref())?;
  let updated_at = parse_timestamp("updated_at", raw.updated_at.as_deref())?;

  Ok(ErrorRecord {
    tool,
    canonical_slug,
    title,
    category,
    aliases: raw.aliases.clone(),
    matchers: raw.matchers.clone(),
    summary: raw.summary.clone(),
    root_causes: raw.root_causes.clone(),
    fix_steps: raw.fix_steps.clone(),
    clarifying_questions: raw.clarifying_questions.clone(),
    examples: raw.examples.clone(),
    created_at,
    updated_at,
  })
}

/// Check that a record carries every field the ranker reads.
///
/// Records built by `normalize_record` always pass; this guards records that
/// were assembled by hand.
pub fn ensure_rankable(record: &ErrorRecord, prefix: &str) -> Result<(), EngineError> {
  let fields = [
    ("tool", &record.tool),
    ("canonical_slug", &record.canonical_slug),
    ("category", &record.category),
    ("title", &record.title),
  ];
  for (name, value) in fields {
    if value.trim().is_empty() {
      return Err(EngineError::validation(
        &format!("{}.{}", prefix, name),
        "must not be blank",
      ));
    }
  }
  Ok(())
}

/// Normalize free text for matching:
/// - clip to MAX_TEXT_CHARS
/// - lowercase
/// - strip ANSI color sequences
/// - collapse whitespace, trim
pub fn normalize_text(text: &str) -> String {
  let clipped: String = text.chars().take(MAX_TEXT_CHARS).collect();
  let stripped = strip_ansi(&clipped.to_lowercase());
  stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn required(field: &str, value: Option<&str>) -> Result<String, EngineError> {
  match value.map(str::trim) {
    Some(v) if !v.is_empty() => Ok(v.to_string()),
    Some(_) => Err(EngineError::validation(field, "must not be empty")),
    None => Err(EngineError::validation(field, "is required")),
  }
}

fn parse_timestamp(field: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>, EngineError> {
  match value {
    Some(ts) => DateTime::parse_from_rfc3339(ts)
      .map(|dt| Some(dt.with_timezone(&Utc)))
      .map_err(|e| EngineError::validation(field, &format!("invalid RFC3339: {}", e))),
    None => Ok(None),
  }
}

/// Remove `ESC [ <digits/;> m` sequences. Unterminated sequences are kept.
fn strip_ansi(s: &str) -> String {
  ANSI_SGR.replace_all(s, "").into_owned()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn inbound() -> InboundRecord {
    InboundRecord {
      tool: Some("Kubernetes".into()),
      canonical_slug: Some(" crashloopbackoff ".into()),
      title: Some("CrashLoopBackOff".into()),
      category: Some("Runtime".into()),
      aliases: vec!["crash loop".into()],
      summary: "Container keeps restarting.".into(),
      updated_at: Some("2025-01-15T10:30:00Z".into()),
      ..Default::default()
    }
  }

  #[test]
  fn normalize_valid_record() {
    let record = normalize_record(&inbound()).unwrap();
    assert_eq!(record.tool, "kubernetes");
    assert_eq!(record.canonical_slug, "crashloopbackoff");
    assert_eq!(record.category, "runtime");
    assert_eq!(record.title, "CrashLoopBackOff");
    assert!(record.updated_at.is_some());
    assert!(record.created_at.is_none());
  }

  #[test]
  fn missing_title_is_rejected() {
    let mut raw = inbound();
    raw.title = None;
    let err = normalize_record(&raw).unwrap_err();
    assert!(err.to_string().contains("title"));
    assert!(err.to_string().contains("required"));
  }

  #[test]
  fn blank_category_is_rejected() {
    let mut raw = inbound();
    raw.category = Some("   ".into());
    let err = normalize_record(&raw).unwrap_err();
    assert!(err.to_string().contains("category"));
  }

  #[test]
  fn bad_timestamp_is_rejected() {
    let mut raw = inbound();
    raw.created_at = Some("yesterday".into());
    let err = normalize_record(&raw).unwrap_err();
    assert!(err.to_string().contains("created_at"));
  }

  #[test]
  fn confidence_out_of_range_is_rejected() {
    let mut raw = inbound();
    raw.root_causes = vec![RootCause {
      name: "x".into(),
      why: "y".into(),
      confidence: 1.5,
      sources: vec![],
    }];
    let err = normalize_record(&raw).unwrap_err();
    assert!(err.to_string().contains("confidence"));
  }

  #[test]
  fn ensure_rankable_names_the_blank_field() {
    let mut record = normalize_record(&inbound()).unwrap();
    record.canonical_slug = String::new();
    let err = ensure_rankable(&record, "pool[2]").unwrap_err();
    assert!(err.to_string().contains("pool[2].canonical_slug"));
  }

  #[test]
  fn normalize_text_basics() {
    assert_eq!(normalize_text("  Pod   Pending\n\tNow "), "pod pending now");
    assert_eq!(
      normalize_text("\x1b[31mError:\x1b[0m ImagePullBackOff"),
      "error: imagepullbackoff"
    );
    assert_eq!(normalize_text(""), "");
  }

  #[test]
  fn strips_every_sgr_sequence() {
    assert_eq!(
      normalize_text("\x1b[1;31mFailed\x1b[0m to pull \x1b[33mnginx:latest\x1b[m"),
      "failed to pull nginx:latest"
    );
    // Non-SGR escapes are left alone.
    assert_eq!(normalize_text("a\x1b[2Kb"), "a\x1b[2kb");
  }

  #[test]
  fn unterminated_escape_is_kept() {
    assert_eq!(normalize_text("a\x1b[31b"), "a\x1b[31b");
  }

  #[test]
  fn normalize_text_clips_long_input() {
    let long = "x".repeat(MAX_TEXT_CHARS + 50);
    assert_eq!(normalize_text(&long).chars().count(), MAX_TEXT_CHARS);
  }
}
