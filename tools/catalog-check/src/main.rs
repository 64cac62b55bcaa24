//! catalog-check: validate an error catalog dataset file
//!
//! Usage:
//!   catalog-check <file>      # report problems and per-tool / per-category counts
//!   catalog-check <file> -q   # quiet: exit 0 if clean, 1 if problems
//!
//! Exit codes: 0 clean, 1 problems found, 2 unreadable file or invalid JSON.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use related_engine::category::is_known;
use related_engine::normalize::normalize_record;
use related_engine::types::{ErrorRecord, InboundRecord};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "catalog-check")]
#[command(about = "Validate an error catalog dataset")]
#[command(version)]
struct Cli {
  /// Dataset file (JSON array of error documents)
  file: PathBuf,

  /// Quiet: only exit code (0=clean, 1=problems)
  #[arg(short, long)]
  quiet: bool,
}

#[derive(Default)]
struct Report {
  invalid: Vec<String>,
  duplicates: Vec<String>,
  unknown_categories: Vec<String>,
  incomplete: Vec<String>,
  by_tool: BTreeMap<String, usize>,
  by_category: BTreeMap<String, usize>,
  total: usize,
}

impl Report {
  fn has_problems(&self) -> bool {
    !self.invalid.is_empty() || !self.duplicates.is_empty() || !self.unknown_categories.is_empty()
  }
}

/// Records with no content beyond the ranking fields.
fn missing_content(record: &ErrorRecord) -> Vec<&'static str> {
  let mut missing = Vec::new();
  if record.summary.is_empty() {
    missing.push("summary");
  }
  if record.root_causes.is_empty() {
    missing.push("root_causes");
  }
  if record.fix_steps.is_empty() {
    missing.push("fix_steps");
  }
  if record.examples.is_empty() {
    missing.push("examples");
  }
  missing
}

fn check(docs: &[InboundRecord]) -> Report {
  let mut report = Report {
    total: docs.len(),
    ..Report::default()
  };
  let mut seen = HashSet::new();

  for (idx, doc) in docs.iter().enumerate() {
    let record = match normalize_record(doc) {
      Ok(r) => r,
      Err(e) => {
        report.invalid.push(format!("#{}: {}", idx, e));
        continue;
      }
    };
    let key = format!("{}/{}", record.tool, record.canonical_slug);
    debug!(%key, "checked");

    if !seen.insert(key.clone()) {
      report.duplicates.push(key);
      continue;
    }
    if !is_known(&record.category) {
      report.unknown_categories.push(format!("{} ({})", key, record.category));
    }
    let missing = missing_content(&record);
    if !missing.is_empty() {
      report.incomplete.push(format!("{} missing {}", key, missing.join(", ")));
    }

    *report.by_tool.entry(record.tool.clone()).or_insert(0) += 1;
    *report.by_category.entry(record.category.clone()).or_insert(0) += 1;
  }
  report
}

fn load(path: &Path) -> Vec<InboundRecord> {
  let contents = fs::read_to_string(path).unwrap_or_else(|e| {
    eprintln!("catalog-check: cannot read {}: {}", path.display(), e);
    process::exit(2);
  });
  serde_json::from_str(&contents).unwrap_or_else(|e| {
    eprintln!("catalog-check: invalid JSON in {}: {}", path.display(), e);
    process::exit(2);
  })
}

fn print_section(label: &str, prefix: &str, items: &[String]) {
  if items.is_empty() {
    return;
  }
  println!("{} ({}):", label, items.len());
  for item in items {
    println!("  {} {}", prefix, item);
  }
}

fn main() {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .init();

  let cli = Cli::parse();
  let report = check(&load(&cli.file));

  if cli.quiet {
    process::exit(if report.has_problems() { 1 } else { 0 });
  }

  println!("Total documents: {}", report.total);
  println!("Valid unique records: {}", report.by_tool.values().sum::<usize>());
  for (tool, count) in &report.by_tool {
    println!("  tool {}: {}", tool, count);
  }
  for (category, count) in &report.by_category {
    println!("  category {}: {}", category, count);
  }

  print_section("Invalid documents", "!", &report.invalid);
  print_section("Duplicate records", "=", &report.duplicates);
  print_section("Unknown categories", "?", &report.unknown_categories);
  print_section("Incomplete records", "~", &report.incomplete);

  if report.has_problems() {
    process::exit(1);
  }
  println!("No problems.");
}

#[cfg(test)]
mod tests {
  use super::*;

  fn docs(json: &str) -> Vec<InboundRecord> {
    serde_json::from_str(json).unwrap()
  }

  #[test]
  fn clean_dataset_has_no_problems() {
    let report = check(&docs(
      r#"[{"tool":"helm","canonical_slug":"a","title":"Alpha","category":"config"}]"#,
    ));
    assert!(!report.has_problems());
    assert_eq!(report.by_tool["helm"], 1);
    assert_eq!(report.incomplete.len(), 1);
  }

  #[test]
  fn flags_invalid_duplicate_and_unknown() {
    let report = check(&docs(
      r#"[
        {"tool":"helm","canonical_slug":"a","title":"Alpha","category":"config"},
        {"tool":"helm","canonical_slug":"a","title":"Again","category":"config"},
        {"tool":"helm","canonical_slug":"b","category":"config"},
        {"tool":"docker","canonical_slug":"c","title":"Gamma","category":"quantum"}
      ]"#,
    ));
    assert!(report.has_problems());
    assert_eq!(report.duplicates, vec!["helm/a".to_string()]);
    assert_eq!(report.invalid.len(), 1);
    assert!(report.invalid[0].starts_with("#2"));
    assert_eq!(report.unknown_categories, vec!["docker/c (quantum)".to_string()]);
    assert_eq!(report.total, 4);
  }

  #[test]
  fn bundled_dataset_is_clean() {
    let raw = include_str!("../../../server/related-engine/data/errors.json");
    let report = check(&docs(raw));
    assert!(!report.has_problems(), "{:?}", report.invalid);
  }
}
