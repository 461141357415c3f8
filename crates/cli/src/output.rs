//! CLI output formatting utilities.
//!
//! Provides consistent formatting for terminal output including colored status
//! messages, human-readable durations, and Unicode symbols, plus the printers
//! for planned rules and run reports.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

use stagecraft_lib::execute::RunReport;
use stagecraft_lib::graph::{Rule, RuleKind};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
  pub const PLUS: &str = "+";
}

pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let millis = duration.subsec_millis();

  if secs >= 60 {
    let mins = secs / 60;
    let remaining_secs = secs % 60;
    format!("{}m {}s", mins, remaining_secs)
  } else if secs > 0 {
    format!("{}.{:02}s", secs, millis / 10)
  } else {
    format!("{}ms", millis)
  }
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

fn rule_kind(rule: &Rule) -> &'static str {
  match &rule.kind {
    RuleKind::Directory => "dir",
    RuleKind::File { .. } => "file",
    RuleKind::Aggregate => "aggregate",
  }
}

/// `+ target (kind) <- prereq prereq`
pub fn format_rule(rule: &Rule) -> String {
  let prerequisites: Vec<String> = rule.prerequisites.iter().map(|p| p.display().to_string()).collect();
  format!(
    "{} {} ({}) <- {}",
    symbols::PLUS,
    rule.target.display(),
    rule_kind(rule),
    prerequisites.join(" ")
  )
}

/// Print a planned rule followed by its actions, indented.
pub fn print_rule(rule: &Rule) {
  println!("  {}", format_rule(rule));
  for action in rule.actions() {
    println!("      {}", action.if_supports_color(Stream::Stdout, |s| s.dimmed()));
  }
}

pub fn format_skipped(target: &Path, dependency: &Path) -> String {
  format!("skipped {} ({} failed)", target.display(), dependency.display())
}

/// Print every failed rule, then every rule skipped because of one.
pub fn print_failures(report: &RunReport) {
  for (target, err) in &report.failed {
    print_error(&format!("{}: {}", target.display(), err));
  }
  for (target, dependency) in &report.skipped {
    print_warning(&format_skipped(target, dependency));
  }
}

/// Print rule counts and the produced outputs of a successful run.
pub fn print_summary(report: &RunReport, outputs: &[PathBuf]) {
  print_stat("Built", &report.built.len().to_string());
  print_stat("Up to date", &report.up_to_date.len().to_string());
  println!();
  for output in outputs {
    println!("  {} {}", symbols::ARROW, output.display());
  }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
