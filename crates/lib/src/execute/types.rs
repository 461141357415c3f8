//! Types for graph execution.
//!
//! This module defines the error type, run report, and configuration for
//! executing a [`BuildGraph`](crate::graph::BuildGraph).

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;

use crate::graph::GraphError;

/// Errors that can occur while executing rules.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// Command execution failed.
  #[error("command failed with {}: {cmd}", exit_status(.code))]
  CmdFailed { cmd: String, code: Option<i32> },

  /// A command could not be started at all.
  #[error("failed to spawn {cmd}: {source}")]
  Spawn {
    cmd: String,
    #[source]
    source: std::io::Error,
  },

  /// I/O error during execution.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// A source prerequisite with no rule does not exist.
  #[error("no rule to make {prerequisite}, needed by {target}")]
  MissingPrerequisite { target: PathBuf, prerequisite: PathBuf },

  /// The package manifest could not be read as JSON.
  #[error("invalid package manifest {path}: {message}")]
  InvalidManifest { path: PathBuf, message: String },

  /// The graph could not be ordered.
  #[error(transparent)]
  Graph(#[from] GraphError),

  /// The worker pool was shut down before a rule could run.
  #[error("execution cancelled")]
  Cancelled,
}

fn exit_status(code: &Option<i32>) -> String {
  match code {
    Some(code) => format!("exit code {code}"),
    None => "no exit code (terminated by signal)".to_string(),
  }
}

/// How a single rule finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
  /// Actions ran (or the directory was created).
  Built,
  /// The target was newer than all of its prerequisites.
  UpToDate,
  /// An aggregate rule; nothing to do once its prerequisites succeeded.
  Grouped,
}

/// Result of executing a graph towards one goal.
#[derive(Debug, Default)]
pub struct RunReport {
  /// Targets whose rules ran, in completion order.
  pub built: Vec<PathBuf>,

  /// Targets that were already fresh.
  pub up_to_date: Vec<PathBuf>,

  /// Targets whose rules failed, with the error.
  pub failed: Vec<(PathBuf, ExecuteError)>,

  /// Targets skipped because a prerequisite failed.
  /// Maps skipped target -> the failed (or skipped) prerequisite.
  pub skipped: BTreeMap<PathBuf, PathBuf>,
}

impl RunReport {
  /// Whether every rule reachable from the goal succeeded.
  pub fn is_success(&self) -> bool {
    self.failed.is_empty() && self.skipped.is_empty()
  }

  /// The first recorded failure, if any.
  pub fn first_failure(&self) -> Option<&(PathBuf, ExecuteError)> {
    self.failed.first()
  }
}

/// Configuration for graph execution.
#[derive(Debug, Clone)]
pub struct ExecuteConfig {
  /// Maximum number of rules to run concurrently.
  pub parallelism: usize,

  /// Directory rule paths are relative to; commands run here.
  pub root: PathBuf,

  /// Shell used for [`Action::Shell`](crate::graph::Action::Shell).
  /// Defaults to `/bin/sh` on Unix and PowerShell on Windows.
  pub shell: Option<String>,
}

impl Default for ExecuteConfig {
  fn default() -> Self {
    Self {
      parallelism: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4),
      root: PathBuf::from("."),
      shell: None,
    }
  }
}

impl ExecuteConfig {
  pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
    self.root = root.into();
    self
  }

  pub fn with_parallelism(mut self, parallelism: usize) -> Self {
    self.parallelism = parallelism.max(1);
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_report_is_success() {
    assert!(RunReport::default().is_success());
  }

  #[test]
  fn skipped_rules_fail_the_report() {
    let mut report = RunReport::default();
    report.skipped.insert(PathBuf::from("run"), PathBuf::from("out.js"));
    assert!(!report.is_success());
  }

  #[test]
  fn first_failure_is_recorded_order() {
    let mut report = RunReport::default();
    report.failed.push((
      PathBuf::from("a"),
      ExecuteError::CmdFailed {
        cmd: "false".to_string(),
        code: Some(1),
      },
    ));
    report.failed.push((PathBuf::from("b"), ExecuteError::Cancelled));

    let (target, err) = report.first_failure().unwrap();
    assert_eq!(target, &PathBuf::from("a"));
    assert_eq!(err.to_string(), "command failed with exit code 1: false");
  }

  #[test]
  fn signal_termination_has_no_exit_code() {
    let err = ExecuteError::CmdFailed {
      cmd: "sleep 10".to_string(),
      code: None,
    };
    assert_eq!(
      err.to_string(),
      "command failed with no exit code (terminated by signal): sleep 10"
    );
  }

  #[test]
  fn parallelism_is_at_least_one() {
    assert_eq!(ExecuteConfig::default().with_parallelism(0).parallelism, 1);
    assert!(ExecuteConfig::default().parallelism >= 1);
  }
}
