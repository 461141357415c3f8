//! Rule and action types for the task graph.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Errors raised while declaring or walking the task graph.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
  /// Two different rules claim the same target.
  #[error("conflicting rules for {target}: already declared with different prerequisites or actions")]
  ConflictingRule { target: PathBuf },

  /// Cycle detected in the dependency graph.
  #[error("dependency cycle detected")]
  CycleDetected,

  /// The requested goal has no rule.
  #[error("no rule to make target {0}")]
  UnknownTarget(PathBuf),
}

/// A single step of a file rule's recipe.
///
/// Actions hold no run-time values (such as timestamps) so that redeclaring
/// the same rule compares equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Action {
  /// Run a program directly with arguments.
  Exec { program: PathBuf, args: Vec<String> },
  /// Run a command line through the shell (pipes, redirections).
  Shell { command: String },
  /// Append a `//<timestamp>` comment line, followed by `note` when given.
  AppendStamp { path: PathBuf, note: Option<String> },
  /// Write `contents` to `path`, replacing it.
  WriteFile { path: PathBuf, contents: String },
  /// Install type declarations for the dependencies listed in a package manifest.
  InstallTypings { manifest: PathBuf, tool: PathBuf },
}

impl fmt::Display for Action {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Action::Exec { program, args } => {
        write!(f, "{}", program.display())?;
        for arg in args {
          write!(f, " {}", arg)?;
        }
        Ok(())
      }
      Action::Shell { command } => write!(f, "{}", command),
      Action::AppendStamp { path, note } => match note {
        Some(note) => write!(f, "stamp {} ({})", path.display(), note),
        None => write!(f, "stamp {}", path.display()),
      },
      Action::WriteFile { path, .. } => write!(f, "write {}", path.display()),
      Action::InstallTypings { manifest, tool } => {
        write!(f, "{} install <dependencies of {}>", tool.display(), manifest.display())
      }
    }
  }
}

/// What a rule does when it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RuleKind {
  /// Ensure a directory exists; creating an existing directory succeeds.
  Directory,
  /// Produce a file by running actions in order.
  File { actions: Vec<Action> },
  /// Phony target that only groups its prerequisites.
  Aggregate,
}

/// A node of the task graph, identified by its target path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
  pub target: PathBuf,
  pub prerequisites: Vec<PathBuf>,
  pub kind: RuleKind,
}

impl Rule {
  pub fn is_directory(&self) -> bool {
    matches!(self.kind, RuleKind::Directory)
  }

  pub fn is_aggregate(&self) -> bool {
    matches!(self.kind, RuleKind::Aggregate)
  }

  pub fn actions(&self) -> &[Action] {
    match &self.kind {
      RuleKind::File { actions } => actions,
      RuleKind::Directory | RuleKind::Aggregate => &[],
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn exec_display_joins_args() {
    let action = Action::Exec {
      program: PathBuf::from("node_modules/.bin/tsc"),
      args: vec!["--outDir".to_string(), "build/debug/x".to_string(), "a.ts".to_string()],
    };
    assert_eq!(action.to_string(), "node_modules/.bin/tsc --outDir build/debug/x a.ts");
  }

  #[test]
  fn shell_display_is_command() {
    let action = Action::Shell {
      command: "gzip --best < a > a.gz".to_string(),
    };
    assert_eq!(action.to_string(), "gzip --best < a > a.gz");
  }

  #[test]
  fn directory_rule_has_no_actions() {
    let rule = Rule {
      target: PathBuf::from("build"),
      prerequisites: vec![],
      kind: RuleKind::Directory,
    };
    assert!(rule.is_directory());
    assert!(rule.actions().is_empty());
  }
}
