//! Minify command generators.
//!
//! The minify stage asks a generator for the actions that turn the compiled
//! artifact into the minified file. A generator that returns no actions makes
//! the stage skip minification entirely.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::graph::Action;

/// Produces the actions that write `minified` from `inputs`.
pub trait MinifyCommands: Send + Sync + fmt::Debug {
  fn commands(&self, minified: &Path, out_dir: &Path, inputs: &[PathBuf]) -> Vec<Action>;
}

/// Placeholder minifier: appends a timestamp and the input list to the minified file.
#[derive(Debug, Clone, Copy, Default)]
pub struct StampMinifier;

impl MinifyCommands for StampMinifier {
  fn commands(&self, minified: &Path, _out_dir: &Path, inputs: &[PathBuf]) -> Vec<Action> {
    let note = inputs
      .iter()
      .map(|p| p.to_string_lossy().into_owned())
      .collect::<Vec<_>>()
      .join(" ");
    vec![Action::AppendStamp {
      path: minified.to_path_buf(),
      note: Some(note),
    }]
  }
}

/// An external minifier taking `--js <input>` and `--js_output_file <output>`.
#[derive(Debug, Clone)]
pub struct ExternalMinifier {
  pub program: PathBuf,
  pub args: Vec<String>,
}

impl MinifyCommands for ExternalMinifier {
  fn commands(&self, minified: &Path, _out_dir: &Path, inputs: &[PathBuf]) -> Vec<Action> {
    let mut args = self.args.clone();
    for input in inputs {
      args.push("--js".to_string());
      args.push(input.to_string_lossy().into_owned());
    }
    args.push("--js_output_file".to_string());
    args.push(minified.to_string_lossy().into_owned());

    vec![Action::Exec {
      program: self.program.clone(),
      args,
    }]
  }
}

/// Generator that yields nothing, so every configuration skips minification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMinifier;

impl MinifyCommands for NoMinifier {
  fn commands(&self, _minified: &Path, _out_dir: &Path, _inputs: &[PathBuf]) -> Vec<Action> {
    Vec::new()
  }
}

/// Minifier selection as written in a project file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MinifierSpec {
  #[default]
  Stamp,
  External {
    program: PathBuf,
    #[serde(default)]
    args: Vec<String>,
  },
  #[serde(rename = "none")]
  Disabled,
}

impl MinifierSpec {
  pub fn into_commands(self) -> Arc<dyn MinifyCommands> {
    match self {
      MinifierSpec::Stamp => Arc::new(StampMinifier),
      MinifierSpec::External { program, args } => Arc::new(ExternalMinifier { program, args }),
      MinifierSpec::Disabled => Arc::new(NoMinifier),
    }
  }
}
