//! Build stages.
//!
//! A stage maps one configuration to the path of the artifact it produces,
//! declaring the rules that produce it into the task graph. Stages never run
//! anything themselves.

pub mod compile;
pub mod deps;
pub mod minifier;
pub mod minify;
pub mod publish;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::ConfigError;
use crate::graph::{BuildGraph, GraphError};
use crate::paths;
use crate::settings::BuildSettings;

pub use compile::compile;
pub use minify::minify;
pub use publish::publish;

/// Errors raised while a stage declares its rules.
#[derive(Debug, Error)]
pub enum StageError {
  #[error(transparent)]
  Graph(#[from] GraphError),

  #[error(transparent)]
  Config(#[from] ConfigError),
}

/// Shared state for declaring the stages of one run.
#[derive(Debug, Clone)]
pub struct StageContext<'a> {
  pub settings: &'a BuildSettings,
  /// Directory every declared path is made relative to.
  pub cwd: PathBuf,
  shared: Vec<PathBuf>,
}

impl<'a> StageContext<'a> {
  /// Create a context, declaring the shared auxiliary dependencies into `graph`.
  pub fn new(graph: &mut BuildGraph, settings: &'a BuildSettings, cwd: &Path) -> Result<Self, GraphError> {
    let shared = deps::collect(graph, settings, cwd)?;
    Ok(Self {
      settings,
      cwd: cwd.to_path_buf(),
      shared,
    })
  }

  /// Normalize `path` relative to the context's working directory.
  pub fn relative(&self, path: &Path) -> PathBuf {
    paths::relative_to(path, &self.cwd)
  }

  /// Prerequisites every compile rule depends on.
  pub fn shared_dependencies(&self) -> &[PathBuf] {
    &self.shared
  }
}
