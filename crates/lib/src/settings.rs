//! Project-wide build settings.
//!
//! Settings are layered: built-in defaults, then the project file, then the
//! `BUILD__DIR` environment variable, then whatever the caller sets last.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::config::{CompileOptions, OutputOptions};
use crate::consts::{
  BUILD_DIR_ENV, DEBUG_DIR, DEFAULT_BUILD_DIR, DEFAULT_COMPILER, DEFAULT_TYPINGS_TOOL, MAKEFILE, MARKER_FILE,
  PACKAGE_MANIFEST, PROJECT_FILE, RELEASE_DIR, TYPINGS_FILE,
};
use crate::stage::minifier::{MinifyCommands, StampMinifier};

/// Per-stage option defaults.
///
/// `client` applies to configurations that name a single output file,
/// `server` to module-style configurations without one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StageDefaults {
  #[serde(default)]
  pub client: CompileOptions,
  #[serde(default)]
  pub server: CompileOptions,
  #[serde(default)]
  pub package: OutputOptions,
}

/// Build-definition files tracked by the generated marker file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Definitions {
  /// Hand-written definition sources; changing one regenerates the marker.
  #[serde(default)]
  pub sources: Vec<PathBuf>,
  /// Artifacts generated from the sources, removed by the marker's `clean` rule.
  #[serde(default)]
  pub generated: Vec<PathBuf>,
}

impl Default for Definitions {
  fn default() -> Self {
    Self {
      sources: vec![PathBuf::from(PROJECT_FILE)],
      generated: Vec::new(),
    }
  }
}

/// Everything a stage needs besides the configuration itself.
#[derive(Debug, Clone)]
pub struct BuildSettings {
  /// Root of all build output; `debug/` and `release/` live beneath it.
  pub build_dir: PathBuf,
  pub compiler: PathBuf,
  pub typings_tool: PathBuf,
  pub makefile: PathBuf,
  pub package_manifest: PathBuf,
  pub typings_file: PathBuf,
  pub marker_file: PathBuf,
  pub definitions: Definitions,
  pub defaults: StageDefaults,
  pub minifier: Arc<dyn MinifyCommands>,
}

impl Default for BuildSettings {
  fn default() -> Self {
    Self {
      build_dir: PathBuf::from(DEFAULT_BUILD_DIR),
      compiler: PathBuf::from(DEFAULT_COMPILER),
      typings_tool: PathBuf::from(DEFAULT_TYPINGS_TOOL),
      makefile: PathBuf::from(MAKEFILE),
      package_manifest: PathBuf::from(PACKAGE_MANIFEST),
      typings_file: PathBuf::from(TYPINGS_FILE),
      marker_file: PathBuf::from(MARKER_FILE),
      definitions: Definitions::default(),
      defaults: StageDefaults::default(),
      minifier: Arc::new(StampMinifier),
    }
  }
}

impl BuildSettings {
  pub fn debug_dir(&self) -> PathBuf {
    self.build_dir.join(DEBUG_DIR)
  }

  pub fn release_dir(&self) -> PathBuf {
    self.build_dir.join(RELEASE_DIR)
  }

  pub fn with_build_dir(mut self, build_dir: impl Into<PathBuf>) -> Self {
    self.build_dir = build_dir.into();
    self
  }

  pub fn with_compiler(mut self, compiler: impl Into<PathBuf>) -> Self {
    self.compiler = compiler.into();
    self
  }

  pub fn with_minifier(mut self, minifier: Arc<dyn MinifyCommands>) -> Self {
    self.minifier = minifier;
    self
  }

  /// Apply the `BUILD__DIR` override, if set to a non-empty value.
  pub fn apply_env(mut self) -> Self {
    if let Some(dir) = std::env::var_os(BUILD_DIR_ENV).filter(|v| !v.is_empty()) {
      debug!(build_dir = ?dir, "build directory overridden by {}", BUILD_DIR_ENV);
      self.build_dir = PathBuf::from(dir);
    }
    self
  }
}
