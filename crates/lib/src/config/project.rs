//! Project file loading.
//!
//! A project file (`stagecraft.json`) lists the build configurations and,
//! optionally, tool locations and stage defaults. Relative paths inside it
//! are relative to the directory containing the file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::settings::{BuildSettings, Definitions, StageDefaults};
use crate::stage::minifier::MinifierSpec;

use super::registry::ConfigRegistry;
use super::types::{BuildConfig, ConfigError};

/// On-disk shape of a project file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectFile {
  #[serde(default)]
  pub build_dir: Option<PathBuf>,
  #[serde(default)]
  pub compiler: Option<PathBuf>,
  #[serde(default)]
  pub typings: Option<PathBuf>,
  #[serde(default)]
  pub makefile: Option<PathBuf>,
  #[serde(default)]
  pub definitions: Option<Definitions>,
  #[serde(default)]
  pub defaults: StageDefaults,
  #[serde(default)]
  pub minifier: MinifierSpec,
  pub configs: Vec<BuildConfig>,
}

impl ProjectFile {
  pub fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
    serde_json::from_str(content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Layer the file's settings over the built-in defaults.
  ///
  /// `file_name` is the project file's own name, tracked as a definition
  /// source when the file lists none.
  pub fn settings(&self, file_name: &Path) -> BuildSettings {
    let mut settings = BuildSettings::default();

    if let Some(dir) = &self.build_dir {
      settings.build_dir = dir.clone();
    }
    if let Some(compiler) = &self.compiler {
      settings.compiler = compiler.clone();
    }
    if let Some(typings) = &self.typings {
      settings.typings_tool = typings.clone();
    }
    if let Some(makefile) = &self.makefile {
      settings.makefile = makefile.clone();
    }
    settings.definitions = self.definitions.clone().unwrap_or_else(|| Definitions {
      sources: vec![file_name.to_path_buf()],
      generated: Vec::new(),
    });
    settings.defaults = self.defaults.clone();
    settings.minifier = self.minifier.clone().into_commands();

    settings
  }
}

/// A loaded project: where it lives, how to build, and what to build.
#[derive(Debug, Clone)]
pub struct Project {
  /// Directory containing the project file; all rule paths are relative to it.
  pub root: PathBuf,
  pub settings: BuildSettings,
  pub registry: ConfigRegistry,
}

/// Load a project file and apply the environment override.
pub fn load_project(path: &Path) -> Result<Project, ConfigError> {
  info!(path = %path.display(), "loading project");

  let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  let file = ProjectFile::parse(path, &content)?;

  let parent = match path.parent() {
    Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
    _ => PathBuf::from("."),
  };
  let root = dunce::canonicalize(&parent).unwrap_or(parent);

  let file_name = path.file_name().map(PathBuf::from).unwrap_or_else(|| path.to_path_buf());
  let settings = file.settings(&file_name).apply_env();

  let mut registry = ConfigRegistry::new();
  registry.replace_all(file.configs);

  debug!(root = %root.display(), configs = registry.len(), "project loaded");

  Ok(Project {
    root,
    settings,
    registry,
  })
}

#[cfg(test)]
mod tests {
  use serial_test::serial;
  use tempfile::TempDir;

  use super::*;
  use crate::config::PackageOptions;
  use crate::consts::BUILD_DIR_ENV;

  const PROJECT: &str = r#"{
    "buildDir": "out",
    "compiler": "bin/tsc",
    "defaults": { "client": { "target": "ES3" } },
    "minifier": { "kind": "none" },
    "configs": [
      { "name": "client", "files": ["a.ts", "b.ts"], "outFile": "client.js" },
      { "name": "server", "files": ["s.ts"], "package": null }
    ]
  }"#;

  #[test]
  #[serial]
  fn load_reads_configs_and_settings() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("stagecraft.json");
    std::fs::write(&path, PROJECT).unwrap();

    let project = temp_env::with_var_unset(BUILD_DIR_ENV, || load_project(&path)).unwrap();

    assert_eq!(project.registry.len(), 2);
    assert_eq!(project.settings.build_dir, PathBuf::from("out"));
    assert_eq!(project.settings.compiler, PathBuf::from("bin/tsc"));
    assert_eq!(project.settings.defaults.client.target.as_deref(), Some("ES3"));
    assert_eq!(project.settings.definitions.sources, vec![PathBuf::from("stagecraft.json")]);
    assert_eq!(project.root, dunce::canonicalize(temp.path()).unwrap());

    let server = project.registry.iter().nth(1).unwrap();
    assert_eq!(server.package, PackageOptions::Disabled);
  }

  #[test]
  #[serial]
  fn env_overrides_project_build_dir() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("stagecraft.json");
    std::fs::write(&path, PROJECT).unwrap();

    let project = temp_env::with_var(BUILD_DIR_ENV, Some("/tmp/out"), || load_project(&path)).unwrap();

    assert_eq!(project.settings.build_dir, PathBuf::from("/tmp/out"));
  }

  #[test]
  fn missing_file_is_read_error() {
    let temp = TempDir::new().unwrap();
    let result = load_project(&temp.path().join("absent.json"));
    assert!(matches!(result, Err(ConfigError::Read { .. })));
  }

  #[test]
  fn malformed_file_is_parse_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("stagecraft.json");
    std::fs::write(&path, r#"{"configs": [{"name": "x"}]}"#).unwrap();

    let result = load_project(&path);
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
  }

  #[test]
  fn minimal_file_uses_defaults() {
    let file = ProjectFile::parse(Path::new("p.json"), r#"{"configs": []}"#).unwrap();
    let settings = file.settings(Path::new("p.json"));
    assert_eq!(settings.build_dir, PathBuf::from("build"));
    assert_eq!(settings.compiler, PathBuf::from("node_modules/.bin/tsc"));
    assert_eq!(settings.definitions.sources, vec![PathBuf::from("p.json")]);
  }
}
