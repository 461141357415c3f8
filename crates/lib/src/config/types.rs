//! Types describing a single buildable unit and its option overrides.

use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating build configurations.
///
/// All of these are reported before any external process is spawned.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// The project file could not be read.
  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The project file is not valid JSON for a project.
  #[error("failed to parse {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  /// A configuration has an empty name.
  #[error("configuration #{index} has an empty name")]
  EmptyName { index: usize },

  /// A configuration names no source files.
  #[error("configuration '{name}' has no source files")]
  EmptyFiles { name: String },

  /// A configuration name cannot be used as a single path segment.
  #[error("configuration name '{name}' must be a single path segment")]
  InvalidName { name: String },

  /// Packaging would write the minified file over the compiled one.
  #[error(
    "configuration '{name}': minified output {path} would overwrite the compiled output; set package.outDir or package.outFile"
  )]
  PackageOverwritesCompiled { name: String, path: PathBuf },
}

/// Output location overrides shared by the compile and package stages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OutputOptions {
  pub out_dir: Option<PathBuf>,
  pub out_file: Option<PathBuf>,
}

/// Compiler option overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompileOptions {
  /// Language level passed as `--target` (e.g. `ES5`).
  pub target: Option<String>,
  /// Module format; `commonjs` switches the compiler to per-module output.
  pub module: Option<String>,
  pub source_map: Option<bool>,
  pub out_dir: Option<PathBuf>,
  pub out_file: Option<PathBuf>,
}

impl CompileOptions {
  /// Options every compile starts from when nothing else is configured.
  pub fn builtin() -> Self {
    Self {
      target: Some("ES5".to_string()),
      ..Self::default()
    }
  }

  pub fn is_commonjs(&self) -> bool {
    self.module.as_deref().is_some_and(|m| m.eq_ignore_ascii_case("commonjs"))
  }

  pub fn wants_source_map(&self) -> bool {
    self.source_map.unwrap_or(false)
  }
}

/// Packaging (minify) behaviour of a configuration.
///
/// In the project file, an absent `package` key inherits the project default,
/// an object overrides it, and an explicit `null` disables minification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PackageOptions {
  #[default]
  Inherit,
  Disabled,
  Custom(OutputOptions),
}

impl PackageOptions {
  pub fn is_disabled(&self) -> bool {
    matches!(self, PackageOptions::Disabled)
  }

  pub fn custom(&self) -> Option<&OutputOptions> {
    match self {
      PackageOptions::Custom(options) => Some(options),
      _ => None,
    }
  }
}

// `#[serde(default)]` covers the absent key; a present key is either null or an object.
fn deserialize_package<'de, D>(deserializer: D) -> Result<PackageOptions, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(match Option::<OutputOptions>::deserialize(deserializer)? {
    Some(options) => PackageOptions::Custom(options),
    None => PackageOptions::Disabled,
  })
}

/// A named description of one buildable unit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BuildConfig {
  /// Used as the path segment that namespaces this unit's outputs.
  pub name: String,
  /// Source files, in the order handed to the compiler.
  pub files: Vec<PathBuf>,
  #[serde(default)]
  pub out_dir: Option<PathBuf>,
  #[serde(default)]
  pub out_file: Option<PathBuf>,
  #[serde(default)]
  pub compile: Option<CompileOptions>,
  #[serde(default, deserialize_with = "deserialize_package")]
  pub package: PackageOptions,
}

impl BuildConfig {
  pub fn new(name: impl Into<String>, files: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
    Self {
      name: name.into(),
      files: files.into_iter().map(Into::into).collect(),
      out_dir: None,
      out_file: None,
      compile: None,
      package: PackageOptions::Inherit,
    }
  }

  pub fn with_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
    self.out_dir = Some(out_dir.into());
    self
  }

  pub fn with_out_file(mut self, out_file: impl Into<PathBuf>) -> Self {
    self.out_file = Some(out_file.into());
    self
  }

  pub fn with_compile(mut self, options: CompileOptions) -> Self {
    self.compile = Some(options);
    self
  }

  pub fn with_package(mut self, package: PackageOptions) -> Self {
    self.package = package;
    self
  }

  /// Check the fields a stage relies on.
  pub fn validate(&self, index: usize) -> Result<(), ConfigError> {
    if self.name.trim().is_empty() {
      return Err(ConfigError::EmptyName { index });
    }
    if self.name == "." || self.name == ".." || self.name.contains(['/', '\\']) {
      return Err(ConfigError::InvalidName {
        name: self.name.clone(),
      });
    }
    if self.files.is_empty() {
      return Err(ConfigError::EmptyFiles {
        name: self.name.clone(),
      });
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn package_absent_inherits() {
    let config: BuildConfig = serde_json::from_str(r#"{"name": "client", "files": ["a.ts"]}"#).unwrap();
    assert_eq!(config.package, PackageOptions::Inherit);
  }

  #[test]
  fn package_null_disables() {
    let config: BuildConfig = serde_json::from_str(r#"{"name": "client", "files": ["a.ts"], "package": null}"#).unwrap();
    assert!(config.package.is_disabled());
  }

  #[test]
  fn package_object_overrides() {
    let config: BuildConfig =
      serde_json::from_str(r#"{"name": "client", "files": ["a.ts"], "package": {"outFile": "app.js"}}"#).unwrap();
    assert_eq!(
      config.package,
      PackageOptions::Custom(OutputOptions {
        out_dir: None,
        out_file: Some(PathBuf::from("app.js")),
      })
    );
  }

  #[test]
  fn compile_options_parse_camel_case() {
    let config: BuildConfig = serde_json::from_str(
      r#"{"name": "server", "files": ["s.ts"], "compile": {"module": "commonjs", "sourceMap": true}}"#,
    )
    .unwrap();
    let compile = config.compile.unwrap();
    assert!(compile.is_commonjs());
    assert!(compile.wants_source_map());
    assert_eq!(compile.target, None);
  }

  #[test]
  fn unknown_fields_are_rejected() {
    let result = serde_json::from_str::<BuildConfig>(r#"{"name": "x", "files": ["a.ts"], "outfile": "y"}"#);
    assert!(result.is_err());
  }

  #[test]
  fn validate_rejects_empty_files() {
    let config = BuildConfig::new("client", Vec::<PathBuf>::new());
    assert!(matches!(config.validate(0), Err(ConfigError::EmptyFiles { name }) if name == "client"));
  }

  #[test]
  fn validate_rejects_empty_name() {
    let config = BuildConfig::new("  ", ["a.ts"]);
    assert!(matches!(config.validate(3), Err(ConfigError::EmptyName { index: 3 })));
  }

  #[test]
  fn validate_rejects_path_like_names() {
    for name in ["a/b", "..", "a\\b"] {
      let config = BuildConfig::new(name, ["a.ts"]);
      assert!(matches!(config.validate(0), Err(ConfigError::InvalidName { .. })), "{name}");
    }
  }

  #[test]
  fn validate_accepts_plain_config() {
    assert!(BuildConfig::new("client", ["a.ts", "b.ts"]).validate(0).is_ok());
  }
}
