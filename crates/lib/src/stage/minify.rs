//! Minify stage: compiled artifact -> minified file -> gzip file under `<build>/release/<name>`.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::{BuildConfig, ConfigError, OutputOptions, resolve};
use crate::consts::{GZIP_SUFFIX, MINIFIED_SUFFIX};
use crate::graph::{Action, BuildGraph};
use crate::util::shell::quote_path;

use super::{StageContext, StageError};
use super::compile::compile;

/// Where a configuration's release artifacts go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageOutputs {
  pub dir: PathBuf,
  pub minified: PathBuf,
  pub gzipped: PathBuf,
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
  let mut name = path.as_os_str().to_os_string();
  name.push(suffix);
  PathBuf::from(name)
}

pub fn package_outputs(ctx: &StageContext<'_>, config: &BuildConfig, compiled: &Path) -> PackageOutputs {
  let options = resolve(
    config.package.custom(),
    Some(&ctx.settings.defaults.package),
    &OutputOptions::default(),
  );

  let root = options
    .out_dir
    .or_else(|| config.out_dir.clone())
    .unwrap_or_else(|| ctx.settings.release_dir());
  let dir = ctx.relative(&root.join(&config.name));

  let minified = match options.out_file.or_else(|| config.out_file.clone()) {
    Some(name) => dir.join(name),
    None => {
      let compiled_name = compiled.file_name().map(PathBuf::from).unwrap_or_default();
      dir.join(with_suffix(&compiled_name, MINIFIED_SUFFIX))
    }
  };
  let gzipped = with_suffix(&minified, GZIP_SUFFIX);

  PackageOutputs { dir, minified, gzipped }
}

/// `gzip --best < minified > gzipped`
pub fn gzip_command(minified: &Path, gzipped: &Path) -> String {
  format!("gzip --best < {} > {}", quote_path(minified), quote_path(gzipped))
}

/// Declare the minify and gzip rules for `config`.
///
/// Returns the gzip path, or the compiled artifact path when packaging is
/// disabled for the configuration or the minifier yields no commands.
pub fn minify(graph: &mut BuildGraph, ctx: &StageContext<'_>, config: &BuildConfig) -> Result<PathBuf, StageError> {
  let compiled = compile(graph, ctx, config)?;

  if config.package.is_disabled() {
    info!(config = %config.name, "packaging disabled, using compiled output");
    return Ok(compiled);
  }

  let outputs = package_outputs(ctx, config, &compiled);
  if outputs.minified == compiled {
    return Err(
      ConfigError::PackageOverwritesCompiled {
        name: config.name.clone(),
        path: compiled,
      }
      .into(),
    );
  }

  let commands = ctx
    .settings
    .minifier
    .commands(&outputs.minified, &outputs.dir, std::slice::from_ref(&compiled));
  if commands.is_empty() {
    info!(config = %config.name, "no minify commands, using compiled output");
    return Ok(compiled);
  }

  graph.declare_directory(&outputs.dir)?;
  graph.declare_file(&outputs.minified, vec![outputs.dir.clone(), compiled], commands)?;
  let declared = graph.declare_file(
    &outputs.gzipped,
    vec![outputs.minified.clone()],
    vec![Action::Shell {
      command: gzip_command(&outputs.minified, &outputs.gzipped),
    }],
  )?;

  if declared {
    info!(config = %config.name, output = %outputs.gzipped.display(), "declared minify");
  }

  Ok(outputs.gzipped)
}
