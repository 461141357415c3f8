//! Compile stage: sources -> compiled artifact under `<build>/debug/<name>`.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::{BuildConfig, CompileOptions, resolve};
use crate::consts::COMPILED_PLACEHOLDER;
use crate::graph::{Action, BuildGraph, GraphError};

use super::StageContext;

/// Where a configuration's compiled output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutputs {
  pub dir: PathBuf,
  pub file: PathBuf,
  /// Whether an output file name was given explicitly.
  pub named: bool,
}

/// Effective compiler options for a configuration.
///
/// Configurations naming an output file start from the client (single-file)
/// defaults, the others from the server (module) defaults.
pub fn effective_options(ctx: &StageContext<'_>, config: &BuildConfig) -> CompileOptions {
  let defaults = &ctx.settings.defaults;
  let profile = if config.out_file.is_some() {
    &defaults.client
  } else {
    &defaults.server
  };
  resolve(config.compile.as_ref(), Some(profile), &CompileOptions::builtin())
}

pub fn compile_outputs(ctx: &StageContext<'_>, config: &BuildConfig, options: &CompileOptions) -> CompileOutputs {
  let root = options
    .out_dir
    .clone()
    .or_else(|| config.out_dir.clone())
    .unwrap_or_else(|| ctx.settings.debug_dir());
  let dir = ctx.relative(&root.join(&config.name));

  let name = options.out_file.as_ref().or(config.out_file.as_ref());
  let file = dir.join(name.map(PathBuf::as_path).unwrap_or(Path::new(COMPILED_PLACEHOLDER)));

  CompileOutputs {
    dir,
    file,
    named: name.is_some(),
  }
}

/// Compiler flags, excluding the source file list.
pub fn compile_flags(options: &CompileOptions, outputs: &CompileOutputs) -> Vec<String> {
  let mut flags = Vec::new();

  if let Some(target) = &options.target {
    flags.push("--target".to_string());
    flags.push(target.clone());
  }

  flags.push("--outDir".to_string());
  flags.push(outputs.dir.to_string_lossy().into_owned());

  // commonjs emits one file per module, so it cannot be combined with --outFile
  if options.is_commonjs() {
    flags.push("--module".to_string());
    flags.push("commonjs".to_string());
  } else if outputs.named {
    flags.push("--outFile".to_string());
    flags.push(outputs.file.to_string_lossy().into_owned());
  }

  if options.wants_source_map() {
    flags.push("--sourceMap".to_string());
  }

  flags
}

/// Declare the compile rules for `config` and return the compiled artifact path.
pub fn compile(graph: &mut BuildGraph, ctx: &StageContext<'_>, config: &BuildConfig) -> Result<PathBuf, GraphError> {
  let options = effective_options(ctx, config);
  let outputs = compile_outputs(ctx, config, &options);

  let mut prerequisites = vec![outputs.dir.clone()];
  prerequisites.extend(config.files.iter().map(|f| ctx.relative(f)));
  prerequisites.extend(ctx.shared_dependencies().iter().cloned());

  let mut args = compile_flags(&options, &outputs);
  args.extend(config.files.iter().map(|f| f.to_string_lossy().into_owned()));

  graph.declare_directory(&outputs.dir)?;
  let declared = graph.declare_file(
    &outputs.file,
    prerequisites,
    vec![
      Action::Exec {
        program: ctx.settings.compiler.clone(),
        args,
      },
      Action::AppendStamp {
        path: outputs.file.clone(),
        note: None,
      },
    ],
  )?;

  if declared {
    info!(config = %config.name, output = %outputs.file.display(), "declared compile");
  }

  Ok(outputs.file)
}
