//! Top-level entry points: plan a stage over every configuration, then run it.
//!
//! Planning is synchronous and touches the filesystem only to check whether
//! optional inputs (`package.json`, `Makefile`) exist. Running hands the
//! planned graph to the executor.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::{BuildConfig, ConfigError, ConfigRegistry};
use crate::consts::AGGREGATE_TARGET;
use crate::execute::{self, ExecuteConfig, ExecuteError, RunReport};
use crate::graph::{BuildGraph, GraphError};
use crate::settings::BuildSettings;
use crate::stage::{self, StageContext, StageError};

/// Errors that can occur while planning or running a stage.
#[derive(Debug, Error)]
pub enum OrchestrateError {
  #[error("invalid configuration: {0}")]
  Config(#[from] ConfigError),

  #[error("invalid task graph: {0}")]
  Graph(#[from] GraphError),

  #[error("execution failed: {0}")]
  Execute(#[from] ExecuteError),

  #[error("unknown stage '{0}' (expected compile, minify or publish)")]
  UnknownStage(String),
}

impl From<StageError> for OrchestrateError {
  fn from(err: StageError) -> Self {
    match err {
      StageError::Graph(err) => OrchestrateError::Graph(err),
      StageError::Config(err) => OrchestrateError::Config(err),
    }
  }
}

/// A pipeline stage applied to every configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
  Compile,
  Minify,
  Publish,
}

impl Stage {
  pub fn name(self) -> &'static str {
    match self {
      Stage::Compile => "compile",
      Stage::Minify => "minify",
      Stage::Publish => "publish",
    }
  }

  fn declare(self, graph: &mut BuildGraph, ctx: &StageContext<'_>, config: &BuildConfig) -> Result<PathBuf, StageError> {
    match self {
      Stage::Compile => Ok(stage::compile(graph, ctx, config)?),
      Stage::Minify => stage::minify(graph, ctx, config),
      Stage::Publish => Ok(stage::publish(graph, ctx, config)?),
    }
  }
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for Stage {
  type Err = OrchestrateError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "compile" => Ok(Stage::Compile),
      "minify" => Ok(Stage::Minify),
      "publish" => Ok(Stage::Publish),
      other => Err(OrchestrateError::UnknownStage(other.to_string())),
    }
  }
}

/// A fully declared graph and the aggregate goal to build.
#[derive(Debug, Clone)]
pub struct Plan {
  pub graph: BuildGraph,
  /// Non-empty stage outputs, one per distinct configuration output.
  pub outputs: Vec<PathBuf>,
  pub goal: PathBuf,
}

impl Plan {
  /// One worker per output, never fewer than one.
  pub fn parallelism(&self) -> usize {
    self.outputs.len().max(1)
  }

  /// Executor settings for running this plan from `root`.
  pub fn execute_config(&self, root: &Path) -> ExecuteConfig {
    ExecuteConfig::default()
      .with_root(root)
      .with_parallelism(self.parallelism())
  }
}

fn aggregate(mut graph: BuildGraph, outputs: Vec<PathBuf>) -> Result<Plan, OrchestrateError> {
  let goal = PathBuf::from(AGGREGATE_TARGET);
  graph.declare_aggregate(&goal, outputs.clone())?;
  Ok(Plan { graph, outputs, goal })
}

/// Apply `stage` to every configuration in `registry` and aggregate the outputs.
///
/// Configuration errors surface here, before any process is spawned. Empty
/// outputs (the publish stub) are left out of the aggregate.
pub fn plan(
  stage: Stage,
  registry: &ConfigRegistry,
  settings: &BuildSettings,
  cwd: &Path,
) -> Result<Plan, OrchestrateError> {
  registry.validate()?;

  let mut graph = BuildGraph::new();
  let ctx = StageContext::new(&mut graph, settings, cwd)?;

  let mut outputs: Vec<PathBuf> = Vec::new();
  for config in registry.iter() {
    let output = stage.declare(&mut graph, &ctx, config)?;
    if output.as_os_str().is_empty() {
      debug!(stage = %stage, config = %config.name, "stage produced no output");
      continue;
    }
    if !outputs.contains(&output) {
      outputs.push(output);
    }
  }

  info!(
    stage = %stage,
    configs = registry.len(),
    outputs = outputs.len(),
    rules = graph.len(),
    "planned stage"
  );

  aggregate(graph, outputs)
}

/// Plan only the shared auxiliary dependencies (typings and marker file).
pub fn plan_dependencies(settings: &BuildSettings, cwd: &Path) -> Result<Plan, OrchestrateError> {
  let mut graph = BuildGraph::new();
  let ctx = StageContext::new(&mut graph, settings, cwd)?;
  let outputs = ctx.shared_dependencies().to_vec();

  info!(outputs = outputs.len(), "planned dependencies");
  aggregate(graph, outputs)
}

/// Execute a plan.
pub async fn run(plan: &Plan, config: &ExecuteConfig) -> Result<RunReport, OrchestrateError> {
  let report = execute::execute(&plan.graph, &plan.goal, config).await?;
  Ok(report)
}
