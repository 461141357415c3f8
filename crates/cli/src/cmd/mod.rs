mod plan;
mod run;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ValueEnum;
use tracing::debug;

use stagecraft_lib::config::{Project, load_project};
use stagecraft_lib::orchestrate::{self, Plan, Stage};

pub use plan::cmd_plan;
pub use run::cmd_run;

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalOpts {
  pub project: PathBuf,
  pub build_dir: Option<PathBuf>,
  pub jobs: Option<usize>,
}

/// A task the CLI can plan or run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Task {
  Compile,
  Minify,
  Publish,
  CreateDependencies,
}

impl Task {
  pub fn name(self) -> &'static str {
    match self {
      Task::Compile => "compile",
      Task::Minify => "minify",
      Task::Publish => "publish",
      Task::CreateDependencies => "create-dependencies",
    }
  }
}

/// Load the project file, applying the `--build-dir` override last.
fn load(opts: &GlobalOpts) -> Result<Project> {
  let mut project = load_project(&opts.project)
    .with_context(|| format!("Failed to load project: {}", opts.project.display()))?;

  if let Some(dir) = &opts.build_dir {
    debug!(build_dir = %dir.display(), "build directory overridden on the command line");
    project.settings.build_dir = dir.clone();
  }

  Ok(project)
}

fn plan_task(task: Task, project: &Project) -> Result<Plan> {
  let plan = match task {
    Task::CreateDependencies => orchestrate::plan_dependencies(&project.settings, &project.root),
    _ => task
      .name()
      .parse::<Stage>()
      .and_then(|stage| orchestrate::plan(stage, &project.registry, &project.settings, &project.root)),
  };
  plan.with_context(|| format!("Failed to plan {}", task.name()))
}
