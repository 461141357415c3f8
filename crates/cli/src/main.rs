mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use stagecraft_lib::consts::PROJECT_FILE;
use tracing_subscriber::EnvFilter;

use cmd::{GlobalOpts, Task};
use output::OutputFormat;

/// stage - compile, minify and publish build pipelines
#[derive(Parser)]
#[command(name = "stage")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Path to the project file
  #[arg(short, long, global = true, default_value = PROJECT_FILE)]
  project: PathBuf,

  /// Build output root, relative to the project directory (overrides BUILD__DIR)
  #[arg(long, global = true)]
  build_dir: Option<PathBuf>,

  /// Maximum number of rules to run at once (default: one per output)
  #[arg(short, long, global = true)]
  jobs: Option<usize>,

  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Compile every configuration into <build>/debug/<name>
  Compile,

  /// Compile, minify and gzip every configuration into <build>/release/<name>
  Minify,

  /// Publish every configuration
  Publish,

  /// Generate the marker makefile and install typings
  CreateDependencies,

  /// Show the rules a task would run, without running them
  Plan {
    /// Task to plan
    #[arg(value_enum)]
    task: Task,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let opts = GlobalOpts {
    project: cli.project,
    build_dir: cli.build_dir,
    jobs: cli.jobs,
  };

  match cli.command {
    Commands::Compile => cmd::cmd_run(Task::Compile, &opts),
    Commands::Minify => cmd::cmd_run(Task::Minify, &opts),
    Commands::Publish => cmd::cmd_run(Task::Publish, &opts),
    Commands::CreateDependencies => cmd::cmd_run(Task::CreateDependencies, &opts),
    Commands::Plan { task, output } => cmd::cmd_plan(task, &opts, output),
  }
}
