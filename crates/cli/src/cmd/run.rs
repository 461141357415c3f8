//! Implementation of the task commands (`compile`, `minify`, `publish`,
//! `create-dependencies`).

use std::time::Instant;

use anyhow::{Context, Result, bail};

use stagecraft_lib::orchestrate;

use super::{GlobalOpts, Task, load, plan_task};
use crate::output::{format_duration, print_failures, print_info, print_success, print_summary};

pub fn cmd_run(task: Task, opts: &GlobalOpts) -> Result<()> {
  let project = load(opts)?;
  let plan = plan_task(task, &project)?;

  let mut config = plan.execute_config(&project.root);
  if let Some(jobs) = opts.jobs {
    config = config.with_parallelism(jobs);
  }

  let started = Instant::now();
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let report = rt
    .block_on(orchestrate::run(&plan, &config))
    .with_context(|| format!("Failed to run {}", task.name()))?;
  let elapsed = format_duration(started.elapsed());

  if !report.is_success() {
    print_failures(&report);
    bail!("{} failed after {}", task.name(), elapsed);
  }

  if plan.outputs.is_empty() {
    print_info(&format!("{} produced no outputs", task.name()));
    return Ok(());
  }

  print_success(&format!("{} finished in {}", task.name(), elapsed));
  print_summary(&report, &plan.outputs);

  Ok(())
}
