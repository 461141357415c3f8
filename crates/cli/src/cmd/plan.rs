//! Implementation of the `stage plan` command.
//!
//! Declares the rules for a task and prints them without running anything.

use anyhow::Result;
use serde::Serialize;

use stagecraft_lib::graph::Rule;

use super::{GlobalOpts, Task, load, plan_task};
use crate::output::{OutputFormat, print_info, print_json, print_rule, print_stat};

#[derive(Serialize)]
struct PlanOutput<'a> {
  task: &'static str,
  goal: &'a std::path::Path,
  outputs: &'a [std::path::PathBuf],
  rules: Vec<&'a Rule>,
}

pub fn cmd_plan(task: Task, opts: &GlobalOpts, format: OutputFormat) -> Result<()> {
  let project = load(opts)?;
  let plan = plan_task(task, &project)?;
  let rules = plan.graph.closure(&plan.goal)?;

  if format.is_json() {
    return print_json(&PlanOutput {
      task: task.name(),
      goal: &plan.goal,
      outputs: &plan.outputs,
      rules,
    });
  }

  print_info(&format!("Plan for {}", task.name()));
  print_stat("Rules", &rules.len().to_string());
  print_stat("Parallelism", &plan.parallelism().to_string());
  println!();

  for rule in rules {
    print_rule(rule);
  }

  Ok(())
}
