//! Graph execution module.
//!
//! This module runs the rules reachable from a goal. It handles:
//! - wave-based dependency ordering
//! - parallel execution of independent rules
//! - make-style staleness checks against file modification times
//! - failure propagation and skip tracking

pub mod actions;
pub mod types;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::graph::{BuildGraph, Rule, RuleKind};

pub use actions::execute_action;
pub use types::{ExecuteConfig, ExecuteError, RuleOutcome, RunReport};

/// How a prerequisite takes part in the staleness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prerequisite {
  /// No rule produces it; it must already exist.
  Source,
  /// Produced by a file rule.
  Generated,
  /// Produced by a directory rule; only its existence matters.
  OrderOnly,
}

/// A rule together with the classification of its prerequisites.
#[derive(Debug, Clone)]
struct Job {
  rule: Rule,
  prerequisites: Vec<(PathBuf, Prerequisite)>,
}

impl Job {
  fn new(graph: &BuildGraph, rule: &Rule) -> Self {
    let prerequisites = rule
      .prerequisites
      .iter()
      .map(|path| {
        let kind = match graph.rule(path) {
          None => Prerequisite::Source,
          Some(r) if r.is_directory() => Prerequisite::OrderOnly,
          Some(_) => Prerequisite::Generated,
        };
        (path.clone(), kind)
      })
      .collect();

    Self {
      rule: rule.clone(),
      prerequisites,
    }
  }
}

/// Execute every rule needed to bring `goal` up to date.
///
/// Rules run wave by wave. Within a wave, rules run concurrently with at
/// most `config.parallelism` in flight. A failed rule does not stop the run:
/// rules depending on it (directly or through a skipped rule) are skipped,
/// and independent rules still run.
///
/// Returns `Err` only when the graph itself cannot be ordered; rule failures
/// are recorded in the [`RunReport`].
pub async fn execute(graph: &BuildGraph, goal: &Path, config: &ExecuteConfig) -> Result<RunReport, ExecuteError> {
  let waves = graph.waves(goal)?;
  info!(
    goal = %goal.display(),
    wave_count = waves.len(),
    parallelism = config.parallelism,
    "starting execution"
  );

  let mut report = RunReport::default();
  let mut failed: HashSet<PathBuf> = HashSet::new();
  let semaphore = Arc::new(Semaphore::new(config.parallelism.max(1)));

  for (wave_idx, wave) in waves.iter().enumerate() {
    debug!(wave = wave_idx, rules = wave.len(), "executing wave");

    let mut ready = Vec::new();
    for rule in wave {
      match rule.prerequisites.iter().find(|p| failed.contains(*p)) {
        Some(failed_dep) => {
          warn!(
            rule = %rule.target.display(),
            failed_dep = %failed_dep.display(),
            "skipping rule due to failed dependency"
          );
          report.skipped.insert(rule.target.clone(), failed_dep.clone());
          failed.insert(rule.target.clone());
        }
        None => ready.push(Job::new(graph, rule)),
      }
    }

    if ready.is_empty() {
      continue;
    }

    for (target, result) in execute_wave(ready, config, semaphore.clone()).await {
      match result {
        Ok(RuleOutcome::Built) => {
          info!(rule = %target.display(), "built");
          report.built.push(target);
        }
        Ok(RuleOutcome::UpToDate) => {
          debug!(rule = %target.display(), "up to date");
          report.up_to_date.push(target);
        }
        Ok(RuleOutcome::Grouped) => {}
        Err(e) => {
          error!(rule = %target.display(), error = %e, "rule failed");
          failed.insert(target.clone());
          report.failed.push((target, e));
        }
      }
    }
  }

  info!(
    built = report.built.len(),
    up_to_date = report.up_to_date.len(),
    failed = report.failed.len(),
    skipped = report.skipped.len(),
    "execution complete"
  );

  Ok(report)
}

/// Run one wave of independent rules in parallel.
async fn execute_wave(
  jobs: Vec<Job>,
  config: &ExecuteConfig,
  semaphore: Arc<Semaphore>,
) -> Vec<(PathBuf, Result<RuleOutcome, ExecuteError>)> {
  let mut join_set = JoinSet::new();
  let mut targets = HashMap::new();

  for job in jobs {
    let config = config.clone();
    let semaphore = semaphore.clone();
    let target = job.rule.target.clone();

    let handle = join_set.spawn(async move {
      let Ok(_permit) = semaphore.acquire().await else {
        return Err(ExecuteError::Cancelled);
      };
      run_rule(&job, &config).await
    });
    targets.insert(handle.id(), target);
  }

  let mut results = Vec::new();
  while let Some(joined) = join_set.join_next_with_id().await {
    match joined {
      Ok((id, result)) => {
        if let Some(target) = targets.remove(&id) {
          results.push((target, result));
        }
      }
      Err(e) => {
        error!(error = %e, "rule task panicked");
        if let Some(target) = targets.remove(&e.id()) {
          results.push((target, Err(ExecuteError::Cancelled)));
        }
      }
    }
  }

  results
}

async fn run_rule(job: &Job, config: &ExecuteConfig) -> Result<RuleOutcome, ExecuteError> {
  let target = config.root.join(&job.rule.target);

  match &job.rule.kind {
    RuleKind::Aggregate => Ok(RuleOutcome::Grouped),
    RuleKind::Directory => {
      if tokio::fs::metadata(&target).await.is_ok_and(|m| m.is_dir()) {
        return Ok(RuleOutcome::UpToDate);
      }
      tokio::fs::create_dir_all(&target).await?;
      Ok(RuleOutcome::Built)
    }
    RuleKind::File { actions } => {
      if !needs_rebuild(job, &config.root).await? {
        return Ok(RuleOutcome::UpToDate);
      }
      for action in actions {
        debug!(rule = %job.rule.target.display(), action = %action, "running action");
        execute_action(action, config).await?;
      }
      Ok(RuleOutcome::Built)
    }
  }
}

async fn modified(path: &Path) -> Option<SystemTime> {
  tokio::fs::metadata(path).await.ok().and_then(|m| m.modified().ok())
}

/// Whether a file rule must run: its target is missing, a file prerequisite
/// is newer, or a generated prerequisite is missing.
async fn needs_rebuild(job: &Job, root: &Path) -> Result<bool, ExecuteError> {
  let built_at = modified(&root.join(&job.rule.target)).await;
  let mut stale = built_at.is_none();

  for (path, kind) in &job.prerequisites {
    if *kind == Prerequisite::OrderOnly {
      continue;
    }
    match (modified(&root.join(path)).await, kind) {
      (Some(changed_at), _) => {
        if built_at.is_some_and(|built_at| changed_at > built_at) {
          debug!(rule = %job.rule.target.display(), prerequisite = %path.display(), "prerequisite is newer");
          stale = true;
        }
      }
      (None, Prerequisite::Source) => {
        return Err(ExecuteError::MissingPrerequisite {
          target: job.rule.target.clone(),
          prerequisite: path.clone(),
        });
      }
      (None, _) => stale = true,
    }
  }

  Ok(stale)
}
