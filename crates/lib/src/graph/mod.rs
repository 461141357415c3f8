//! Task graph of build rules.
//!
//! Stages declare rules keyed by target path. A prerequisite that names no
//! rule is a source leaf and must exist when the graph runs. Execution order
//! is computed as waves: every rule in a wave depends only on earlier waves.

pub mod types;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{debug, trace};

pub use types::{Action, GraphError, Rule, RuleKind};

/// The set of declared rules, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct BuildGraph {
  rules: Vec<Rule>,
  index: HashMap<PathBuf, usize>,
}

impl BuildGraph {
  pub fn new() -> Self {
    Self::default()
  }

  /// Declare a rule.
  ///
  /// Returns `Ok(true)` when the rule is new and `Ok(false)` when an identical
  /// rule was already declared. A different rule for the same target is an error.
  pub fn declare(&mut self, rule: Rule) -> Result<bool, GraphError> {
    if let Some(&idx) = self.index.get(&rule.target) {
      if self.rules[idx] == rule {
        trace!(rule = %rule.target.display(), "rule already declared");
        return Ok(false);
      }
      return Err(GraphError::ConflictingRule { target: rule.target });
    }

    debug!(
      rule = %rule.target.display(),
      prerequisites = rule.prerequisites.len(),
      "declaring rule"
    );
    self.index.insert(rule.target.clone(), self.rules.len());
    self.rules.push(rule);
    Ok(true)
  }

  /// Declare an idempotent directory-creation rule.
  pub fn declare_directory(&mut self, dir: &Path) -> Result<bool, GraphError> {
    self.declare(Rule {
      target: dir.to_path_buf(),
      prerequisites: Vec::new(),
      kind: RuleKind::Directory,
    })
  }

  /// Declare a rule producing `target` from `prerequisites` by running `actions`.
  pub fn declare_file(
    &mut self,
    target: &Path,
    prerequisites: Vec<PathBuf>,
    actions: Vec<Action>,
  ) -> Result<bool, GraphError> {
    self.declare(Rule {
      target: target.to_path_buf(),
      prerequisites,
      kind: RuleKind::File { actions },
    })
  }

  /// Declare a phony rule grouping `prerequisites`.
  pub fn declare_aggregate(&mut self, name: &Path, prerequisites: Vec<PathBuf>) -> Result<bool, GraphError> {
    self.declare(Rule {
      target: name.to_path_buf(),
      prerequisites,
      kind: RuleKind::Aggregate,
    })
  }

  pub fn rule(&self, target: &Path) -> Option<&Rule> {
    self.index.get(target).map(|&idx| &self.rules[idx])
  }

  pub fn contains(&self, target: &Path) -> bool {
    self.index.contains_key(target)
  }

  /// Direct prerequisites of a rule, or an empty slice for a source leaf.
  pub fn prerequisites(&self, target: &Path) -> &[PathBuf] {
    self.rule(target).map(|r| r.prerequisites.as_slice()).unwrap_or(&[])
  }

  pub fn rules(&self) -> impl Iterator<Item = &Rule> {
    self.rules.iter()
  }

  pub fn len(&self) -> usize {
    self.rules.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rules.is_empty()
  }

  /// Rules reachable from `goal` (the goal included), in declaration order.
  pub fn closure(&self, goal: &Path) -> Result<Vec<&Rule>, GraphError> {
    let start = *self
      .index
      .get(goal)
      .ok_or_else(|| GraphError::UnknownTarget(goal.to_path_buf()))?;

    let mut seen: HashSet<usize> = HashSet::new();
    let mut stack = vec![start];
    while let Some(idx) = stack.pop() {
      if !seen.insert(idx) {
        continue;
      }
      for prereq in &self.rules[idx].prerequisites {
        if let Some(&dep) = self.index.get(prereq) {
          stack.push(dep);
        }
      }
    }

    let mut reachable: Vec<usize> = seen.into_iter().collect();
    reachable.sort_unstable();
    Ok(reachable.into_iter().map(|idx| &self.rules[idx]).collect())
  }

  /// Group the rules reachable from `goal` into execution waves.
  ///
  /// Rules within a wave are independent of one another and listed in
  /// declaration order.
  pub fn waves(&self, goal: &Path) -> Result<Vec<Vec<&Rule>>, GraphError> {
    let closure = self.closure(goal)?;

    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let mut nodes: HashMap<&Path, NodeIndex> = HashMap::new();
    for rule in &closure {
      let idx = graph.add_node(self.index[&rule.target]);
      nodes.insert(rule.target.as_path(), idx);
    }

    // Edge from dependency to dependent
    for rule in &closure {
      let dependent = nodes[rule.target.as_path()];
      for prereq in &rule.prerequisites {
        if let Some(&dep) = nodes.get(prereq.as_path()) {
          graph.update_edge(dep, dependent, ());
        }
      }
    }

    toposort(&graph, None).map_err(|_| GraphError::CycleDetected)?;

    // Kahn's algorithm, one level at a time
    let mut in_degree: HashMap<NodeIndex, usize> = graph
      .node_indices()
      .map(|idx| (idx, graph.neighbors_directed(idx, Direction::Incoming).count()))
      .collect();
    let mut remaining: HashSet<NodeIndex> = graph.node_indices().collect();
    let mut waves = Vec::new();

    while !remaining.is_empty() {
      let mut ready: Vec<NodeIndex> = remaining.iter().filter(|idx| in_degree[*idx] == 0).copied().collect();
      if ready.is_empty() {
        return Err(GraphError::CycleDetected);
      }
      ready.sort_by_key(|idx| graph[*idx]);

      for idx in &ready {
        remaining.remove(idx);
        for neighbor in graph.neighbors_directed(*idx, Direction::Outgoing) {
          if let Some(deg) = in_degree.get_mut(&neighbor) {
            *deg = deg.saturating_sub(1);
          }
        }
      }

      waves.push(ready.into_iter().map(|idx| &self.rules[graph[idx]]).collect());
    }

    Ok(waves)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn stamp(path: &str) -> Vec<Action> {
    vec![Action::AppendStamp {
      path: PathBuf::from(path),
      note: None,
    }]
  }

  fn targets(wave: &[&Rule]) -> Vec<PathBuf> {
    wave.iter().map(|r| r.target.clone()).collect()
  }

  #[test]
  fn identical_redeclaration_is_a_no_op() {
    let mut graph = BuildGraph::new();
    assert!(graph.declare_file(Path::new("out.js"), vec![PathBuf::from("a.ts")], stamp("out.js")).unwrap());
    assert!(!graph.declare_file(Path::new("out.js"), vec![PathBuf::from("a.ts")], stamp("out.js")).unwrap());
    assert_eq!(graph.len(), 1);
  }

  #[test]
  fn different_rule_for_same_target_conflicts() {
    let mut graph = BuildGraph::new();
    graph
      .declare_file(Path::new("out.js"), vec![PathBuf::from("a.ts")], stamp("out.js"))
      .unwrap();
    let err = graph
      .declare_file(Path::new("out.js"), vec![PathBuf::from("b.ts")], stamp("out.js"))
      .unwrap_err();
    assert_eq!(
      err,
      GraphError::ConflictingRule {
        target: PathBuf::from("out.js")
      }
    );
  }

  #[test]
  fn directory_redeclaration_is_idempotent() {
    let mut graph = BuildGraph::new();
    graph.declare_directory(Path::new("build/debug/x")).unwrap();
    graph.declare_directory(Path::new("build/debug/x")).unwrap();
    assert_eq!(graph.len(), 1);
    assert!(graph.rule(Path::new("build/debug/x")).unwrap().is_directory());
  }

  #[test]
  fn prerequisites_of_leaf_are_empty() {
    let graph = BuildGraph::new();
    assert!(graph.prerequisites(Path::new("a.ts")).is_empty());
  }

  #[test]
  fn closure_excludes_unreachable_rules() {
    let mut graph = BuildGraph::new();
    graph.declare_directory(Path::new("out")).unwrap();
    graph
      .declare_file(
        Path::new("out/a.js"),
        vec![PathBuf::from("out"), PathBuf::from("a.ts")],
        stamp("out/a.js"),
      )
      .unwrap();
    graph
      .declare_file(Path::new("out/b.js"), vec![PathBuf::from("b.ts")], stamp("out/b.js"))
      .unwrap();
    graph
      .declare_aggregate(Path::new("run"), vec![PathBuf::from("out/a.js")])
      .unwrap();

    let closure: Vec<_> = graph
      .closure(Path::new("run"))
      .unwrap()
      .into_iter()
      .map(|r| r.target.clone())
      .collect();
    assert_eq!(
      closure,
      vec![PathBuf::from("out"), PathBuf::from("out/a.js"), PathBuf::from("run")]
    );
  }

  #[test]
  fn waves_follow_dependencies() {
    let mut graph = BuildGraph::new();
    graph.declare_directory(Path::new("debug")).unwrap();
    graph
      .declare_file(
        Path::new("debug/out.js"),
        vec![PathBuf::from("debug"), PathBuf::from("a.ts")],
        stamp("debug/out.js"),
      )
      .unwrap();
    graph.declare_directory(Path::new("release")).unwrap();
    graph
      .declare_file(
        Path::new("release/out.min.js"),
        vec![PathBuf::from("release"), PathBuf::from("debug/out.js")],
        stamp("release/out.min.js"),
      )
      .unwrap();
    graph
      .declare_aggregate(Path::new("run"), vec![PathBuf::from("release/out.min.js")])
      .unwrap();

    let waves = graph.waves(Path::new("run")).unwrap();
    assert_eq!(waves.len(), 4);
    assert_eq!(targets(&waves[0]), vec![PathBuf::from("debug"), PathBuf::from("release")]);
    assert_eq!(targets(&waves[1]), vec![PathBuf::from("debug/out.js")]);
    assert_eq!(targets(&waves[2]), vec![PathBuf::from("release/out.min.js")]);
    assert_eq!(targets(&waves[3]), vec![PathBuf::from("run")]);
  }

  #[test]
  fn waves_detect_cycles() {
    let mut graph = BuildGraph::new();
    graph
      .declare_file(Path::new("a"), vec![PathBuf::from("b")], stamp("a"))
      .unwrap();
    graph
      .declare_file(Path::new("b"), vec![PathBuf::from("a")], stamp("b"))
      .unwrap();

    assert_eq!(graph.waves(Path::new("a")).unwrap_err(), GraphError::CycleDetected);
  }

  #[test]
  fn unknown_goal_is_an_error() {
    let graph = BuildGraph::new();
    assert_eq!(
      graph.waves(Path::new("run")).unwrap_err(),
      GraphError::UnknownTarget(PathBuf::from("run"))
    );
  }
}
