//! Auxiliary dependencies shared by every compile rule.
//!
//! Two generated files sit in front of every compile:
//! - the type-declaration file, installed from `package.json` dependencies
//!   (only when `package.json` exists)
//! - the marker makefile, regenerated whenever a build-definition source or
//!   the project `Makefile` changes

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::graph::{Action, BuildGraph, GraphError};
use crate::paths::{self, relative_to};
use crate::settings::BuildSettings;

/// Declare the auxiliary dependency rules and return their targets.
///
/// Safe to call more than once per graph: identical redeclarations are no-ops.
pub fn collect(graph: &mut BuildGraph, settings: &BuildSettings, cwd: &Path) -> Result<Vec<PathBuf>, GraphError> {
  let mut dependencies = Vec::new();

  if let Some(typings) = declare_typings(graph, settings, cwd)? {
    dependencies.push(typings);
  }
  dependencies.push(declare_marker(graph, settings, cwd)?);

  debug!(count = dependencies.len(), "collected shared dependencies");
  Ok(dependencies)
}

/// `tsd.json <- package.json`, declared only when the manifest exists.
fn declare_typings(graph: &mut BuildGraph, settings: &BuildSettings, cwd: &Path) -> Result<Option<PathBuf>, GraphError> {
  let manifest = relative_to(&settings.package_manifest, cwd);
  if !cwd.join(&manifest).is_file() {
    debug!(manifest = %manifest.display(), "no package manifest, skipping typings");
    return Ok(None);
  }

  let typings = relative_to(&settings.typings_file, cwd);
  graph.declare_file(
    &typings,
    vec![manifest.clone()],
    vec![Action::InstallTypings {
      manifest,
      tool: settings.typings_tool.clone(),
    }],
  )?;
  Ok(Some(typings))
}

/// Marker makefile recording how to clean generated build-definition artifacts.
fn declare_marker(graph: &mut BuildGraph, settings: &BuildSettings, cwd: &Path) -> Result<PathBuf, GraphError> {
  let marker = relative_to(&settings.marker_file, cwd);

  let mut prerequisites: Vec<PathBuf> = settings
    .definitions
    .sources
    .iter()
    .map(|source| relative_to(source, cwd))
    .collect();
  let makefile = relative_to(&settings.makefile, cwd);
  if cwd.join(&makefile).is_file() {
    prerequisites.push(makefile);
  }

  let generated: Vec<PathBuf> = settings
    .definitions
    .generated
    .iter()
    .map(|g| relative_to(g, cwd))
    .collect();

  let contents = marker_contents(&marker, &generated, &prerequisites);
  graph.declare_file(
    &marker,
    prerequisites,
    vec![Action::WriteFile {
      path: marker.clone(),
      contents,
    }],
  )?;
  Ok(marker)
}

fn join_slashed(list: &[PathBuf]) -> String {
  list.iter().map(|p| paths::to_slash(p)).collect::<Vec<_>>().join(" ")
}

/// Render the marker makefile.
pub fn marker_contents(marker: &Path, generated: &[PathBuf], prerequisites: &[PathBuf]) -> String {
  let targets = if generated.is_empty() {
    paths::to_slash(marker)
  } else {
    join_slashed(generated)
  };

  let mut content = format!("{}: {}\n\nclean:\n", targets, join_slashed(prerequisites));
  if !generated.is_empty() {
    let maps: Vec<PathBuf> = generated
      .iter()
      .map(|g| {
        let mut map = g.clone().into_os_string();
        map.push(".map");
        PathBuf::from(map)
      })
      .collect();
    content.push_str(&format!("\trm -f {}\n", join_slashed(generated)));
    content.push_str(&format!("\trm -f {}\n", join_slashed(&maps)));
  }
  content
}
