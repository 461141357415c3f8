//! Type-declaration installation from a package manifest.

use std::path::Path;

use serde::Deserialize;
use serde_json::Map;
use tracing::info;

use super::cmd::execute_program;
use crate::execute::types::ExecuteError;

#[derive(Debug, Deserialize)]
struct Manifest {
  // `null` counts as no dependencies
  #[serde(default)]
  dependencies: Option<Map<String, serde_json::Value>>,
}

/// Names of the manifest's `dependencies`, in file order.
pub fn dependency_names(content: &str) -> Result<Vec<String>, serde_json::Error> {
  let manifest: Manifest = serde_json::from_str(content)?;
  Ok(manifest.dependencies.unwrap_or_default().into_iter().map(|(name, _)| name).collect())
}

/// Arguments for the install step: `install <names...> --save --overwrite`.
pub fn install_args(names: &[String]) -> Vec<String> {
  let mut args = vec!["install".to_string()];
  args.extend(names.iter().cloned());
  args.push("--save".to_string());
  args.push("--overwrite".to_string());
  args
}

/// Reinitialize the typings file, then install typings for every dependency
/// listed in `manifest`.
pub async fn install_typings(manifest: &Path, tool: &Path, cwd: &Path) -> Result<(), ExecuteError> {
  let path = cwd.join(manifest);
  let content = tokio::fs::read_to_string(&path).await?;
  let names = dependency_names(&content).map_err(|e| ExecuteError::InvalidManifest {
    path: manifest.to_path_buf(),
    message: e.to_string(),
  })?;

  info!(manifest = %manifest.display(), count = names.len(), "installing typings");

  execute_program(tool, &["init".to_string(), "--overwrite".to_string()], cwd).await?;
  execute_program(tool, &install_args(&names), cwd).await?;
  Ok(())
}
