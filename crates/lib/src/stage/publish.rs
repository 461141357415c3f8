//! Publish stage.
//!
//! Reserved hook for a publish pipeline: declares nothing and produces no
//! artifact. The orchestrator drops the empty path from its aggregate.

use std::path::PathBuf;

use tracing::debug;

use crate::config::BuildConfig;
use crate::graph::{BuildGraph, GraphError};

use super::StageContext;

pub fn publish(_graph: &mut BuildGraph, _ctx: &StageContext<'_>, config: &BuildConfig) -> Result<PathBuf, GraphError> {
  debug!(config = %config.name, "publish is a no-op");
  Ok(PathBuf::new())
}
