//! Action execution module.
//!
//! This module provides the dispatch logic for running the actions of a
//! file rule. Relative paths in actions are resolved against the
//! configured root.

pub mod cmd;
pub mod file;
pub mod typings;

use crate::execute::types::{ExecuteConfig, ExecuteError};
use crate::graph::Action;

pub use cmd::{execute_cmd, execute_program};
pub use file::{append_stamp, write_file};
pub use typings::install_typings;

/// Execute a single action.
pub async fn execute_action(action: &Action, config: &ExecuteConfig) -> Result<(), ExecuteError> {
  let root = config.root.as_path();
  match action {
    Action::Exec { program, args } => {
      execute_program(program, args, root).await?;
    }
    Action::Shell { command } => {
      execute_cmd(command, root, config.shell.as_deref()).await?;
    }
    Action::AppendStamp { path, note } => {
      append_stamp(&root.join(path), note.as_deref()).await?;
    }
    Action::WriteFile { path, contents } => {
      write_file(&root.join(path), contents).await?;
    }
    Action::InstallTypings { manifest, tool } => {
      install_typings(manifest, tool, root).await?;
    }
  }
  Ok(())
}
