//! Process actions.
//!
//! Commands inherit the caller's environment: tool locations such as
//! `node_modules/.bin/tsc` and system binaries like `gzip` are found through
//! the working directory and `PATH`.

use std::path::{Path, PathBuf};
use std::process::Output;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::execute::types::ExecuteError;

/// Run a command line through the shell in `cwd`.
///
/// Used for recipes that need redirection, e.g. `gzip --best < a > a.gz`.
/// Returns the trimmed stdout on success.
pub async fn execute_cmd(cmd: &str, cwd: &Path, shell: Option<&str>) -> Result<String, ExecuteError> {
  info!(cmd = %cmd, "executing command");

  let (shell_cmd, shell_args) = get_shell(shell);
  debug!(shell = %shell_cmd, cwd = %cwd.display(), "spawning process");

  let output = Command::new(&shell_cmd)
    .args(&shell_args)
    .arg(cmd)
    .current_dir(cwd)
    .output()
    .await
    .map_err(|source| ExecuteError::Spawn {
      cmd: cmd.to_string(),
      source,
    })?;

  check_output(cmd.to_string(), output)
}

/// Run `program` with `args` directly (no shell) in `cwd`.
///
/// A relative program path with more than one component, such as
/// `node_modules/.bin/tsc`, is resolved against `cwd`; a bare name is looked
/// up on `PATH`.
pub async fn execute_program(program: &Path, args: &[String], cwd: &Path) -> Result<String, ExecuteError> {
  let cmd_line = command_line(program, args);
  info!(cmd = %cmd_line, "executing program");

  let resolved = resolve_program(program, cwd);
  debug!(program = %resolved.display(), cwd = %cwd.display(), "spawning process");

  let output = Command::new(&resolved)
    .args(args)
    .current_dir(cwd)
    .output()
    .await
    .map_err(|source| ExecuteError::Spawn {
      cmd: cmd_line.clone(),
      source,
    })?;

  check_output(cmd_line, output)
}

fn resolve_program(program: &Path, cwd: &Path) -> PathBuf {
  if program.is_relative() && program.components().count() > 1 {
    cwd.join(program)
  } else {
    program.to_path_buf()
  }
}

fn command_line(program: &Path, args: &[String]) -> String {
  let mut line = program.display().to_string();
  for arg in args {
    line.push(' ');
    line.push_str(arg);
  }
  line
}

fn check_output(cmd: String, output: Output) -> Result<String, ExecuteError> {
  let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);

    // Compilers often report diagnostics on stdout
    if !stdout.is_empty() {
      warn!(stdout = %stdout, "command stdout");
    }
    if !stderr.trim().is_empty() {
      warn!(stderr = %stderr.trim(), "command stderr");
    }

    return Err(ExecuteError::CmdFailed {
      cmd,
      code: output.status.code(),
    });
  }

  if !stdout.is_empty() {
    info!(stdout = %stdout, "command output");
  }

  Ok(stdout)
}

/// Get the shell command and argument for the current platform.
///
/// `override_shell` picks the argument style from the shell's name:
/// PowerShell gets `-NoProfile -Command`, `cmd` gets `/C`, everything else `-c`.
fn get_shell(override_shell: Option<&str>) -> (String, Vec<String>) {
  if let Some(shell) = override_shell {
    let args = if shell.contains("powershell") || shell.contains("pwsh") {
      vec!["-NoProfile".to_string(), "-Command".to_string()]
    } else if shell.contains("cmd") {
      vec!["/C".to_string()]
    } else {
      vec!["-c".to_string()]
    };
    return (shell.to_string(), args);
  }

  #[cfg(unix)]
  {
    ("/bin/sh".to_string(), vec!["-c".to_string()])
  }

  #[cfg(windows)]
  {
    (
      "powershell.exe".to_string(),
      vec![
        "-NoProfile".to_string(),
        "-ExecutionPolicy".to_string(),
        "Bypass".to_string(),
        "-Command".to_string(),
      ],
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[tokio::test]
  async fn execute_simple_command() {
    let temp_dir = TempDir::new().unwrap();

    let result = execute_cmd("echo hello", temp_dir.path(), None).await.unwrap();

    assert_eq!(result, "hello");
  }

  #[tokio::test]
  async fn execute_command_failure() {
    let temp_dir = TempDir::new().unwrap();

    let result = execute_cmd("exit 3", temp_dir.path(), None).await;

    assert!(matches!(result, Err(ExecuteError::CmdFailed { code: Some(3), .. })));
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn execute_command_with_redirection_in_cwd() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("in.txt"), "payload").unwrap();

    execute_cmd("cat < in.txt > out.txt", temp_dir.path(), None).await.unwrap();

    assert_eq!(std::fs::read_to_string(temp_dir.path().join("out.txt")).unwrap(), "payload");
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn execute_program_passes_arguments_verbatim() {
    let temp_dir = TempDir::new().unwrap();

    let result = execute_program(
      Path::new("echo"),
      &["a b".to_string(), "c".to_string()],
      temp_dir.path(),
    )
    .await
    .unwrap();

    assert_eq!(result, "a b c");
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn execute_program_failure_reports_command_line() {
    let temp_dir = TempDir::new().unwrap();

    let err = execute_program(Path::new("false"), &["--flag".to_string()], temp_dir.path())
      .await
      .unwrap_err();

    match err {
      ExecuteError::CmdFailed { cmd, code } => {
        assert_eq!(cmd, "false --flag");
        assert_eq!(code, Some(1));
      }
      other => panic!("unexpected error {other:?}"),
    }
  }

  #[tokio::test]
  async fn execute_missing_program_is_spawn_error() {
    let temp_dir = TempDir::new().unwrap();

    let err = execute_program(Path::new("node_modules/.bin/tsc"), &[], temp_dir.path())
      .await
      .unwrap_err();

    assert!(matches!(err, ExecuteError::Spawn { .. }));
  }

  #[test]
  fn nested_relative_program_resolves_against_cwd() {
    let cwd = Path::new("/work/project");
    assert_eq!(
      resolve_program(Path::new("node_modules/.bin/tsc"), cwd),
      cwd.join("node_modules/.bin/tsc")
    );
    assert_eq!(resolve_program(Path::new("gzip"), cwd), PathBuf::from("gzip"));
  }

  #[test]
  fn get_shell_with_override() {
    let (shell, arg) = get_shell(Some("/usr/bin/bash"));
    assert_eq!(shell, "/usr/bin/bash");
    assert_eq!(arg, vec!["-c"]);
  }

  #[test]
  fn get_shell_with_cmd_override() {
    let (shell, args) = get_shell(Some("cmd.exe"));
    assert_eq!(shell, "cmd.exe");
    assert_eq!(args, vec!["/C"]);
  }

  #[test]
  fn get_shell_with_pwsh_override() {
    let (shell, args) = get_shell(Some("pwsh"));
    assert_eq!(shell, "pwsh");
    assert_eq!(args, vec!["-NoProfile", "-Command"]);
  }

  #[test]
  fn get_shell_default() {
    let (shell, args) = get_shell(None);
    #[cfg(unix)]
    {
      assert_eq!(shell, "/bin/sh");
      assert_eq!(args, vec!["-c"]);
    }
    #[cfg(windows)]
    {
      assert_eq!(shell, "powershell.exe");
      assert_eq!(args, vec!["-NoProfile", "-ExecutionPolicy", "Bypass", "-Command"]);
    }
  }
}
