//! Test utilities for stagecraft-lib.

use std::path::Path;

use crate::config::BuildConfig;

/// Working directory used by planning tests that never touch the filesystem.
#[cfg(unix)]
pub const CWD: &str = "/work/project";

#[cfg(windows)]
pub const CWD: &str = "C:\\work\\project";

/// The two-file `client` configuration most tests start from.
pub fn client_config() -> BuildConfig {
  BuildConfig::new("client", ["a.ts", "b.ts"])
}

/// Write a file relative to `root`, creating parent directories.
pub fn write_file(root: &Path, relative_path: &str, content: &str) {
  let path = root.join(relative_path);
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(&path, content).unwrap();
}

/// A program that exits successfully and ignores its arguments.
#[cfg(unix)]
pub fn succeeding_program() -> &'static str {
  "true"
}

#[cfg(windows)]
pub fn succeeding_program() -> &'static str {
  "cmd.exe"
}

/// A program that exits with status 1 whatever its arguments.
#[cfg(unix)]
pub fn failing_program() -> &'static str {
  "false"
}

#[cfg(windows)]
pub fn failing_program() -> &'static str {
  "findstr.exe"
}

/// Whether a `gzip` binary is available for end-to-end minify tests.
pub fn has_gzip() -> bool {
  std::process::Command::new("gzip")
    .arg("--version")
    .stdout(std::process::Stdio::null())
    .stderr(std::process::Stdio::null())
    .status()
    .is_ok_and(|s| s.success())
}
