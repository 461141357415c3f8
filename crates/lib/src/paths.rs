//! Lexical path helpers.
//!
//! Every path that enters the task graph is normalized relative to the working
//! directory, so rules declared from different stages agree on target names.
//! Nothing in here touches the filesystem.

use std::path::{Component, Path, PathBuf};

/// Normalize a path by resolving `.` and `..` components without touching the filesystem.
///
/// Leading `..` components of a relative path are kept, since there is nothing
/// to pop them against.
pub fn normalize(path: &Path) -> PathBuf {
  let mut normalized = PathBuf::new();
  for component in path.components() {
    match component {
      Component::CurDir => {}
      Component::ParentDir => {
        let can_pop = matches!(normalized.components().next_back(), Some(Component::Normal(_)));
        if can_pop {
          normalized.pop();
        } else if !normalized.has_root() {
          normalized.push("..");
        }
      }
      _ => normalized.push(component),
    }
  }
  normalized
}

/// Compute `path` relative to `base`.
///
/// Relative inputs are taken to be relative to `base` already. Returns `.` when
/// the two paths are the same.
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
  let absolute = normalize(&base.join(path));
  let base = normalize(base);

  let from: Vec<_> = base.components().collect();
  let to: Vec<_> = absolute.components().collect();

  let common_len = from.iter().zip(to.iter()).take_while(|(a, b)| a == b).count();

  let mut relative = PathBuf::new();
  for _ in common_len..from.len() {
    relative.push("..");
  }
  for component in to.iter().skip(common_len) {
    relative.push(component);
  }

  if relative.as_os_str().is_empty() {
    PathBuf::from(".")
  } else {
    relative
  }
}

/// Compute `path` relative to the process working directory.
///
/// If the working directory cannot be read, the path is only normalized.
pub fn to_relative(path: &Path) -> PathBuf {
  match std::env::current_dir() {
    Ok(cwd) => relative_to(path, &cwd),
    Err(_) => normalize(path),
  }
}

/// Render a path with forward slashes, as written into generated makefiles.
pub fn to_slash(path: &Path) -> String {
  path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalize_resolves_dots() {
    assert_eq!(normalize(Path::new("a/./b/../c")), PathBuf::from("a/c"));
    assert_eq!(normalize(Path::new("./build/debug")), PathBuf::from("build/debug"));
  }

  #[test]
  fn normalize_keeps_leading_parent_dirs() {
    assert_eq!(normalize(Path::new("../a/b")), PathBuf::from("../a/b"));
    assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
  }

  #[cfg(unix)]
  #[test]
  fn normalize_does_not_escape_root() {
    assert_eq!(normalize(Path::new("/../etc")), PathBuf::from("/etc"));
  }

  #[cfg(unix)]
  #[test]
  fn relative_to_nested_path() {
    let rel = relative_to(Path::new("/work/project/build/debug"), Path::new("/work/project"));
    assert_eq!(rel, PathBuf::from("build/debug"));
  }

  #[cfg(unix)]
  #[test]
  fn relative_to_sibling_tree() {
    let rel = relative_to(Path::new("/tmp/out/debug/client"), Path::new("/work/project"));
    assert_eq!(rel, PathBuf::from("../../tmp/out/debug/client"));
  }

  #[cfg(unix)]
  #[test]
  fn relative_to_keeps_relative_inputs() {
    let rel = relative_to(Path::new("./src/../src/a.ts"), Path::new("/work/project"));
    assert_eq!(rel, PathBuf::from("src/a.ts"));
  }

  #[cfg(unix)]
  #[test]
  fn relative_to_same_path_is_dot() {
    let rel = relative_to(Path::new("/work/project"), Path::new("/work/project"));
    assert_eq!(rel, PathBuf::from("."));
  }

  #[test]
  fn to_relative_of_relative_path_is_unchanged() {
    assert_eq!(to_relative(Path::new("build/debug/x")), PathBuf::from("build/debug/x"));
  }

  #[test]
  fn to_slash_converts_backslashes() {
    assert_eq!(to_slash(Path::new("a\\b\\c.ts")), "a/b/c.ts");
  }
}
