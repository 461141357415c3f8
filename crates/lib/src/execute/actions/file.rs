//! File-writing actions.

use std::path::Path;

use chrono::Local;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::execute::types::ExecuteError;

/// The comment line appended by a stamp: `//<timestamp>[ note]`.
pub fn stamp_line(timestamp: &str, note: Option<&str>) -> String {
  match note {
    Some(note) if !note.is_empty() => format!("\n//{} {}\n", timestamp, note),
    _ => format!("\n//{}\n", timestamp),
  }
}

/// Append a timestamp comment to `path`, creating the file if needed.
///
/// A fresh stamp is what makes an otherwise unchanged output newer than its
/// prerequisites.
pub async fn append_stamp(path: &Path, note: Option<&str>) -> Result<(), ExecuteError> {
  let timestamp = Local::now().to_rfc2822();
  debug!(path = %path.display(), timestamp = %timestamp, "appending stamp");

  let mut file = tokio::fs::OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .await?;
  file.write_all(stamp_line(&timestamp, note).as_bytes()).await?;
  file.flush().await?;
  Ok(())
}

/// Replace `path` with `contents`.
pub async fn write_file(path: &Path, contents: &str) -> Result<(), ExecuteError> {
  debug!(path = %path.display(), bytes = contents.len(), "writing file");

  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    tokio::fs::create_dir_all(parent).await?;
  }
  tokio::fs::write(path, contents).await?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn stamp_line_with_and_without_note() {
    assert_eq!(stamp_line("T", None), "\n//T\n");
    assert_eq!(stamp_line("T", Some("a.js b.js")), "\n//T a.js b.js\n");
    assert_eq!(stamp_line("T", Some("")), "\n//T\n");
  }

  #[tokio::test]
  async fn append_stamp_creates_and_appends() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("out.min.js");

    append_stamp(&path, Some("in.js")).await.unwrap();
    append_stamp(&path, None).await.unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let stamps: Vec<&str> = content.lines().filter(|l| l.starts_with("//")).collect();
    assert_eq!(stamps.len(), 2);
    assert!(stamps[0].ends_with(" in.js"));
  }

  #[tokio::test]
  async fn append_stamp_keeps_existing_content() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("out.js");
    std::fs::write(&path, "var x = 1;").unwrap();

    append_stamp(&path, None).await.unwrap();

    assert!(std::fs::read_to_string(&path).unwrap().starts_with("var x = 1;\n//"));
  }

  #[tokio::test]
  async fn write_file_replaces_content() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested/stagecraft.mk");

    write_file(&path, "old").await.unwrap();
    write_file(&path, "new\n").await.unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "new\n");
  }
}
