// # File Tracker
//
// Appends track entries to a JSON Lines file, one object per line:
//
// ```text
// {"timestamp":1736424000,"domain":"example.com","ttl":60,"addresses":"4278058.235"}
// ```
//
// The file is opened in append mode for each entry and never truncated.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::traits::tracker::{TrackEntry, Tracker};

/// JSON Lines track history
#[derive(Debug, Clone)]
pub struct FileTracker {
    path: PathBuf,
}

impl FileTracker {
    /// Create a file tracker, creating parent directories if needed
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::config(format!(
                    "Failed to create track directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        Ok(Self { path })
    }

    /// Path of the history file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Tracker for FileTracker {
    async fn append(&self, entry: &TrackEntry) -> Result<(), Error> {
        let mut line = serde_json::to_string(entry)
            .map_err(|e| Error::track(format!("Failed to serialize track entry: {}", e)))?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| {
                Error::track(format!(
                    "Failed to open track file {}: {}",
                    self.path.display(),
                    e
                ))
            })?;

        file.write_all(line.as_bytes()).await.map_err(|e| {
            Error::track(format!(
                "Failed to append to track file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        file.flush().await.map_err(|e| {
            Error::track(format!(
                "Failed to flush track file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("Track entry appended for {}", entry.domain);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_entries_are_appended() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tracker.jsonl");
        let tracker = FileTracker::new(&path).await.unwrap();

        let first = TrackEntry::new(100, "a.example", 60, &[Ipv4Addr::new(1, 2, 3, 4)]);
        let second = TrackEntry::new(
            200,
            "b.example",
            30,
            &[Ipv4Addr::new(1, 2, 3, 4), Ipv4Addr::new(255, 255, 255, 250)],
        );
        tracker.append(&first).await.unwrap();
        tracker.append(&second).await.unwrap();

        let content = fs::read_to_string(&path).await.unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: TrackEntry = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed, second);
        assert_eq!(parsed.addresses, "4278058.235,0.005");
    }

    #[tokio::test]
    async fn test_existing_history_is_preserved() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tracker.jsonl");
        fs::write(&path, "previous run\n").await.unwrap();

        let tracker = FileTracker::new(&path).await.unwrap();
        tracker
            .append(&TrackEntry::new(1, "a.example", 1, &[]))
            .await
            .unwrap();

        let content = fs::read_to_string(&path).await.unwrap();
        assert!(content.starts_with("previous run\n"));
        assert_eq!(content.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_unwritable_path_is_track_error() {
        let dir = tempdir().unwrap();
        // A directory cannot be opened for appending
        let tracker = FileTracker::new(dir.path()).await.unwrap();

        let result = tracker.append(&TrackEntry::new(1, "a.example", 1, &[])).await;
        assert!(matches!(result, Err(Error::Track(_))));
    }
}
