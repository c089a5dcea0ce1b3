//! Bounded download history log.

use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::warn;

use tunedrop_models::HistoryEntry;

use crate::error::StoreResult;

/// Maximum number of entries retained; the oldest are dropped on overflow.
pub const HISTORY_LIMIT: usize = 100;

/// Append-only history persisted as a JSON array file.
///
/// Appends are read-modify-write on the whole file, so they are
/// serialized through an internal lock.
pub struct HistoryLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl HistoryLog {
    /// Create a log backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Append an entry, dropping the oldest beyond [`HISTORY_LIMIT`].
    pub async fn append(&self, entry: HistoryEntry) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.read_all().await;
        entries.push(entry);
        if entries.len() > HISTORY_LIMIT {
            let excess = entries.len() - HISTORY_LIMIT;
            entries.drain(..excess);
        }

        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_vec_pretty(&entries)?;
        fs::write(&self.path, json).await?;
        Ok(())
    }

    /// Most recent entries first, at most `limit`.
    pub async fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
        let mut entries = self.read_all().await;
        entries.reverse();
        entries.truncate(limit);
        entries
    }

    /// Total number of stored entries.
    pub async fn len(&self) -> usize {
        self.read_all().await.len()
    }

    /// Check whether the log is empty.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop all entries.
    pub async fn clear(&self) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }
        fs::write(&self.path, b"[]").await?;
        Ok(())
    }

    async fn read_all(&self) -> Vec<HistoryEntry> {
        match fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(path = %self.path.display(), "History file unparseable, starting fresh: {}", e);
                Vec::new()
            }),
            Err(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_in(dir: &tempfile::TempDir) -> HistoryLog {
        HistoryLog::new(dir.path().join("history.json"))
    }

    #[tokio::test]
    async fn test_append_and_recent() {
        let dir = tempfile::TempDir::new().unwrap();
        let log = log_in(&dir);

        log.append(HistoryEntry::success("u1", "First", "First.mp3", 1.0))
            .await
            .unwrap();
        log.append(HistoryEntry::failed("u2", ""))
            .await
            .unwrap();

        let recent = log.recent(10).await;
        assert_eq!(recent.len(), 2);
        // Newest first
        assert_eq!(recent[0].url, "u2");
        assert_eq!(recent[1].url, "u1");
    }

    #[tokio::test]
    async fn test_overflow_drops_oldest() {
        let dir = tempfile::TempDir::new().unwrap();
        let log = log_in(&dir);

        for i in 0..HISTORY_LIMIT + 5 {
            log.append(HistoryEntry::success(
                format!("url-{i}"),
                "t",
                "t.mp3",
                0.1,
            ))
            .await
            .unwrap();
        }

        assert_eq!(log.len().await, HISTORY_LIMIT);
        let recent = log.recent(1).await;
        assert_eq!(recent[0].url, format!("url-{}", HISTORY_LIMIT + 4));
    }

    #[tokio::test]
    async fn test_clear() {
        let dir = tempfile::TempDir::new().unwrap();
        let log = log_in(&dir);

        log.append(HistoryEntry::success("u", "t", "t.mp3", 1.0))
            .await
            .unwrap();
        log.clear().await.unwrap();
        assert!(log.is_empty().await);
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_fresh() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, b"garbage").await.unwrap();

        let log = HistoryLog::new(path);
        assert!(log.is_empty().await);
        log.append(HistoryEntry::success("u", "t", "t.mp3", 1.0))
            .await
            .unwrap();
        assert_eq!(log.len().await, 1);
    }
}
