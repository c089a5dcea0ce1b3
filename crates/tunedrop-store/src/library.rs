//! Download-library filesystem operations.

use std::path::Path;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::fs;
use tracing::{debug, info};

use tunedrop_models::bytes_to_mb;

use crate::error::{StoreError, StoreResult};

/// Leftover extensions written by an interrupted transfer.
const PARTIAL_SUFFIXES: &[&str] = &[".part", ".ytdl", ".temp"];

/// One artifact in the library.
#[derive(Debug, Clone, Serialize)]
pub struct AudioFile {
    /// Filename
    pub name: String,
    /// Size in megabytes, two decimal places
    pub size_mb: f64,
    /// Last modification time
    pub modified: DateTime<Utc>,
}

/// Aggregate library statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LibraryStats {
    pub total_files: usize,
    pub total_size_mb: f64,
}

/// List MP3 artifacts in `dir`, newest first.
pub async fn list_audio_files(dir: impl AsRef<Path>) -> StoreResult<Vec<AudioFile>> {
    let dir = dir.as_ref();
    let mut files = Vec::new();

    if !dir.exists() {
        return Ok(files);
    }

    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().to_string();
        if !name.ends_with(".mp3") {
            continue;
        }
        let meta = match entry.metadata().await {
            Ok(m) if m.is_file() => m,
            _ => continue,
        };
        let modified = meta
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        files.push(AudioFile {
            name,
            size_mb: (bytes_to_mb(meta.len()) * 100.0).round() / 100.0,
            modified,
        });
    }

    files.sort_by(|a, b| b.modified.cmp(&a.modified));
    Ok(files)
}

/// Aggregate stats over the MP3 artifacts in `dir`.
pub async fn stats(dir: impl AsRef<Path>) -> StoreResult<LibraryStats> {
    let files = list_audio_files(dir).await?;
    Ok(LibraryStats {
        total_files: files.len(),
        total_size_mb: files.iter().map(|f| f.size_mb).sum(),
    })
}

/// Remove MP3 artifacts older than `max_age_days`. Returns the count removed.
pub async fn remove_aged(dir: impl AsRef<Path>, max_age_days: u64) -> StoreResult<usize> {
    let dir = dir.as_ref();
    if !dir.exists() {
        return Ok(0);
    }

    let cutoff = SystemTime::now() - Duration::from_secs(max_age_days * 24 * 60 * 60);
    let mut removed = 0;

    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().to_string();
        if !name.ends_with(".mp3") {
            continue;
        }
        let meta = match entry.metadata().await {
            Ok(m) if m.is_file() => m,
            _ => continue,
        };
        let old = meta.modified().map(|m| m < cutoff).unwrap_or(false);
        if old && fs::remove_file(entry.path()).await.is_ok() {
            debug!(file = %name, "Removed aged artifact");
            removed += 1;
        }
    }

    if removed > 0 {
        info!("Cleanup removed {} aged artifact(s)", removed);
    }
    Ok(removed)
}

/// Remove leftover partial-transfer files. Returns the count removed.
pub async fn remove_partials(dir: impl AsRef<Path>) -> StoreResult<usize> {
    let dir = dir.as_ref();
    if !dir.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().to_string();
        if PARTIAL_SUFFIXES.iter().any(|s| name.ends_with(s))
            && fs::remove_file(entry.path()).await.is_ok()
        {
            debug!(file = %name, "Removed partial file");
            removed += 1;
        }
    }

    Ok(removed)
}

/// Delete a single artifact by filename.
///
/// Rejects names that could escape the library directory. Returns false
/// when the file does not exist.
pub async fn delete_file(dir: impl AsRef<Path>, name: &str) -> StoreResult<bool> {
    if name.is_empty() || name.contains("..") || name.contains('/') || name.contains('\\') {
        return Err(StoreError::InvalidFilename(name.to_string()));
    }

    let path = dir.as_ref().join(name);
    if !path.is_file() {
        return Ok(false);
    }

    fs::remove_file(&path).await?;
    info!(file = %name, "Deleted artifact");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_list_only_mp3s_newest_first() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.mp3"), b"aaa").await.unwrap();
        fs::write(dir.path().join("skip.txt"), b"x").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        fs::write(dir.path().join("b.mp3"), b"bbbb").await.unwrap();

        let files = list_audio_files(dir.path()).await.unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].name, "b.mp3");
    }

    #[tokio::test]
    async fn test_stats() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.mp3"), vec![0u8; 1024 * 1024])
            .await
            .unwrap();

        let s = stats(dir.path()).await.unwrap();
        assert_eq!(s.total_files, 1);
        assert!((s.total_size_mb - 1.0).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_remove_partials() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("x.webm.part"), b"p").await.unwrap();
        fs::write(dir.path().join("x.ytdl"), b"p").await.unwrap();
        fs::write(dir.path().join("keep.mp3"), b"k").await.unwrap();

        let removed = remove_partials(dir.path()).await.unwrap();
        assert_eq!(removed, 2);
        assert!(dir.path().join("keep.mp3").exists());
    }

    #[tokio::test]
    async fn test_remove_aged_keeps_fresh_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("fresh.mp3"), b"f").await.unwrap();

        let removed = remove_aged(dir.path(), 7).await.unwrap();
        assert_eq!(removed, 0);
        assert!(dir.path().join("fresh.mp3").exists());
    }

    #[tokio::test]
    async fn test_delete_file_guards_traversal() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            delete_file(dir.path(), "../escape.mp3").await,
            Err(StoreError::InvalidFilename(_))
        ));
        assert!(matches!(
            delete_file(dir.path(), "a/b.mp3").await,
            Err(StoreError::InvalidFilename(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("gone.mp3"), b"g").await.unwrap();

        assert!(delete_file(dir.path(), "gone.mp3").await.unwrap());
        assert!(!delete_file(dir.path(), "gone.mp3").await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(list_audio_files(&missing).await.unwrap().is_empty());
        assert_eq!(remove_partials(&missing).await.unwrap(), 0);
    }
}
