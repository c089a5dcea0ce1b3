//! Artifact probing after a transfer.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::error::MediaResult;

/// Extensions probed when the expected `.mp3` is missing. The transcode
/// step may have been skipped, or the container may differ from the
/// requested format.
const FALLBACK_EXTENSIONS: &[&str] = &["m4a", "webm", "opus"];

/// A located artifact on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    /// Full path to the file
    pub path: PathBuf,
    /// Filename component
    pub filename: String,
    /// Size in bytes
    pub size_bytes: u64,
}

impl Artifact {
    async fn from_path(path: PathBuf) -> MediaResult<Self> {
        let size_bytes = fs::metadata(&path).await?.len();
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self {
            path,
            filename,
            size_bytes,
        })
    }
}

/// Probe for a produced artifact under the expected name.
///
/// Checks `<dir>/<stem>.mp3` first, then the fallback extensions.
/// Returns `None` when nothing was produced.
pub async fn locate_artifact(dir: impl AsRef<Path>, stem: &str) -> MediaResult<Option<Artifact>> {
    let dir = dir.as_ref();

    let expected = dir.join(format!("{stem}.mp3"));
    if expected.exists() {
        return Ok(Some(Artifact::from_path(expected).await?));
    }

    for ext in FALLBACK_EXTENSIONS {
        let candidate = dir.join(format!("{stem}.{ext}"));
        if candidate.exists() {
            debug!(path = %candidate.display(), "Artifact found under fallback extension");
            return Ok(Some(Artifact::from_path(candidate).await?));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_locate_expected_mp3() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Song.mp3"), b"abc").await.unwrap();

        let artifact = locate_artifact(dir.path(), "Song").await.unwrap().unwrap();
        assert_eq!(artifact.filename, "Song.mp3");
        assert_eq!(artifact.size_bytes, 3);
    }

    #[tokio::test]
    async fn test_locate_fallback_extension() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Song.m4a"), b"abcd").await.unwrap();

        let artifact = locate_artifact(dir.path(), "Song").await.unwrap().unwrap();
        assert_eq!(artifact.filename, "Song.m4a");
        assert_eq!(artifact.size_bytes, 4);
    }

    #[tokio::test]
    async fn test_mp3_preferred_over_fallback() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Song.webm"), b"raw").await.unwrap();
        fs::write(dir.path().join("Song.mp3"), b"converted")
            .await
            .unwrap();

        let artifact = locate_artifact(dir.path(), "Song").await.unwrap().unwrap();
        assert_eq!(artifact.filename, "Song.mp3");
    }

    #[tokio::test]
    async fn test_missing_artifact() {
        let dir = TempDir::new().unwrap();
        assert!(locate_artifact(dir.path(), "Nothing")
            .await
            .unwrap()
            .is_none());
    }
}
