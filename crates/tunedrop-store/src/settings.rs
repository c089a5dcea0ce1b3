//! JSON settings store.

use std::path::PathBuf;
use tokio::fs;
use tracing::warn;

use tunedrop_models::AppSettings;

use crate::error::StoreResult;

/// Settings persisted as a single JSON file.
///
/// Reads fall back to in-code defaults when the file is missing or does
/// not parse; callers load fresh on every request rather than caching.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Create a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load settings, falling back to defaults on any read failure.
    pub async fn load(&self) -> AppSettings {
        match fs::read(&self.path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!(path = %self.path.display(), "Settings file unparseable, using defaults: {}", e);
                    AppSettings::default()
                }
            },
            Err(_) => AppSettings::default(),
        }
    }

    /// Persist settings to disk.
    pub async fn save(&self, settings: &AppSettings) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_vec_pretty(settings)?;
        fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));

        let settings = store.load().await;
        assert_eq!(settings.audio_quality, "192");
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));

        let mut settings = AppSettings::default();
        settings.audio_quality = "320".to_string();
        settings.auto_cleanup_days = 3;
        store.save(&settings).await.unwrap();

        let loaded = store.load().await;
        assert_eq!(loaded.audio_quality, "320");
        assert_eq!(loaded.auto_cleanup_days, 3);
    }

    #[tokio::test]
    async fn test_corrupt_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, b"{not json").await.unwrap();

        let store = SettingsStore::new(path);
        let settings = store.load().await;
        assert_eq!(settings.max_file_size_mb, 50);
    }

    #[tokio::test]
    async fn test_save_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(dir.path().join("nested/app/settings.json"));
        store.save(&AppSettings::default()).await.unwrap();
        assert_eq!(store.load().await.audio_quality, "192");
    }
}
