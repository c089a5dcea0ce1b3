//! Application settings.

use serde::{Deserialize, Serialize};

/// Flat configuration record consulted by the worker and the library
/// handlers. Persisted as JSON; every field has an in-code default so a
/// partial or missing settings file still loads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Audio quality in kbps passed to the transcoder
    #[serde(default = "default_audio_quality")]
    pub audio_quality: String,
    /// Maximum artifact size accepted from the extractor
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,
    /// Maximum source duration accepted by the policy gate
    #[serde(default = "default_max_duration_secs")]
    pub max_duration_secs: u64,
    /// Minimum free disk space required before a job starts
    #[serde(default = "default_min_free_space_mb")]
    pub min_free_space_mb: u64,
    /// Age after which cleanup removes artifacts
    #[serde(default = "default_auto_cleanup_days")]
    pub auto_cleanup_days: u64,
    /// Admission-control capacity
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,
}

fn default_audio_quality() -> String {
    "192".to_string()
}

fn default_max_file_size_mb() -> u64 {
    50
}

fn default_max_duration_secs() -> u64 {
    1800
}

fn default_min_free_space_mb() -> u64 {
    100
}

fn default_auto_cleanup_days() -> u64 {
    7
}

fn default_max_concurrent_jobs() -> usize {
    1
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            audio_quality: default_audio_quality(),
            max_file_size_mb: default_max_file_size_mb(),
            max_duration_secs: default_max_duration_secs(),
            min_free_space_mb: default_min_free_space_mb(),
            auto_cleanup_days: default_auto_cleanup_days(),
            max_concurrent_jobs: default_max_concurrent_jobs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = AppSettings::default();
        assert_eq!(settings.audio_quality, "192");
        assert_eq!(settings.max_duration_secs, 1800);
        assert_eq!(settings.max_concurrent_jobs, 1);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let settings: AppSettings = serde_json::from_str(r#"{"audio_quality": "320"}"#).unwrap();
        assert_eq!(settings.audio_quality, "320");
        assert_eq!(settings.max_file_size_mb, 50);
        assert_eq!(settings.auto_cleanup_days, 7);
    }

    #[test]
    fn test_empty_json_is_all_defaults() {
        let settings: AppSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.min_free_space_mb, 100);
    }
}
