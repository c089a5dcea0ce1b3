//! Application state.

use std::sync::Arc;

use tunedrop_store::{HistoryLog, SettingsStore};

use crate::admission::AdmissionControl;
use crate::config::ApiConfig;
use crate::registry::JobRegistry;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub registry: Arc<JobRegistry>,
    pub admission: Arc<AdmissionControl>,
    pub settings: Arc<SettingsStore>,
    pub history: Arc<HistoryLog>,
}

impl AppState {
    /// Create new application state.
    ///
    /// Ensures the download and data directories exist and sizes the
    /// admission gate from the persisted settings.
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&config.download_dir).await?;
        tokio::fs::create_dir_all(&config.data_dir).await?;

        let settings = Arc::new(SettingsStore::new(config.settings_path()));
        let history = Arc::new(HistoryLog::new(config.history_path()));
        let registry = Arc::new(JobRegistry::new(config.job_retention));

        // Capacity is read once at startup; changing it requires a restart
        let capacity = settings.load().await.max_concurrent_jobs.max(1);
        let admission = Arc::new(AdmissionControl::new(capacity));

        Ok(Self {
            config,
            registry,
            admission,
            settings,
            history,
        })
    }
}
