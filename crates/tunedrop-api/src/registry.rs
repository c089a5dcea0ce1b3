//! In-memory job registry.
//!
//! Maps job identifiers to status records. Records are mutated in place
//! under a process-wide lock and frozen once terminal; a background
//! sweeper evicts terminal records after a retention window so the map
//! does not grow for the life of the process.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio::time::interval;
use tracing::{debug, info};

use tunedrop_models::{JobId, JobRecord};

/// Registry of job status records.
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, JobRecord>>,
    retention: Duration,
}

impl JobRegistry {
    /// Create a registry retaining terminal records for `retention`.
    pub fn new(retention: Duration) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            retention,
        }
    }

    /// Allocate a fresh job and insert its initial record.
    pub async fn create(&self, url: impl Into<String>, quality: impl Into<String>) -> JobId {
        let id = JobId::new();
        let record = JobRecord::new(id.clone(), url, quality);
        self.jobs.write().await.insert(id.clone(), record);
        id
    }

    /// Apply a mutation to a record.
    ///
    /// Returns false without touching the record when the identifier is
    /// unknown or the record is already terminal.
    pub async fn update<F>(&self, id: &JobId, f: F) -> bool
    where
        F: FnOnce(&mut JobRecord),
    {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(id) {
            Some(record) if !record.is_terminal() => {
                f(record);
                true
            }
            _ => false,
        }
    }

    /// Snapshot of the current record.
    pub async fn get(&self, id: &JobId) -> Option<JobRecord> {
        self.jobs.read().await.get(id).cloned()
    }

    /// Number of records currently held.
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// Check whether the registry holds no records.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Evict terminal records older than the retention window.
    /// Returns the number of records removed.
    pub async fn sweep(&self) -> usize {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(self.retention).unwrap_or(chrono::Duration::zero());

        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, record| !(record.is_terminal() && record.updated_at <= cutoff));
        let removed = before - jobs.len();

        if removed > 0 {
            debug!("Evicted {} terminal job record(s)", removed);
        }
        removed
    }

    /// Run the eviction loop. Spawn as a background task.
    pub async fn run_sweeper(self: Arc<Self>, sweep_interval: Duration) {
        info!(
            "Starting registry sweeper (interval: {:?}, retention: {:?})",
            sweep_interval, self.retention
        );

        let mut ticker = interval(sweep_interval);
        loop {
            ticker.tick().await;
            self.sweep().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tunedrop_models::JobPhase;

    #[tokio::test]
    async fn test_create_and_get() {
        let registry = JobRegistry::new(Duration::from_secs(3600));
        let id = registry.create("https://youtu.be/abc", "192").await;

        let record = registry.get(&id).await.unwrap();
        assert_eq!(record.phase, JobPhase::Starting);
        assert_eq!(record.url, "https://youtu.be/abc");
    }

    #[tokio::test]
    async fn test_unknown_id() {
        let registry = JobRegistry::new(Duration::from_secs(3600));
        assert!(registry.get(&JobId::new()).await.is_none());
        assert!(!registry.update(&JobId::new(), |r| r.touch()).await);
    }

    #[tokio::test]
    async fn test_update_mutates_in_place() {
        let registry = JobRegistry::new(Duration::from_secs(3600));
        let id = registry.create("https://youtu.be/abc", "192").await;

        assert!(
            registry
                .update(&id, |r| {
                    r.set_phase(JobPhase::Downloading);
                    r.percent = "12.5".to_string();
                })
                .await
        );

        let record = registry.get(&id).await.unwrap();
        assert_eq!(record.phase, JobPhase::Downloading);
        assert_eq!(record.percent, "12.5");
    }

    #[tokio::test]
    async fn test_terminal_records_are_frozen() {
        let registry = JobRegistry::new(Duration::from_secs(3600));
        let id = registry.create("https://youtu.be/abc", "192").await;

        assert!(registry.update(&id, |r| r.fail("boom")).await);
        // Further updates are refused
        assert!(!registry.update(&id, |r| r.percent = "50.0".to_string()).await);

        let record = registry.get(&id).await.unwrap();
        assert_eq!(record.phase, JobPhase::Error);
        assert_eq!(record.percent, "0");
    }

    #[tokio::test]
    async fn test_sweep_evicts_only_old_terminal_records() {
        let registry = JobRegistry::new(Duration::ZERO);
        let done = registry.create("https://youtu.be/done", "192").await;
        let live = registry.create("https://youtu.be/live", "192").await;

        registry
            .update(&done, |r| r.complete("done", "/x/done.mp3", 1.0))
            .await;

        // Zero retention: any terminal record is immediately eligible
        tokio::time::sleep(Duration::from_millis(5)).await;
        let removed = registry.sweep().await;

        assert_eq!(removed, 1);
        assert!(registry.get(&done).await.is_none());
        assert!(registry.get(&live).await.is_some());
    }
}
