//! Progress reporter.
//!
//! Consumes structured progress events from the worker's channel and
//! writes normalized field updates into the job registry. Percentages
//! are clamped to be non-decreasing while downloading, so a polling
//! client never sees progress regress.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use tunedrop_media::DownloadEvent;
use tunedrop_models::{JobId, JobPhase};

use crate::registry::JobRegistry;

/// Spawn a reporter task draining `rx` into the registry.
///
/// The task ends when the sender side is dropped, i.e. when the
/// transfer finishes or fails.
pub fn spawn_reporter(
    registry: Arc<JobRegistry>,
    id: JobId,
    mut rx: UnboundedReceiver<DownloadEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            apply_event(&registry, &id, event).await;
        }
    })
}

/// Apply one event to the registry record.
async fn apply_event(registry: &JobRegistry, id: &JobId, event: DownloadEvent) {
    match event {
        DownloadEvent::Started { destination } => {
            registry
                .update(id, |record| {
                    record.set_phase(JobPhase::Downloading);
                    record.filename = Some(destination);
                })
                .await;
        }
        DownloadEvent::Downloading {
            percent,
            downloaded_bytes,
            total_bytes,
            speed,
            eta,
        } => {
            registry
                .update(id, |record| {
                    record.set_phase(JobPhase::Downloading);
                    let previous: f64 = record.percent.parse().unwrap_or(0.0);
                    record.percent = format!("{:.1}", percent.max(previous));
                    record.downloaded_bytes = downloaded_bytes.max(record.downloaded_bytes);
                    if total_bytes > 0 {
                        record.total_bytes = total_bytes;
                    }
                    record.speed = speed;
                    record.eta = eta;
                })
                .await;
        }
        DownloadEvent::Converting { destination } => {
            registry
                .update(id, |record| {
                    record.set_phase(JobPhase::Converting);
                    record.percent = "100.0".to_string();
                    record.filename = Some(destination);
                })
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn downloading(percent: f64) -> DownloadEvent {
        DownloadEvent::Downloading {
            percent,
            downloaded_bytes: (percent * 1000.0) as u64,
            total_bytes: 100_000,
            speed: "1.00MiB/s".to_string(),
            eta: "00:10".to_string(),
        }
    }

    async fn registry_with_job() -> (Arc<JobRegistry>, JobId) {
        let registry = Arc::new(JobRegistry::new(Duration::from_secs(3600)));
        let id = registry.create("https://youtu.be/abc", "192").await;
        (registry, id)
    }

    #[tokio::test]
    async fn test_events_drive_the_record() {
        let (registry, id) = registry_with_job().await;
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = spawn_reporter(Arc::clone(&registry), id.clone(), rx);

        tx.send(DownloadEvent::Started {
            destination: "/data/Song.webm".to_string(),
        })
        .unwrap();
        tx.send(downloading(42.5)).unwrap();
        drop(tx);
        handle.await.unwrap();

        let record = registry.get(&id).await.unwrap();
        assert_eq!(record.phase, JobPhase::Downloading);
        assert_eq!(record.percent, "42.5");
        assert_eq!(record.total_bytes, 100_000);
        assert_eq!(record.speed, "1.00MiB/s");
    }

    #[tokio::test]
    async fn test_percent_never_regresses() {
        let (registry, id) = registry_with_job().await;
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = spawn_reporter(Arc::clone(&registry), id.clone(), rx);

        tx.send(downloading(50.0)).unwrap();
        tx.send(downloading(40.0)).unwrap();
        drop(tx);
        handle.await.unwrap();

        let record = registry.get(&id).await.unwrap();
        assert_eq!(record.percent, "50.0");
    }

    #[tokio::test]
    async fn test_converting_event_switches_phase() {
        let (registry, id) = registry_with_job().await;
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = spawn_reporter(Arc::clone(&registry), id.clone(), rx);

        tx.send(downloading(99.0)).unwrap();
        tx.send(DownloadEvent::Converting {
            destination: "/data/Song.mp3".to_string(),
        })
        .unwrap();
        drop(tx);
        handle.await.unwrap();

        let record = registry.get(&id).await.unwrap();
        assert_eq!(record.phase, JobPhase::Converting);
        assert_eq!(record.percent, "100.0");
        assert_eq!(record.filename.as_deref(), Some("/data/Song.mp3"));
    }

    #[tokio::test]
    async fn test_events_after_terminal_are_ignored() {
        let (registry, id) = registry_with_job().await;
        registry.update(&id, |r| r.fail("gone")).await;

        let (tx, rx) = mpsc::unbounded_channel();
        let handle = spawn_reporter(Arc::clone(&registry), id.clone(), rx);
        tx.send(downloading(10.0)).unwrap();
        drop(tx);
        handle.await.unwrap();

        let record = registry.get(&id).await.unwrap();
        assert_eq!(record.phase, JobPhase::Error);
        assert_eq!(record.percent, "0");
    }
}
