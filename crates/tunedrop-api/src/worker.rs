//! Extraction/conversion worker.
//!
//! One worker task runs per admitted submission and drives the job
//! registry from `Starting` to a terminal phase: precondition checks,
//! metadata probe, policy gate, idempotence check, transfer+transcode,
//! artifact probe, finalization. The admission permit travels with the
//! task and is released when it drops.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::OwnedSemaphorePermit;
use tracing::{error, info, warn};

use tunedrop_media::{
    check_ffmpeg, check_ytdlp, download_audio, fetch_metadata, free_space_mb, locate_artifact,
    Artifact, AudioRequest, MediaError,
};
use tunedrop_models::{bytes_to_mb, clean_filename, AppSettings, HistoryEntry, JobId, SourceMetadata};
use tunedrop_store::HistoryLog;

use crate::metrics;
use crate::registry::JobRegistry;
use crate::reporter::spawn_reporter;

/// Grace period after the transfer returns, giving the external
/// transcode process time to flush its output.
const ARTIFACT_GRACE_PERIOD: Duration = Duration::from_secs(2);

/// Status messages are bounded for display; longer diagnostics are cut.
const MAX_STATUS_MESSAGE: usize = 200;

/// Content-eligibility rejection. The gate is cheap and runs before the
/// expensive transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyViolation {
    LiveBroadcast,
    AgeRestricted,
    TooLong { duration_secs: u64, cap_secs: u64 },
}

impl std::fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyViolation::LiveBroadcast => write!(f, "Live streams cannot be downloaded."),
            PolicyViolation::AgeRestricted => {
                write!(f, "This video is age-restricted and cannot be downloaded.")
            }
            PolicyViolation::TooLong { cap_secs, .. } => {
                write!(f, "Video is too long (max {} minutes).", cap_secs / 60)
            }
        }
    }
}

/// Failures surfaced to the registry. None of these are retried by the
/// worker; retry is the caller's responsibility via a fresh submission.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("{0}")]
    ToolUnavailable(String),

    #[error("Insufficient disk space: only {free_mb}MB free, {required_mb}MB required")]
    InsufficientSpace { free_mb: u64, required_mb: u64 },

    #[error("{0}")]
    PolicyRejected(PolicyViolation),

    #[error("Download completed but file not found")]
    ArtifactNotFound,

    #[error(transparent)]
    Media(#[from] MediaError),
}

impl WorkerError {
    /// Bounded, user-facing message for the status record.
    pub fn user_message(&self) -> String {
        let raw = match self {
            WorkerError::Media(MediaError::DownloadFailed { kind, message }) => kind
                .user_message()
                .map(str::to_string)
                .unwrap_or_else(|| message.clone()),
            other => other.to_string(),
        };
        truncate_message(&raw)
    }

    /// Whether the failure happened before any transfer could start.
    pub fn is_fatal_before_start(&self) -> bool {
        matches!(
            self,
            WorkerError::ToolUnavailable(_)
                | WorkerError::InsufficientSpace { .. }
                | WorkerError::PolicyRejected(_)
        )
    }
}

fn truncate_message(message: &str) -> String {
    if message.chars().count() <= MAX_STATUS_MESSAGE {
        message.to_string()
    } else {
        message.chars().take(MAX_STATUS_MESSAGE).collect()
    }
}

/// Check a probed source against the policy limits.
pub fn check_policy(
    metadata: &SourceMetadata,
    settings: &AppSettings,
) -> Result<(), PolicyViolation> {
    if metadata.live() {
        return Err(PolicyViolation::LiveBroadcast);
    }
    if metadata.age_restricted() {
        return Err(PolicyViolation::AgeRestricted);
    }
    let duration_secs = metadata.duration_secs();
    if duration_secs > settings.max_duration_secs {
        return Err(PolicyViolation::TooLong {
            duration_secs,
            cap_secs: settings.max_duration_secs,
        });
    }
    Ok(())
}

/// Everything a worker task needs, bundled at submission time.
pub struct WorkerContext {
    pub registry: Arc<JobRegistry>,
    pub history: Arc<HistoryLog>,
    pub settings: AppSettings,
    pub download_dir: PathBuf,
}

/// Successful outcome of a worker run.
struct JobOutcome {
    title: String,
    artifact: Artifact,
    /// True when the artifact already existed and the transfer was skipped
    existed: bool,
}

/// Run one job to completion. Spawned as a detached task; the permit is
/// dropped (and the slot freed) on every exit path.
pub async fn run_job(
    ctx: WorkerContext,
    id: JobId,
    url: String,
    quality: String,
    permit: OwnedSemaphorePermit,
) {
    metrics::record_job_started();
    info!(job_id = %id, url = %url, "Worker started");

    match execute(&ctx, &id, &url, &quality).await {
        Ok(outcome) => finalize_success(&ctx, &id, &url, outcome).await,
        Err(err) => finalize_failure(&ctx, &id, &url, err).await,
    }

    drop(permit);
}

/// Steps 1-7 of the job protocol. Finalization happens in the caller.
async fn execute(
    ctx: &WorkerContext,
    id: &JobId,
    url: &str,
    quality: &str,
) -> Result<JobOutcome, WorkerError> {
    // 1. Preconditions, before any network activity
    check_ffmpeg().map_err(|_| {
        WorkerError::ToolUnavailable(
            "FFmpeg is not available. This is required for MP3 conversion.".to_string(),
        )
    })?;
    check_ytdlp().map_err(|_| {
        WorkerError::ToolUnavailable("yt-dlp is not available.".to_string())
    })?;

    tokio::fs::create_dir_all(&ctx.download_dir).await.map_err(MediaError::Io)?;
    let free_mb = free_space_mb(&ctx.download_dir)?;
    if free_mb < ctx.settings.min_free_space_mb {
        return Err(WorkerError::InsufficientSpace {
            free_mb,
            required_mb: ctx.settings.min_free_space_mb,
        });
    }

    // 2. Metadata-only probe
    let metadata = fetch_metadata(url).await?;

    // 3. Policy gate
    check_policy(&metadata, &ctx.settings).map_err(WorkerError::PolicyRejected)?;

    let title = metadata.title.clone();
    let stem = clean_filename(&title);
    ctx.registry.update(id, |r| r.set_title(title.clone())).await;

    // 4-5. Idempotence: skip the transfer when the target already exists
    let target = ctx.download_dir.join(format!("{stem}.mp3"));
    if target.exists() {
        let size_bytes = tokio::fs::metadata(&target).await.map_err(MediaError::Io)?.len();
        info!(job_id = %id, file = %target.display(), "Artifact already exists, skipping transfer");
        return Ok(JobOutcome {
            title,
            artifact: Artifact {
                filename: format!("{stem}.mp3"),
                path: target,
                size_bytes,
            },
            existed: true,
        });
    }

    // 6. Transfer + transcode, progress through the reporter channel
    let (tx, rx) = mpsc::unbounded_channel();
    let reporter = spawn_reporter(Arc::clone(&ctx.registry), id.clone(), rx);

    let request = AudioRequest {
        url: url.to_string(),
        output_template: ctx.download_dir.join(format!("{stem}.%(ext)s")),
        quality: quality.to_string(),
        max_file_size_mb: ctx.settings.max_file_size_mb,
    };

    let result = download_audio(&request, move |event| {
        let _ = tx.send(event);
    })
    .await;

    // Sender is gone once download_audio returns; drain the reporter
    let _ = reporter.await;
    result?;

    // 7. Grace period, then probe for the artifact
    tokio::time::sleep(ARTIFACT_GRACE_PERIOD).await;
    match locate_artifact(&ctx.download_dir, &stem).await? {
        Some(artifact) => Ok(JobOutcome {
            title,
            artifact,
            existed: false,
        }),
        None => Err(WorkerError::ArtifactNotFound),
    }
}

/// Step 8: persist the history entry and freeze the terminal status.
async fn finalize_success(ctx: &WorkerContext, id: &JobId, url: &str, outcome: JobOutcome) {
    let size_mb = bytes_to_mb(outcome.artifact.size_bytes);

    let entry = HistoryEntry::success(url, &outcome.title, &outcome.artifact.filename, size_mb);
    if let Err(e) = ctx.history.append(entry).await {
        warn!(job_id = %id, "Failed to append history entry: {}", e);
    }

    let path = outcome.artifact.path.to_string_lossy().to_string();
    if outcome.existed {
        let message = format!("Already downloaded: {} ({:.1}MB)", outcome.title, size_mb);
        ctx.registry
            .update(id, |r| r.mark_exists(message, path, size_mb))
            .await;
        metrics::record_job_exists();
    } else {
        let message = format!("Downloaded: {} ({:.1}MB)", outcome.title, size_mb);
        ctx.registry
            .update(id, |r| r.complete(message, path, size_mb))
            .await;
        metrics::record_job_completed();
    }

    info!(job_id = %id, size_mb = size_mb, existed = outcome.existed, "Job finished");
}

/// Step 9: record the failure in history first, then freeze the error
/// status, so history and live status cannot diverge on this path.
async fn finalize_failure(ctx: &WorkerContext, id: &JobId, url: &str, err: WorkerError) {
    error!(job_id = %id, "Job failed: {}", err);

    let title = ctx
        .registry
        .get(id)
        .await
        .and_then(|r| r.title)
        .unwrap_or_default();

    if let Err(e) = ctx.history.append(HistoryEntry::failed(url, title)).await {
        warn!(job_id = %id, "Failed to append history entry: {}", e);
    }

    let message = err.user_message();
    ctx.registry.update(id, |r| r.fail(message)).await;
    metrics::record_job_failed(&err);
}
