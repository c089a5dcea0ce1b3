//! Prometheus metrics for the API server.

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::worker::WorkerError;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    pub const JOBS_STARTED_TOTAL: &str = "tunedrop_jobs_started_total";
    pub const JOBS_COMPLETED_TOTAL: &str = "tunedrop_jobs_completed_total";
    pub const JOBS_EXISTS_TOTAL: &str = "tunedrop_jobs_exists_total";
    pub const JOBS_FAILED_TOTAL: &str = "tunedrop_jobs_failed_total";
    pub const SUBMISSIONS_REJECTED_TOTAL: &str = "tunedrop_submissions_rejected_total";
}

/// Record a worker task starting.
pub fn record_job_started() {
    counter!(names::JOBS_STARTED_TOTAL).increment(1);
}

/// Record a job reaching `completed`.
pub fn record_job_completed() {
    counter!(names::JOBS_COMPLETED_TOTAL).increment(1);
}

/// Record a job reaching `exists`.
pub fn record_job_exists() {
    counter!(names::JOBS_EXISTS_TOTAL).increment(1);
}

/// Record a job reaching `error`, labelled by failure class.
pub fn record_job_failed(err: &WorkerError) {
    let reason = match err {
        WorkerError::ToolUnavailable(_) => "tool_unavailable",
        WorkerError::InsufficientSpace { .. } => "insufficient_space",
        WorkerError::PolicyRejected(_) => "policy_rejected",
        WorkerError::ArtifactNotFound => "artifact_not_found",
        WorkerError::Media(_) => "transfer",
    };
    counter!(names::JOBS_FAILED_TOTAL, "reason" => reason).increment(1);
}

/// Record a submission bounced by admission control.
pub fn record_submission_rejected() {
    counter!(names::SUBMISSIONS_REJECTED_TOTAL).increment(1);
}
