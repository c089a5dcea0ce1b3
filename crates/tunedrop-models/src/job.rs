//! Job identifiers, lifecycle phases and the per-job status record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle phase of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    /// Job record created, worker not yet transferring
    #[default]
    Starting,
    /// Transfer in progress
    Downloading,
    /// Transfer done, transcode running
    Converting,
    /// Artifact produced
    Completed,
    /// Artifact already existed, transfer skipped
    Exists,
    /// Job failed
    Error,
}

impl JobPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobPhase::Starting => "starting",
            JobPhase::Downloading => "downloading",
            JobPhase::Converting => "converting",
            JobPhase::Completed => "completed",
            JobPhase::Exists => "exists",
            JobPhase::Error => "error",
        }
    }

    /// Check if this is a terminal phase (no more updates expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobPhase::Completed | JobPhase::Exists | JobPhase::Error)
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status record for one submitted job.
///
/// The record is mutated in place by the worker as the job progresses and
/// frozen once the phase becomes terminal. `percent` is kept as a
/// string formatted to one decimal place, matching what polling clients
/// render directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    /// Job identifier
    pub id: JobId,
    /// Source URL
    pub url: String,
    /// Requested audio quality (kbps)
    pub quality: String,
    /// Current lifecycle phase
    pub phase: JobPhase,
    /// Progress percentage, one decimal place
    pub percent: String,
    /// Bytes transferred so far
    pub downloaded_bytes: u64,
    /// Total bytes, 0 when unknown
    pub total_bytes: u64,
    /// Instantaneous transfer speed (display string)
    pub speed: String,
    /// Estimated time remaining (display string)
    pub eta: String,
    /// Artifact filename, once known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Source title, once known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Human-readable status message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Artifact size in megabytes, once known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_mb: Option<f64>,
    /// When the job was submitted
    pub created_at: DateTime<Utc>,
    /// When the record was last updated
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    /// Create a fresh record in the `Starting` phase.
    pub fn new(id: JobId, url: impl Into<String>, quality: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            url: url.into(),
            quality: quality.into(),
            phase: JobPhase::Starting,
            percent: "0".to_string(),
            downloaded_bytes: 0,
            total_bytes: 0,
            speed: "0 B/s".to_string(),
            eta: "Unknown".to_string(),
            filename: None,
            title: None,
            message: None,
            size_mb: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the record is in a terminal phase.
    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Bump the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Set the phase and bump the timestamp.
    pub fn set_phase(&mut self, phase: JobPhase) {
        self.phase = phase;
        self.touch();
    }

    /// Record the source title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
        self.touch();
    }

    /// Freeze the record as `Completed`.
    pub fn complete(
        &mut self,
        message: impl Into<String>,
        filename: impl Into<String>,
        size_mb: f64,
    ) {
        self.phase = JobPhase::Completed;
        self.percent = "100.0".to_string();
        self.message = Some(message.into());
        self.filename = Some(filename.into());
        self.size_mb = Some(size_mb);
        self.touch();
    }

    /// Freeze the record as `Exists` (artifact was already on disk).
    pub fn mark_exists(
        &mut self,
        message: impl Into<String>,
        filename: impl Into<String>,
        size_mb: f64,
    ) {
        self.phase = JobPhase::Exists;
        self.percent = "100.0".to_string();
        self.message = Some(message.into());
        self.filename = Some(filename.into());
        self.size_mb = Some(size_mb);
        self.touch();
    }

    /// Freeze the record as `Error`.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.phase = JobPhase::Error;
        self.message = Some(message.into());
        self.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_uniqueness() {
        let a = JobId::new();
        let b = JobId::new();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn test_record_creation() {
        let record = JobRecord::new(JobId::new(), "https://youtu.be/abc", "192");
        assert_eq!(record.phase, JobPhase::Starting);
        assert_eq!(record.percent, "0");
        assert!(!record.is_terminal());
    }

    #[test]
    fn test_terminal_phases() {
        assert!(JobPhase::Completed.is_terminal());
        assert!(JobPhase::Exists.is_terminal());
        assert!(JobPhase::Error.is_terminal());
        assert!(!JobPhase::Starting.is_terminal());
        assert!(!JobPhase::Downloading.is_terminal());
        assert!(!JobPhase::Converting.is_terminal());
    }

    #[test]
    fn test_record_completion() {
        let mut record = JobRecord::new(JobId::new(), "https://youtu.be/abc", "192");
        record.complete("Downloaded: song (3.2MB)", "/data/song.mp3", 3.2);

        assert_eq!(record.phase, JobPhase::Completed);
        assert_eq!(record.percent, "100.0");
        assert_eq!(record.size_mb, Some(3.2));
        assert!(record.is_terminal());
    }

    #[test]
    fn test_record_failure_keeps_message() {
        let mut record = JobRecord::new(JobId::new(), "https://youtu.be/abc", "192");
        record.fail("This video is private or requires login.");

        assert_eq!(record.phase, JobPhase::Error);
        assert_eq!(
            record.message.as_deref(),
            Some("This video is private or requires login.")
        );
    }

    #[test]
    fn test_phase_serde_round_trip() {
        let json = serde_json::to_string(&JobPhase::Downloading).unwrap();
        assert_eq!(json, "\"downloading\"");
        let phase: JobPhase = serde_json::from_str("\"exists\"").unwrap();
        assert_eq!(phase, JobPhase::Exists);
    }
}
