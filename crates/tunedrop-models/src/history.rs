//! Download history entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome recorded for a finished job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryOutcome {
    Success,
    Failed,
}

impl HistoryOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryOutcome::Success => "success",
            HistoryOutcome::Failed => "failed",
        }
    }
}

/// One append-only history record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// When the job finished
    pub timestamp: DateTime<Utc>,
    /// Source URL
    pub url: String,
    /// Source title (may be empty when the probe never completed)
    pub title: String,
    /// Artifact filename (empty on failure)
    pub filename: String,
    /// Artifact size in megabytes (0 on failure)
    pub size_mb: f64,
    /// Outcome of the job
    pub outcome: HistoryOutcome,
}

impl HistoryEntry {
    /// Record a successful job.
    pub fn success(
        url: impl Into<String>,
        title: impl Into<String>,
        filename: impl Into<String>,
        size_mb: f64,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            url: url.into(),
            title: title.into(),
            filename: filename.into(),
            size_mb,
            outcome: HistoryOutcome::Success,
        }
    }

    /// Record a failed job. Title may be empty if it was never learned.
    pub fn failed(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            url: url.into(),
            title: title.into(),
            filename: String::new(),
            size_mb: 0.0,
            outcome: HistoryOutcome::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_entry() {
        let entry = HistoryEntry::success("https://youtu.be/abc", "Song", "Song.mp3", 4.2);
        assert_eq!(entry.outcome, HistoryOutcome::Success);
        assert_eq!(entry.filename, "Song.mp3");
    }

    #[test]
    fn test_failed_entry_has_empty_artifact() {
        let entry = HistoryEntry::failed("https://youtu.be/abc", "");
        assert_eq!(entry.outcome, HistoryOutcome::Failed);
        assert!(entry.filename.is_empty());
        assert_eq!(entry.size_mb, 0.0);
    }

    #[test]
    fn test_outcome_serde() {
        let json = serde_json::to_string(&HistoryOutcome::Failed).unwrap();
        assert_eq!(json, "\"failed\"");
    }
}
