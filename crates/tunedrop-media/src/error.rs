//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while driving the external tools.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("yt-dlp not found in PATH")]
    YtDlpNotFound,

    #[error("Metadata probe failed: {message}")]
    ProbeFailed { message: String },

    #[error("Download failed: {message}")]
    DownloadFailed {
        kind: DownloadErrorKind,
        message: String,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Disk probe failed: {0}")]
    DiskProbe(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    /// Create a probe failure error.
    pub fn probe_failed(message: impl Into<String>) -> Self {
        Self::ProbeFailed {
            message: message.into(),
        }
    }

    /// Create a download failure, classifying the tool's stderr.
    pub fn download_failed(stderr: &str) -> Self {
        let kind = classify_failure(stderr);
        let message = stderr.lines().last().unwrap_or("Unknown error").to_string();
        Self::DownloadFailed { kind, message }
    }
}

/// Structured classification of an extractor failure.
///
/// Replaces ad hoc substring checks at call sites: the pattern rules live
/// in [`classify_failure`] and nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadErrorKind {
    /// Private or login-required source
    Private,
    /// Removed or region-locked source
    Unavailable,
    /// Age-verification gate
    AgeRestricted,
    /// Remote side throttled us
    RateLimited,
    /// Anything else
    Other,
}

impl DownloadErrorKind {
    /// User-facing phrase for the known kinds.
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            DownloadErrorKind::Private => Some("This video is private or requires login."),
            DownloadErrorKind::Unavailable => {
                Some("This video is unavailable in your country or has been removed.")
            }
            DownloadErrorKind::AgeRestricted => Some("This video requires age verification."),
            DownloadErrorKind::RateLimited => Some("Too many requests. Please wait a few minutes."),
            DownloadErrorKind::Other => None,
        }
    }
}

/// Pattern rules mapping extractor output to a [`DownloadErrorKind`].
const FAILURE_PATTERNS: &[(&str, DownloadErrorKind)] = &[
    ("Private video", DownloadErrorKind::Private),
    ("Video unavailable", DownloadErrorKind::Unavailable),
    ("Sign in to confirm your age", DownloadErrorKind::AgeRestricted),
    ("age-restricted", DownloadErrorKind::AgeRestricted),
    ("429", DownloadErrorKind::RateLimited),
    ("Too Many Requests", DownloadErrorKind::RateLimited),
    ("rate limit", DownloadErrorKind::RateLimited),
];

/// Classify an extractor failure from its stderr output.
pub fn classify_failure(stderr: &str) -> DownloadErrorKind {
    let lowered = stderr.to_ascii_lowercase();
    for (pattern, kind) in FAILURE_PATTERNS {
        if lowered.contains(&pattern.to_ascii_lowercase()) {
            return *kind;
        }
    }
    DownloadErrorKind::Other
}
