//! Shared data models for the tunedrop backend.
//!
//! This crate provides Serde-serializable types for:
//! - Jobs, lifecycle phases and status records
//! - Download history entries
//! - Application settings
//! - Source metadata returned by the extractor
//! - URL sanitization and filename cleaning

pub mod history;
pub mod job;
pub mod settings;
pub mod source;
pub mod utils;

// Re-export common types
pub use history::{HistoryEntry, HistoryOutcome};
pub use job::{JobId, JobPhase, JobRecord};
pub use settings::AppSettings;
pub use source::SourceMetadata;
pub use utils::{bytes_to_mb, clean_filename, sanitize_url, UrlError, UrlResult};
