//! Durable collaborators for the tunedrop backend.
//!
//! This crate owns everything the core job machinery merely consults:
//! - the JSON settings store with in-code defaults
//! - the bounded JSON history log
//! - download-library filesystem operations (listing, stats, cleanup)

pub mod error;
pub mod history;
pub mod library;
pub mod settings;

pub use error::{StoreError, StoreResult};
pub use history::{HistoryLog, HISTORY_LIMIT};
pub use library::{AudioFile, LibraryStats};
pub use settings::SettingsStore;
