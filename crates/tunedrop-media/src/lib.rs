//! yt-dlp/FFmpeg CLI wrapper for audio extraction.
//!
//! This crate drives the external tools as child processes:
//! - metadata-only probes (`yt-dlp --dump-json`)
//! - audio download + MP3 transcode with line-parsed progress events
//! - structured classification of extractor failures
//! - filesystem probes (artifact location, free disk space)

pub mod artifact;
pub mod disk;
pub mod download;
pub mod error;
pub mod probe;
pub mod progress;
pub mod tools;

pub use artifact::{locate_artifact, Artifact};
pub use disk::free_space_mb;
pub use download::{download_audio, AudioRequest};
pub use error::{classify_failure, DownloadErrorKind, MediaError, MediaResult};
pub use probe::fetch_metadata;
pub use progress::DownloadEvent;
pub use tools::{check_ffmpeg, check_ytdlp};
