//! URL sanitization and filename cleaning.
//!
//! Shared helpers used by the API handlers and the worker. URL parsing is
//! done by hand rather than with a regex so the accepted shapes stay
//! explicit and easy to extend.

use thiserror::Error;

/// Errors that can occur during URL sanitization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("No URL provided")]
    Empty,
    #[error("Not a supported video URL")]
    Unsupported,
}

/// Result type for URL sanitization.
pub type UrlResult<T> = Result<T, UrlError>;

/// Sanitize and validate a source URL.
///
/// Strips tracking parameters (`&t=...s`, `&feature=share`) and accepts:
/// - `https://youtube.com/watch?v=VIDEO_ID`
/// - `https://youtu.be/VIDEO_ID`
/// - `https://youtube.com/playlist?list=LIST_ID`
/// - `https://youtube.com/shorts/VIDEO_ID`
///
/// all with an optional `www.` prefix and either scheme.
pub fn sanitize_url(raw: &str) -> UrlResult<String> {
    let url = raw.trim();
    if url.is_empty() {
        return Err(UrlError::Empty);
    }

    let url = strip_tracking_params(url);

    if is_supported_source(&url) {
        Ok(url)
    } else {
        Err(UrlError::Unsupported)
    }
}

/// Remove known tracking query parameters.
fn strip_tracking_params(url: &str) -> String {
    let mut out = url.replace("&feature=share", "");

    // Drop "&t=123s" timestamp parameters
    while let Some(pos) = out.find("&t=") {
        let rest = &out[pos + 3..];
        let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
        if digits > 0 && rest[digits..].starts_with('s') {
            let end = pos + 3 + digits + 1;
            out.replace_range(pos..end, "");
        } else {
            break;
        }
    }

    out
}

/// Check whether a URL points at a supported source shape.
fn is_supported_source(url: &str) -> bool {
    let rest = match strip_scheme(url) {
        Some(r) => r,
        None => return false,
    };
    let rest = rest.strip_prefix("www.").unwrap_or(rest);

    if let Some(path) = rest.strip_prefix("youtube.com/watch?v=") {
        return has_id(path);
    }
    if let Some(path) = rest.strip_prefix("youtu.be/") {
        return has_id(path);
    }
    if let Some(path) = rest.strip_prefix("youtube.com/playlist?list=") {
        return has_id(path);
    }
    if let Some(path) = rest.strip_prefix("youtube.com/shorts/") {
        return has_id(path);
    }

    false
}

fn strip_scheme(url: &str) -> Option<&str> {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
}

/// At least one leading identifier character.
fn has_id(segment: &str) -> bool {
    segment
        .chars()
        .next()
        .map(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        .unwrap_or(false)
}

/// Maximum filename length in characters, extension included.
const MAX_FILENAME_CHARS: usize = 100;

/// Stem length kept when truncating an over-long name.
const TRUNCATED_STEM_CHARS: usize = 95;

/// Clean a title into a filesystem-safe filename.
///
/// Strips characters illegal in filenames and control characters,
/// collapses whitespace runs, and truncates over-long names while
/// preserving the extension.
pub fn clean_filename(name: &str) -> String {
    let stripped: String = name
        .chars()
        .filter(|c| {
            !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') && !c.is_control()
        })
        .collect();

    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= MAX_FILENAME_CHARS {
        return collapsed;
    }

    match collapsed.rfind('.') {
        Some(dot) if dot > 0 => {
            let (stem, ext) = collapsed.split_at(dot);
            let truncated: String = stem.chars().take(TRUNCATED_STEM_CHARS).collect();
            format!("{}{}", truncated, ext)
        }
        _ => collapsed.chars().take(MAX_FILENAME_CHARS).collect(),
    }
}

/// Convert a byte count to megabytes.
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}
