//! Source metadata returned by the extractor's metadata-only probe.

use serde::{Deserialize, Serialize};

/// Subset of the extractor's JSON dump the service cares about.
///
/// Every field is optional in the wire format; the probe output for an
/// upcoming live stream, for example, carries `"duration": null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// Source title
    #[serde(default)]
    pub title: String,
    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    /// Channel / uploader name
    #[serde(default)]
    pub uploader: Option<String>,
    /// Thumbnail URL
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// View count
    #[serde(default)]
    pub view_count: Option<u64>,
    /// Like count
    #[serde(default)]
    pub like_count: Option<u64>,
    /// Whether the source is currently live
    #[serde(default)]
    pub is_live: Option<bool>,
    /// Age restriction level, 0 when unrestricted
    #[serde(default)]
    pub age_limit: Option<u32>,
}

impl SourceMetadata {
    /// Duration rounded down to whole seconds, 0 when unknown.
    pub fn duration_secs(&self) -> u64 {
        self.duration.map(|d| d.max(0.0) as u64).unwrap_or(0)
    }

    /// Duration formatted as "M:SS", or "Unknown".
    pub fn duration_display(&self) -> String {
        match self.duration {
            Some(d) if d > 0.0 => {
                let secs = d as u64;
                format!("{}:{:02}", secs / 60, secs % 60)
            }
            _ => "Unknown".to_string(),
        }
    }

    /// Whether the source is a live broadcast.
    pub fn live(&self) -> bool {
        self.is_live.unwrap_or(false)
    }

    /// Whether the source carries any age restriction.
    pub fn age_restricted(&self) -> bool {
        self.age_limit.unwrap_or(0) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_probe_output() {
        let json = r#"{
            "title": "Test Video",
            "duration": 212.5,
            "uploader": "Test Channel",
            "thumbnail": "https://i.ytimg.com/vi/abc/hq720.jpg",
            "view_count": 1000,
            "is_live": false,
            "age_limit": 0,
            "formats": [{"format_id": "251"}]
        }"#;

        let meta: SourceMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta.title, "Test Video");
        assert_eq!(meta.duration_secs(), 212);
        assert_eq!(meta.duration_display(), "3:32");
        assert!(!meta.live());
        assert!(!meta.age_restricted());
    }

    #[test]
    fn test_null_fields_tolerated() {
        let json = r#"{"title": "Upcoming", "duration": null, "is_live": null}"#;
        let meta: SourceMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta.duration_secs(), 0);
        assert_eq!(meta.duration_display(), "Unknown");
        assert!(!meta.live());
    }

    #[test]
    fn test_age_restriction() {
        let json = r#"{"title": "Gated", "age_limit": 18}"#;
        let meta: SourceMetadata = serde_json::from_str(json).unwrap();
        assert!(meta.age_restricted());
    }
}
