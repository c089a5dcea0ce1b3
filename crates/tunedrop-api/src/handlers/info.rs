//! Source metadata check handler.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use tunedrop_media::{fetch_metadata, MediaError};
use tunedrop_models::{sanitize_url, SourceMetadata};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Duration above which a soft warning is attached (seconds).
const LARGE_SOURCE_SECS: u64 = 600;

/// Check request.
#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub url: String,
}

/// Check response.
#[derive(Serialize)]
pub struct CheckResponse {
    pub info: SourceInfo,
}

/// Probed source details, plus a soft warning when the source is large
/// or over the configured duration cap.
#[derive(Serialize)]
pub struct SourceInfo {
    pub title: String,
    pub duration: String,
    pub duration_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploader: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub like_count: Option<u64>,
    pub is_live: bool,
    pub age_limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// POST /api/check
///
/// Validate a URL and probe its metadata without starting a job.
pub async fn check_source(
    State(state): State<AppState>,
    Json(request): Json<CheckRequest>,
) -> ApiResult<Json<CheckResponse>> {
    let url = sanitize_url(&request.url).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let metadata = fetch_metadata(&url).await.map_err(probe_error)?;
    let settings = state.settings.load().await;

    let duration_seconds = metadata.duration_secs();
    let warning = if duration_seconds > settings.max_duration_secs {
        Some(format!(
            "Video is longer than the {} minute limit",
            settings.max_duration_secs / 60
        ))
    } else if duration_seconds > LARGE_SOURCE_SECS {
        Some("Large video, download may take longer".to_string())
    } else {
        None
    };

    Ok(Json(CheckResponse {
        info: build_info(&metadata, duration_seconds, warning),
    }))
}

fn build_info(metadata: &SourceMetadata, duration_seconds: u64, warning: Option<String>) -> SourceInfo {
    SourceInfo {
        title: metadata.title.clone(),
        duration: metadata.duration_display(),
        duration_seconds,
        uploader: metadata.uploader.clone(),
        thumbnail: metadata.thumbnail.clone(),
        view_count: metadata.view_count,
        like_count: metadata.like_count,
        is_live: metadata.live(),
        age_limit: metadata.age_limit.unwrap_or(0),
        warning,
    }
}

/// Map probe failures to client-facing errors.
fn probe_error(err: MediaError) -> ApiError {
    match err {
        MediaError::DownloadFailed { kind, message } => ApiError::bad_request(
            kind.user_message()
                .map(str::to_string)
                .unwrap_or(message),
        ),
        MediaError::ProbeFailed { message } => ApiError::bad_request(message),
        other => ApiError::Media(other),
    }
}
