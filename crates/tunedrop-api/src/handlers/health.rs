//! Health check handler.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use tunedrop_media::{check_ffmpeg, check_ytdlp, free_space_mb};

use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
    pub ffmpeg_available: bool,
    pub ytdlp_available: bool,
    pub download_dir_exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_space_mb: Option<u64>,
}

/// Health check endpoint (liveness probe).
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let download_dir = &state.config.download_dir;

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
        ffmpeg_available: check_ffmpeg().is_ok(),
        ytdlp_available: check_ytdlp().is_ok(),
        download_dir_exists: download_dir.exists(),
        free_space_mb: free_space_mb(download_dir).ok(),
    })
}
