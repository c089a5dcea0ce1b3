//! Download-library handlers: listing, stats, cleanup, deletion.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use tunedrop_media::{check_ffmpeg, check_ytdlp, free_space_mb};
use tunedrop_store::{library, AudioFile};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// File listing response.
#[derive(Serialize)]
pub struct FilesResponse {
    pub files: Vec<AudioFile>,
    pub count: usize,
    pub total_size_mb: f64,
}

/// GET /api/files
pub async fn list_files(State(state): State<AppState>) -> ApiResult<Json<FilesResponse>> {
    let files = library::list_audio_files(&state.config.download_dir).await?;
    let total_size_mb = files.iter().map(|f| f.size_mb).sum();

    Ok(Json(FilesResponse {
        count: files.len(),
        total_size_mb,
        files,
    }))
}

/// Stats response.
#[derive(Serialize)]
pub struct StatsResponse {
    pub total_downloads: usize,
    pub total_size_mb: f64,
    pub download_dir: String,
    pub ffmpeg_available: bool,
    pub ytdlp_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_space_mb: Option<u64>,
}

/// GET /api/stats
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Json<StatsResponse>> {
    let stats = library::stats(&state.config.download_dir).await?;

    Ok(Json(StatsResponse {
        total_downloads: stats.total_files,
        total_size_mb: stats.total_size_mb,
        download_dir: state.config.download_dir.display().to_string(),
        ffmpeg_available: check_ffmpeg().is_ok(),
        ytdlp_available: check_ytdlp().is_ok(),
        free_space_mb: free_space_mb(&state.config.download_dir).ok(),
    }))
}

/// Cleanup response.
#[derive(Serialize)]
pub struct CleanupResponse {
    pub removed_partials: usize,
    pub removed_aged: usize,
}

/// POST /api/cleanup
///
/// Drop leftover partial-transfer files and artifacts older than the
/// configured cleanup age.
pub async fn run_cleanup(State(state): State<AppState>) -> ApiResult<Json<CleanupResponse>> {
    let dir = &state.config.download_dir;
    let settings = state.settings.load().await;

    let removed_partials = library::remove_partials(dir).await?;
    let removed_aged = library::remove_aged(dir, settings.auto_cleanup_days).await?;

    Ok(Json(CleanupResponse {
        removed_partials,
        removed_aged,
    }))
}

/// Deletion response.
#[derive(Serialize)]
pub struct DeleteResponse {
    pub deleted: String,
}

/// DELETE /api/files/:name
pub async fn delete_library_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let deleted = library::delete_file(&state.config.download_dir, &name).await?;
    if !deleted {
        return Err(ApiError::not_found("File not found"));
    }

    Ok(Json(DeleteResponse { deleted: name }))
}
