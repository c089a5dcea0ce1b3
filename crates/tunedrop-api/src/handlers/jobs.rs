//! Job submission, progress polling and artifact retrieval.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::info;

use tunedrop_models::{sanitize_url, JobId, JobPhase, JobRecord};

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;
use crate::worker::{run_job, WorkerContext};

/// Download request.
#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub url: String,
    /// Audio quality in kbps; the settings default applies when omitted
    #[serde(default)]
    pub quality: Option<String>,
}

/// Download response: the identifier plus the two follow-up paths.
#[derive(Serialize)]
pub struct DownloadResponse {
    pub job_id: String,
    pub progress_url: String,
    pub artifact_url: String,
}

/// POST /api/download
///
/// Validate the URL, claim an admission slot and spawn the worker.
///
/// Returns:
/// - 202: job started, poll `progress_url`
/// - 400: invalid URL or quality
/// - 429: capacity reached, retry after the active job finishes
pub async fn submit_download(
    State(state): State<AppState>,
    Json(request): Json<DownloadRequest>,
) -> ApiResult<(StatusCode, Json<DownloadResponse>)> {
    let url = sanitize_url(&request.url).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let settings = state.settings.load().await;
    let quality = match request.quality {
        Some(q) => {
            if q.is_empty() || !q.chars().all(|c| c.is_ascii_digit()) {
                return Err(ApiError::bad_request("Invalid quality parameter"));
            }
            q
        }
        None => settings.audio_quality.clone(),
    };

    let permit = state.admission.try_acquire().ok_or_else(|| {
        metrics::record_submission_rejected();
        ApiError::busy("Please wait for the current download to complete")
    })?;

    let id = state.registry.create(&url, &quality).await;
    info!(job_id = %id, url = %url, quality = %quality, "Job submitted");

    let ctx = WorkerContext {
        registry: Arc::clone(&state.registry),
        history: Arc::clone(&state.history),
        settings,
        download_dir: state.config.download_dir.clone(),
    };
    tokio::spawn(run_job(ctx, id.clone(), url, quality, permit));

    Ok((
        StatusCode::ACCEPTED,
        Json(DownloadResponse {
            progress_url: format!("/api/progress/{id}"),
            artifact_url: format!("/api/artifact/{id}"),
            job_id: id.to_string(),
        }),
    ))
}

/// GET /api/progress/:id
///
/// Snapshot of the current status record.
pub async fn get_progress(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<JobRecord>> {
    let record = state
        .registry
        .get(&JobId::from_string(id))
        .await
        .ok_or_else(|| ApiError::not_found("Download not found or expired"))?;

    Ok(Json(record))
}

/// GET /api/artifact/:id
///
/// Stream the produced file as an attachment once the job is terminal
/// with an artifact (`completed` or `exists`).
pub async fn fetch_artifact(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let record = state
        .registry
        .get(&JobId::from_string(id))
        .await
        .ok_or_else(|| ApiError::not_found("Download not found or expired"))?;

    if !matches!(record.phase, JobPhase::Completed | JobPhase::Exists) {
        return Err(ApiError::not_found("Artifact not ready"));
    }

    let path = record
        .filename
        .map(PathBuf::from)
        .ok_or_else(|| ApiError::not_found("Artifact not recorded"))?;

    let file = File::open(&path)
        .await
        .map_err(|_| ApiError::not_found("File not found"))?;
    let length = file
        .metadata()
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .len();

    let download_name = attachment_name(&path);
    let body = Body::from_stream(ReaderStream::new(file));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "audio/mpeg")
        .header(header::CONTENT_LENGTH, length)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{download_name}\""),
        )
        .body(body)
        .map_err(|e| ApiError::internal(e.to_string()))
}

/// Filename for the Content-Disposition header, with quote-breaking
/// characters removed.
fn attachment_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "audio.mp3".to_string())
        .chars()
        .filter(|c| *c != '"' && *c != '\\' && !c.is_control())
        .collect()
}
