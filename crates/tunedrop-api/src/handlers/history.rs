//! History handlers.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use tunedrop_models::HistoryEntry;

use crate::error::ApiResult;
use crate::state::AppState;

/// Entries returned by the listing endpoint.
const HISTORY_PAGE: usize = 20;

/// History listing response.
#[derive(Serialize)]
pub struct HistoryResponse {
    /// Most recent entries first
    pub history: Vec<HistoryEntry>,
    /// Total entries stored
    pub total: usize,
}

/// GET /api/history
pub async fn get_history(State(state): State<AppState>) -> ApiResult<Json<HistoryResponse>> {
    let total = state.history.len().await;
    let history = state.history.recent(HISTORY_PAGE).await;

    Ok(Json(HistoryResponse { history, total }))
}

/// Clear response.
#[derive(Serialize)]
pub struct ClearHistoryResponse {
    pub cleared: bool,
}

/// DELETE /api/history
pub async fn clear_history(State(state): State<AppState>) -> ApiResult<Json<ClearHistoryResponse>> {
    state.history.clear().await?;
    Ok(Json(ClearHistoryResponse { cleared: true }))
}
