//! Settings handlers.

use axum::extract::State;
use axum::Json;

use tunedrop_models::AppSettings;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /api/settings
pub async fn get_settings(State(state): State<AppState>) -> ApiResult<Json<AppSettings>> {
    Ok(Json(state.settings.load().await))
}

/// PUT /api/settings
///
/// Replace the persisted settings. Omitted fields fall back to their
/// in-code defaults. The admission capacity is applied on next restart.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(settings): Json<AppSettings>,
) -> ApiResult<Json<AppSettings>> {
    if settings.audio_quality.is_empty()
        || !settings.audio_quality.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ApiError::bad_request("Invalid audio quality"));
    }

    state.settings.save(&settings).await?;
    Ok(Json(settings))
}
