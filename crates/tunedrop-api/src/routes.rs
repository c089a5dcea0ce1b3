//! API routes.

use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::health::health;
use crate::handlers::history::{clear_history, get_history};
use crate::handlers::info::check_source;
use crate::handlers::jobs::{fetch_artifact, get_progress, submit_download};
use crate::handlers::library::{delete_library_file, get_stats, list_files, run_cleanup};
use crate::handlers::settings::{get_settings, update_settings};
use crate::middleware::{cors_layer, request_logging};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let api_routes = Router::new()
        .route("/check", post(check_source))
        .route("/download", post(submit_download))
        .route("/progress/:id", get(get_progress))
        .route("/artifact/:id", get(fetch_artifact))
        .route("/files", get(list_files))
        .route("/files/:name", delete(delete_library_file))
        .route("/stats", get(get_stats))
        .route("/cleanup", post(run_cleanup))
        .route("/history", get(get_history).delete(clear_history))
        .route("/settings", get(get_settings).put(update_settings));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
