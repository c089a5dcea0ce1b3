//! Axum HTTP API server.
//!
//! This crate provides:
//! - The job registry, admission control and progress reporter
//! - The extraction/conversion worker
//! - REST endpoints for submission, polling and artifact retrieval
//! - Prometheus metrics

pub mod admission;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod registry;
pub mod reporter;
pub mod routes;
pub mod state;
pub mod worker;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
