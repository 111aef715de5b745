//! API Module
//!
//! HTTP API layer for the server.
//! Each submodule handles endpoints for a specific domain.

pub mod error;
pub mod health;
pub mod principal;
pub mod result;
pub mod test;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::registry::TestRegistry;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub registry: Arc<TestRegistry>,
    pub config: Arc<Config>,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Test spec endpoints
        .route("/tests", get(test::list_tests))
        .route("/tests/reload", post(test::reload_tests))
        .route("/tests/{id}", get(test::get_test))
        // Submission and result endpoints
        .route("/tests/{test_id}/results", post(result::submit_result))
        .route("/results/{id}", get(result::get_result))
        .route("/results/{id}/log", get(result::get_log))
        .route("/results/{id}/error_log", get(result::get_error_log))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
