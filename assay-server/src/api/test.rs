//! Test Spec API Handlers
//!
//! HTTP endpoints for browsing and reloading test specifications.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use assay_core::dto::test::TestSummary;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::api::principal::Principal;

/// GET /tests
/// List all loaded test specs (processing details excluded)
pub async fn list_tests(State(state): State<AppState>) -> Json<Vec<TestSummary>> {
    tracing::debug!("Listing tests");

    let summaries = state
        .registry
        .list()
        .iter()
        .map(|spec| TestSummary::from(spec.as_ref()))
        .collect();

    Json(summaries)
}

/// GET /tests/{id}
/// Get one test spec summary
pub async fn get_test(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<TestSummary>> {
    tracing::debug!("Getting test: {}", id);

    let spec = state
        .registry
        .get(&id)
        .ok_or_else(|| ApiError::NotFound(format!("Test {} not found", id)))?;

    Ok(Json(TestSummary::from(spec.as_ref())))
}

/// POST /tests/reload
/// Administrative reload of the spec registry
pub async fn reload_tests(
    State(state): State<AppState>,
    _principal: Principal,
) -> Json<ReloadResponse> {
    tracing::info!("Reloading test specs");

    let loaded = state
        .registry
        .load(&state.config.tests_dir, &state.config.test_config_name);

    tracing::info!("Loaded {} test spec(s)", loaded);

    Json(ReloadResponse { loaded })
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub loaded: usize,
}
