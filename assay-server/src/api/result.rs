//! Result API Handlers
//!
//! HTTP endpoints for the submission and polling lifecycle: submit a
//! test, poll its result record, fetch its processing logs.

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
};
use uuid::Uuid;

use assay_core::domain::result::TestResult;
use assay_core::dto::result::{ResultView, SubmitAccepted};

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::api::principal::Principal;
use crate::config::{ERROR_LOG, OUTPUT_LOG};
use crate::repository::result_repository;
use crate::service::submission_service;

/// POST /tests/{test_id}/results
/// Submit input data for a test; processing continues out of band
pub async fn submit_result(
    State(state): State<AppState>,
    Path(test_id): Path<String>,
    principal: Principal,
    Json(fields): Json<serde_json::Map<String, serde_json::Value>>,
) -> ApiResult<(StatusCode, Json<SubmitAccepted>)> {
    tracing::info!("Submission for test: {}", test_id);

    let spec = state
        .registry
        .get(&test_id)
        .ok_or_else(|| ApiError::NotFound(format!("Test {} not found", test_id)))?;

    let result = submission_service::submit(
        &state.pool,
        &state.config,
        spec,
        principal.user_id,
        fields,
    )
    .await
    .map_err(|e| match e {
        submission_service::SubmitError::MissingInput(field) => {
            ApiError::BadRequest(format!("Required field '{}' is missing", field))
        }
        submission_service::SubmitError::NotConfigured(id) => {
            ApiError::InternalError(format!("Test {} is improperly configured", id))
        }
        submission_service::SubmitError::Io(err) => {
            ApiError::InternalError(format!("Could not write submission artifacts: {}", err))
        }
        submission_service::SubmitError::DatabaseError(err) => ApiError::DatabaseError(err),
    })?;

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitAccepted {
            result_id: result.id,
        }),
    ))
}

/// GET /results/{id}
/// Poll a result record; terminal state and data show up here
pub async fn get_result(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ResultView>> {
    tracing::debug!("Getting result: {}", id);

    let result = find_result(&state, id).await?;
    Ok(Json(result.into()))
}

/// GET /results/{id}/log
/// Raw stdout captured from the processing program
pub async fn get_log(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _principal: Principal,
) -> ApiResult<([(header::HeaderName, &'static str); 1], Vec<u8>)> {
    read_log_artifact(&state, id, OUTPUT_LOG).await
}

/// GET /results/{id}/error_log
/// Raw stderr captured from the processing program, if any was produced
pub async fn get_error_log(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _principal: Principal,
) -> ApiResult<([(header::HeaderName, &'static str); 1], Vec<u8>)> {
    read_log_artifact(&state, id, ERROR_LOG).await
}

async fn find_result(state: &AppState, id: Uuid) -> ApiResult<TestResult> {
    result_repository::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Result {} not found", id)))
}

async fn read_log_artifact(
    state: &AppState,
    id: Uuid,
    log_name: &str,
) -> ApiResult<([(header::HeaderName, &'static str); 1], Vec<u8>)> {
    tracing::debug!("Getting {} for result: {}", log_name, id);

    let result = find_result(state, id).await?;
    let log_path = std::path::Path::new(&result.directory).join(log_name);

    let bytes = tokio::fs::read(&log_path)
        .await
        .map_err(|_| ApiError::NotFound(format!("Log for result {} not found", id)))?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        bytes,
    ))
}
