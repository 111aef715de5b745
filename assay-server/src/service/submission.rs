//! Submission Service
//!
//! Orchestrates one accepted submission: validate the fields against
//! the spec, lay out the job directory, write the input artifact,
//! create the durable `raw` record, and hand off to the job runner.
//! Everything up to the hand-off fails the request synchronously;
//! after it, outcomes are only visible through the record's state.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use assay_core::domain::result::TestResult;
use assay_core::domain::test::{InputKind, TestSpec};

use crate::config::{Config, INPUT_FILE, OUTPUT_FILE};
use crate::repository::result_repository;
use crate::runner;

/// Service error type
#[derive(Debug)]
pub enum SubmitError {
    /// A required input field is absent (client error)
    MissingInput(String),
    /// The spec declares no processing command (server-side config error)
    NotConfigured(String),
    /// Job directory or input artifact could not be written
    Io(std::io::Error),
    /// Result store unreachable; not retried
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for SubmitError {
    fn from(err: sqlx::Error) -> Self {
        SubmitError::DatabaseError(err)
    }
}

impl From<std::io::Error> for SubmitError {
    fn from(err: std::io::Error) -> Self {
        SubmitError::Io(err)
    }
}

/// Accepts one submission and launches its processing.
///
/// Returns as soon as the `raw` record is durable and the runner task
/// is spawned; the caller should answer 202 and let the client poll.
pub async fn submit(
    pool: &PgPool,
    config: &Config,
    spec: Arc<TestSpec>,
    owner: Uuid,
    fields: serde_json::Map<String, serde_json::Value>,
) -> Result<TestResult, SubmitError> {
    spec.validate_submission(&fields)
        .map_err(|err| SubmitError::MissingInput(err.0))?;

    // Rejecting an unrunnable spec here keeps the failure synchronous;
    // the runner re-checks defensively after hand-off
    if spec.command().is_none() {
        return Err(SubmitError::NotConfigured(spec.id.clone()));
    }

    let result_id = Uuid::new_v4();

    // Job artifacts live under <results_dir>/<test_id>/<result_id>/
    let job_dir = config.results_dir.join(&spec.id).join(result_id.to_string());
    tokio::fs::create_dir_all(&job_dir).await?;

    let input_doc = build_input_document(&spec, result_id, owner, &fields);
    tokio::fs::write(
        job_dir.join(INPUT_FILE),
        serde_json::to_vec(&input_doc).expect("input document serializes"),
    )
    .await?;

    let result = result_repository::create(
        pool,
        result_repository::NewResult {
            id: result_id,
            owner,
            test_id: spec.id.clone(),
            directory: job_dir.to_string_lossy().into_owned(),
            input_file: INPUT_FILE.to_string(),
            output_file: OUTPUT_FILE.to_string(),
        },
    )
    .await?;

    info!("Result {} created for test: {}", result.id, spec.id);

    runner::spawn(pool.clone(), result.clone(), spec);

    Ok(result)
}

/// Builds the JSON document handed to the processing program.
///
/// Carries the submitted values plus submission metadata (underscore
/// keys). File-kind inputs record their artifact filename; the upload
/// payload itself is persisted by the upstream request layer.
fn build_input_document(
    spec: &TestSpec,
    result_id: Uuid,
    owner: Uuid,
    fields: &serde_json::Map<String, serde_json::Value>,
) -> serde_json::Map<String, serde_json::Value> {
    let mut doc = serde_json::Map::new();
    doc.insert(
        "_fields".to_string(),
        serde_json::to_value(&spec.inputs).expect("input specs serialize"),
    );
    doc.insert("_test_id".to_string(), spec.id.clone().into());
    doc.insert("_user_id".to_string(), owner.to_string().into());
    doc.insert("_result_id".to_string(), result_id.to_string().into());
    doc.insert(
        "_created".to_string(),
        chrono::Utc::now().to_rfc3339().into(),
    );
    doc.insert("_output_file".to_string(), OUTPUT_FILE.into());

    for (name, input) in &spec.inputs {
        let Some(value) = fields.get(name) else {
            continue;
        };
        match input.kind {
            InputKind::File => {
                let filename = input
                    .filename
                    .clone()
                    .unwrap_or_else(|| format!("{name}.dat"));
                doc.insert(name.clone(), filename.into());
            }
            InputKind::Value => {
                doc.insert(name.clone(), value.clone());
            }
        }
    }

    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec() -> TestSpec {
        serde_json::from_value(json!({
            "id": "echo-test",
            "name": "Echo",
            "inputs": {
                "name": {"type": "value"},
                "recording": {"type": "file", "required": false, "filename": "sample.wav"}
            },
            "outputs": {"greeting": ""},
            "processing": {"call": ["echo_prog"]}
        }))
        .unwrap()
    }

    #[test]
    fn test_input_document_carries_values_and_metadata() {
        let spec = spec();
        let result_id = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let fields = json!({"name": "Ada"});

        let doc = build_input_document(&spec, result_id, owner, fields.as_object().unwrap());

        assert_eq!(doc.get("name").unwrap(), "Ada");
        assert_eq!(doc.get("_test_id").unwrap(), "echo-test");
        assert_eq!(doc.get("_result_id").unwrap(), &json!(result_id.to_string()));
        assert_eq!(doc.get("_output_file").unwrap(), OUTPUT_FILE);
        assert!(doc.get("_fields").unwrap().is_object());
    }

    #[test]
    fn test_file_inputs_record_their_artifact_name() {
        let spec = spec();
        let fields = json!({"name": "Ada", "recording": "ignored-upload-token"});

        let doc = build_input_document(
            &spec,
            Uuid::new_v4(),
            Uuid::new_v4(),
            fields.as_object().unwrap(),
        );

        assert_eq!(doc.get("recording").unwrap(), "sample.wav");
    }

    #[test]
    fn test_absent_optional_inputs_are_omitted() {
        let spec = spec();
        let fields = json!({"name": "Ada"});

        let doc = build_input_document(
            &spec,
            Uuid::new_v4(),
            Uuid::new_v4(),
            fields.as_object().unwrap(),
        );

        assert!(doc.get("recording").is_none());
    }
}
