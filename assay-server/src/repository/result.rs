//! Result Repository
//!
//! Handles all database operations for result records. Every operation
//! reads or updates a single row; no multi-record transactions. The
//! terminal-state updates are plain last-write-wins UPDATEs with no
//! double-completion guard.

use assay_core::domain::result::{ResultState, TestResult};
use sqlx::PgPool;
use uuid::Uuid;

/// Fields required to create a new result record
///
/// The id is allocated by the caller before the record exists because
/// the job's artifact directory is named after it.
#[derive(Debug, Clone)]
pub struct NewResult {
    pub id: Uuid,
    pub owner: Uuid,
    pub test_id: String,
    pub directory: String,
    pub input_file: String,
    pub output_file: String,
}

/// Create a new result record in state `raw`
///
/// Store errors propagate to the caller; creation is not retried.
pub async fn create(pool: &PgPool, req: NewResult) -> Result<TestResult, sqlx::Error> {
    let now = chrono::Utc::now();

    let result = TestResult {
        id: req.id,
        state: ResultState::Raw,
        created: now,
        processed: None,
        owner: req.owner,
        test_id: req.test_id.clone(),
        directory: req.directory.clone(),
        input_file: req.input_file.clone(),
        output_file: req.output_file.clone(),
        data: None,
    };

    sqlx::query(
        r#"
        INSERT INTO results (id, test_id, owner, state, created, directory, input_file, output_file)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(req.id)
    .bind(&req.test_id)
    .bind(req.owner)
    .bind(ResultState::Raw.as_str())
    .bind(now)
    .bind(&req.directory)
    .bind(&req.input_file)
    .bind(&req.output_file)
    .execute(pool)
    .await?;

    Ok(result)
}

/// Find a result by ID
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<TestResult>, sqlx::Error> {
    let row = sqlx::query_as::<_, ResultRow>(
        r#"
        SELECT id, test_id, owner, state, created, processed,
               directory, input_file, output_file, data
        FROM results
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// Mark a result processed with its filtered output data
pub async fn mark_processed(
    pool: &PgPool,
    id: Uuid,
    data: serde_json::Map<String, serde_json::Value>,
) -> Result<(), sqlx::Error> {
    let now = chrono::Utc::now();

    sqlx::query(
        r#"
        UPDATE results
        SET state = $1, processed = $2, data = $3
        WHERE id = $4
        "#,
    )
    .bind(ResultState::Processed.as_str())
    .bind(now)
    .bind(serde_json::Value::Object(data))
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Mark a result failed
///
/// The failure reason is logged by the caller, not persisted.
pub async fn mark_failed(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE results
        SET state = $1
        WHERE id = $2
        "#,
    )
    .bind(ResultState::Fail.as_str())
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct ResultRow {
    id: Uuid,
    test_id: String,
    owner: Uuid,
    state: String,
    created: chrono::DateTime<chrono::Utc>,
    processed: Option<chrono::DateTime<chrono::Utc>>,
    directory: String,
    input_file: String,
    output_file: String,
    data: Option<serde_json::Value>,
}

impl From<ResultRow> for TestResult {
    fn from(row: ResultRow) -> Self {
        let data = row.data.and_then(|v| match v {
            serde_json::Value::Object(map) => Some(map),
            _ => None,
        });

        TestResult {
            id: row.id,
            state: ResultState::parse(&row.state),
            created: row.created,
            processed: row.processed,
            owner: row.owner,
            test_id: row.test_id,
            directory: row.directory,
            input_file: row.input_file,
            output_file: row.output_file,
            data,
        }
    }
}

// =============================================================================
// Integration tests
// =============================================================================
