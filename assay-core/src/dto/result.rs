//! Test result views

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::result::{ResultState, TestResult};

/// Response to an accepted submission; processing is still in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAccepted {
    pub result_id: Uuid,
}

/// Client-facing result record
///
/// Artifact locations stay internal; clients fetch logs through the
/// dedicated endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultView {
    pub id: Uuid,
    pub state: ResultState,
    pub created: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed: Option<chrono::DateTime<chrono::Utc>>,
    pub owner: Uuid,
    pub test: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Map<String, serde_json::Value>>,
}

impl From<TestResult> for ResultView {
    fn from(result: TestResult) -> Self {
        Self {
            id: result.id,
            state: result.state,
            created: result.created,
            processed: result.processed,
            owner: result.owner,
            test: result.test_id,
            data: result.data,
        }
    }
}
