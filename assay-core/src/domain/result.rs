//! Test result domain types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One submission tracked through a terminal outcome
///
/// Created in state `raw` when a submission is accepted; mutated exactly
/// once more by the job runner with a terminal state. The job runner owns
/// `directory` and its artifacts for the record's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub id: Uuid,
    pub state: ResultState,
    pub created: chrono::DateTime<chrono::Utc>,
    pub processed: Option<chrono::DateTime<chrono::Utc>>,
    pub owner: Uuid,
    pub test_id: String,
    /// Filesystem directory holding this job's input/output/log artifacts
    pub directory: String,
    /// Input artifact file name within `directory`
    pub input_file: String,
    /// Output artifact file name within `directory`
    pub output_file: String,
    /// Filtered program output; present iff `state` is `Processed`
    pub data: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Result lifecycle state
///
/// Moves monotonically `raw -> (processing) -> processed | fail`.
/// `Processing` is a logical launch transition inside the runner and is
/// never persisted; a racing reader may still observe `raw`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultState {
    Raw,
    Processing,
    Processed,
    Fail,
}

impl ResultState {
    pub fn as_str(self) -> &'static str {
        match self {
            ResultState::Raw => "raw",
            ResultState::Processing => "processing",
            ResultState::Processed => "processed",
            ResultState::Fail => "fail",
        }
    }

    /// Parses a persisted state string, defaulting unknown values to `Raw`
    pub fn parse(s: &str) -> Self {
        match s {
            "processing" => ResultState::Processing,
            "processed" => ResultState::Processed,
            "fail" => ResultState::Fail,
            _ => ResultState::Raw,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ResultState::Processed | ResultState::Fail)
    }
}
