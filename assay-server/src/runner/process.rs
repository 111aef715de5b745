//! Process adapter
//!
//! Wraps the invocation of one external processing program: the input
//! and output artifact paths are appended to the configured argv, the
//! child's stdout/stderr are captured in full and written to log
//! artifacts next to the input file, and the produced output artifact
//! is parsed as a JSON object.
//!
//! `Ok(None)` means an expected processing failure (missing input,
//! non-zero exit, no output, unparsable output); `Err` means an IO
//! problem around the launch itself. The caller treats both as job
//! failure.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::{ERROR_LOG, OUTPUT_LOG};

pub type OutputMap = serde_json::Map<String, serde_json::Value>;

/// Runs the processing program and parses its output artifact.
///
/// Waiting for the child to exit is the one blocking point in the
/// pipeline; there is no timeout, a hung child blocks its task
/// indefinitely.
pub async fn run(
    argv: &[String],
    input_path: &Path,
    output_path: &Path,
    work_dir: &Path,
) -> Result<Option<OutputMap>> {
    let program = argv.first().context("empty processing command")?;

    // The child runs with its own working directory, so the artifact
    // paths it receives must be absolute or it resolves them against
    // the workdir instead of the job directory
    let input_path = std::path::absolute(input_path).context("failed to absolutize input path")?;
    let output_path =
        std::path::absolute(output_path).context("failed to absolutize output path")?;

    if !input_path.exists() {
        debug!("Input artifact {} does not exist", input_path.display());
        return Ok(None);
    }

    let log_dir = input_path.parent().context("input path has no parent")?;

    let output = tokio::process::Command::new(program)
        .args(&argv[1..])
        .arg(&input_path)
        .arg(&output_path)
        .current_dir(work_dir)
        .output()
        .await
        .with_context(|| format!("failed to execute '{}'", program))?;

    debug!(
        "Processing {:?} finished with code: {:?}",
        argv,
        output.status.code()
    );

    // Log artifacts are written on every run; the error log only when
    // the child produced stderr bytes
    tokio::fs::write(log_dir.join(OUTPUT_LOG), &output.stdout)
        .await
        .context("failed to write output log")?;

    if !output.stderr.is_empty() {
        tokio::fs::write(log_dir.join(ERROR_LOG), &output.stderr)
            .await
            .context("failed to write error log")?;
    }

    if !output.status.success() {
        debug!("Processing {:?} failed", argv);
        return Ok(None);
    }

    if !output_path.exists() {
        debug!("No output artifact provided");
        return Ok(None);
    }

    let raw = tokio::fs::read_to_string(&output_path)
        .await
        .context("failed to read output artifact")?;

    match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(serde_json::Value::Object(map)) => Ok(Some(map)),
        Ok(_) => {
            debug!("Output artifact is not a JSON object");
            Ok(None)
        }
        Err(err) => {
            debug!("Output artifact is not valid JSON: {}", err);
            Ok(None)
        }
    }
}
