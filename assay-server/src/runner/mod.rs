//! Job runner
//!
//! Executes one submitted job asynchronously relative to the request
//! that created it. `spawn` returns immediately; the work happens on a
//! dedicated task per job. There is no cap on concurrent jobs, no
//! queueing and no timeout; a bounded worker pool would be the obvious
//! hardening if submission volume grows.
//!
//! Failures never escape the task: every failure path ends in the
//! record's `fail` state, which is the only way outcomes are surfaced
//! once the submission response has been sent.

pub mod process;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::{debug, error, info};
use uuid::Uuid;

use assay_core::domain::result::TestResult;
use assay_core::domain::test::TestSpec;

use crate::repository::result_repository;

/// Launches asynchronous processing for a freshly created result record.
///
/// Must be called exactly once per accepted submission, after the `raw`
/// record is durable. Returns as soon as the task is spawned.
pub fn spawn(pool: PgPool, result: TestResult, spec: Arc<TestSpec>) {
    tokio::spawn(async move {
        let id = result.id;
        if let Err(err) = process_and_save(&pool, result, spec).await {
            error!("Processing failed for result {}: {:#}", id, err);
            fail(&pool, id).await;
        }
    });
}

/// Runs the processing program and records the terminal state.
///
/// Expected failures (bad command, adapter returning nothing) mark the
/// record failed and return Ok; Err is reserved for surprises the
/// spawned wrapper converts into the same `fail` state.
async fn process_and_save(pool: &PgPool, result: TestResult, spec: Arc<TestSpec>) -> Result<()> {
    let Some(argv) = spec.command() else {
        debug!("Test {} has no processing command", spec.id);
        fail(pool, result.id).await;
        return Ok(());
    };

    // The record may hold a directory relative to the server cwd; the
    // adapter needs absolute artifact paths because the child process
    // runs in the spec's workdir
    let job_dir = std::path::absolute(Path::new(&result.directory))
        .context("failed to absolutize job directory")?;
    let Some(work_dir) = resolve_workdir(&spec, &job_dir) else {
        debug!("Test {} has no resolvable working directory", spec.id);
        fail(pool, result.id).await;
        return Ok(());
    };

    let input_path = job_dir.join(&result.input_file);
    let output_path = job_dir.join(&result.output_file);

    let data = process::run(&argv, &input_path, &output_path, &work_dir).await?;

    match data {
        Some(data) if !data.is_empty() => {
            let filtered = filter_outputs(&spec, data);
            result_repository::mark_processed(pool, result.id, filtered).await?;
            info!("Result {} processed", result.id);
        }
        _ => {
            debug!("Processing produced no usable output for result {}", result.id);
            fail(pool, result.id).await;
        }
    }

    Ok(())
}

/// Working directory resolution: spec workdir, then the spec's own
/// directory, then the job directory itself.
fn resolve_workdir(spec: &TestSpec, job_dir: &Path) -> Option<PathBuf> {
    if let Some(workdir) = spec.workdir() {
        return Some(workdir);
    }
    if !spec.dir.as_os_str().is_empty() {
        return Some(spec.dir.clone());
    }
    if !job_dir.as_os_str().is_empty() {
        return Some(job_dir.to_path_buf());
    }
    None
}

/// Projects the parsed program output onto the spec's declared output
/// keys: declared keys missing from the output are kept as null,
/// undeclared keys are dropped. Value types are not checked.
fn filter_outputs(spec: &TestSpec, data: process::OutputMap) -> process::OutputMap {
    // TODO: verify output value types against the spec
    spec.outputs
        .keys()
        .map(|key| {
            let value = data.get(key).cloned().unwrap_or(serde_json::Value::Null);
            (key.clone(), value)
        })
        .collect()
}

async fn fail(pool: &PgPool, id: Uuid) {
    error!("Failed processing: {}", id);
    // No synchronous caller exists anymore; a store error here can only
    // be logged
    if let Err(err) = result_repository::mark_failed(pool, id).await {
        error!("Could not mark result {} failed: {}", id, err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(outputs: &[&str]) -> TestSpec {
        let outputs: serde_json::Map<_, _> = outputs
            .iter()
            .map(|k| (k.to_string(), json!("")))
            .collect();
        serde_json::from_value(json!({
            "id": "echo-test",
            "name": "Echo",
            "inputs": {},
            "outputs": outputs,
            "processing": {"call": ["echo_prog"]}
        }))
        .unwrap()
    }

    fn map(value: serde_json::Value) -> process::OutputMap {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_filter_keeps_declared_keys() {
        let filtered = filter_outputs(
            &spec(&["greeting"]),
            map(json!({"greeting": "hello Ada"})),
        );
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.get("greeting").unwrap(), "hello Ada");
    }

    #[test]
    fn test_filter_drops_undeclared_keys() {
        let filtered = filter_outputs(
            &spec(&["greeting"]),
            map(json!({"greeting": "hi", "debug_info": {"steps": 3}})),
        );
        assert!(filtered.get("debug_info").is_none());
    }

    #[test]
    fn test_filter_nulls_missing_keys() {
        let filtered = filter_outputs(
            &spec(&["greeting", "score"]),
            map(json!({"greeting": "hi"})),
        );
        assert_eq!(filtered.get("score").unwrap(), &serde_json::Value::Null);
    }

    #[test]
    fn test_workdir_falls_back_to_spec_dir() {
        let mut s = spec(&["greeting"]);
        s.processing.workdir = None;
        s.dir = PathBuf::from("/opt/tests/echo-test");
        assert_eq!(
            resolve_workdir(&s, Path::new("/var/results/x")),
            Some(PathBuf::from("/opt/tests/echo-test"))
        );
    }

    #[test]
    fn test_workdir_falls_back_to_job_dir() {
        let mut s = spec(&["greeting"]);
        s.processing.workdir = None;
        s.dir = PathBuf::new();
        assert_eq!(
            resolve_workdir(&s, Path::new("/var/results/x")),
            Some(PathBuf::from("/var/results/x"))
        );
    }

    #[test]
    fn test_workdir_prefers_spec_workdir() {
        let mut s = spec(&["greeting"]);
        s.processing.workdir = Some("bin".to_string());
        s.dir = PathBuf::from("/opt/tests/echo-test");
        assert_eq!(
            resolve_workdir(&s, Path::new("/var/results/x")),
            Some(PathBuf::from("/opt/tests/echo-test/bin"))
        );
    }
}
