//! In-memory test spec registry
//!
//! Holds the loaded set of test specifications behind a swap-on-write
//! map: lookups clone an `Arc` of the current map without holding any
//! lock across reads, and a reload builds a complete replacement map
//! before swapping it in, so readers never observe a partially-loaded
//! set.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use assay_core::domain::test::TestSpec;

type SpecMap = HashMap<String, Arc<TestSpec>>;

/// Registry of loaded test specifications
pub struct TestRegistry {
    inner: RwLock<Arc<SpecMap>>,
}

impl TestRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Arc::new(HashMap::new())),
        }
    }

    /// Scans `<tests_dir>/*/<config_name>` and replaces the loaded set
    /// atomically. A malformed or incomplete config logs a warning and
    /// is skipped; a single bad file never aborts the load.
    ///
    /// Returns the number of specs now loaded.
    pub fn load(&self, tests_dir: &Path, config_name: &str) -> usize {
        let mut specs: SpecMap = HashMap::new();

        let entries = match std::fs::read_dir(tests_dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("Cannot read tests directory {}: {}", tests_dir.display(), err);
                *self.inner.write().unwrap() = Arc::new(specs);
                return 0;
            }
        };

        for entry in entries.flatten() {
            let config_path = entry.path().join(config_name);
            if !config_path.is_file() {
                continue;
            }

            debug!("Reading test config: {}", config_path.display());
            match load_spec(&config_path) {
                Some(spec) => {
                    debug!("Loaded test: {}", spec.id);
                    specs.insert(spec.id.clone(), Arc::new(spec));
                }
                None => continue,
            }
        }

        let count = specs.len();
        *self.inner.write().unwrap() = Arc::new(specs);
        count
    }

    pub fn get(&self, id: &str) -> Option<Arc<TestSpec>> {
        self.snapshot().get(id).cloned()
    }

    pub fn list(&self) -> Vec<Arc<TestSpec>> {
        let mut specs: Vec<_> = self.snapshot().values().cloned().collect();
        specs.sort_by(|a, b| a.id.cmp(&b.id));
        specs
    }

    fn snapshot(&self) -> Arc<SpecMap> {
        self.inner.read().unwrap().clone()
    }
}

impl Default for TestRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Loads one spec config, returning None (with a warning) on any problem
fn load_spec(config_path: &Path) -> Option<TestSpec> {
    let raw = match std::fs::read_to_string(config_path) {
        Ok(raw) => raw,
        Err(err) => {
            warn!("Cannot read config {}: {}", config_path.display(), err);
            return None;
        }
    };

    // Serde rejects configs missing any of the required fields
    // (id, name, inputs, outputs, processing)
    let mut spec: TestSpec = match serde_json::from_str(&raw) {
        Ok(spec) => spec,
        Err(err) => {
            warn!("Invalid test config {}: {}", config_path.display(), err);
            return None;
        }
    };

    spec.dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    Some(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_config(dir: &Path, test_id: &str, body: &str) {
        let test_dir = dir.join(test_id);
        fs::create_dir_all(&test_dir).unwrap();
        fs::write(test_dir.join("test.json"), body).unwrap();
    }

    fn valid_config(id: &str) -> String {
        format!(
            r#"{{
                "id": "{id}",
                "name": "{id}",
                "inputs": {{"name": {{"type": "value"}}}},
                "outputs": {{"greeting": ""}},
                "processing": {{"call": ["echo_prog"], "workdir": "./"}}
            }}"#
        )
    }

    #[test]
    fn test_load_and_get() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "echo-test", &valid_config("echo-test"));

        let registry = TestRegistry::new();
        assert_eq!(registry.load(dir.path(), "test.json"), 1);

        let spec = registry.get("echo-test").unwrap();
        assert_eq!(spec.id, "echo-test");
        assert_eq!(spec.dir, dir.path().join("echo-test"));
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn test_bad_config_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "good", &valid_config("good"));
        write_config(dir.path(), "broken-json", "{not json");
        // Missing required "processing" section
        write_config(
            dir.path(),
            "incomplete",
            r#"{"id": "incomplete", "name": "x", "inputs": {}, "outputs": {}}"#,
        );

        let registry = TestRegistry::new();
        assert_eq!(registry.load(dir.path(), "test.json"), 1);
        assert!(registry.get("good").is_some());
        assert!(registry.get("incomplete").is_none());
    }

    #[test]
    fn test_reload_replaces_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "first", &valid_config("first"));

        let registry = TestRegistry::new();
        registry.load(dir.path(), "test.json");
        assert!(registry.get("first").is_some());

        fs::remove_dir_all(dir.path().join("first")).unwrap();
        write_config(dir.path(), "second", &valid_config("second"));

        assert_eq!(registry.load(dir.path(), "test.json"), 1);
        assert!(registry.get("first").is_none());
        assert!(registry.get("second").is_some());
    }

    #[test]
    fn test_missing_tests_dir_loads_empty() {
        let registry = TestRegistry::new();
        assert_eq!(
            registry.load(Path::new("/nonexistent/assay-tests"), "test.json"),
            0
        );
        assert!(registry.list().is_empty());
    }
}
