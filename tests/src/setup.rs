//! Common test setup functions.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

use pipeline_jobs::PipelineConfig;
use tempfile::TempDir;
use telemetry::{init_tracing, TracingConfig};

static TRACING: Once = Once::new();

/// Test context backed by a temporary directory.
///
/// Layout mirrors a real run: `raw/` for inputs, `split/` for the split
/// job, `labels/` for the labels job and `out/` for everything else.
pub struct TestContext {
    dir: TempDir,
    pub config: PipelineConfig,
}

impl TestContext {
    pub fn new() -> Self {
        TRACING.call_once(|| init_tracing(TracingConfig::new().with_filter("warn")));

        let dir = TempDir::new().expect("Failed to create temp dir");
        for sub in ["raw", "split", "labels", "out"] {
            fs::create_dir_all(dir.path().join(sub)).expect("Failed to create test dirs");
        }

        Self {
            dir,
            config: PipelineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.root().join("raw")
    }

    pub fn split_dir(&self) -> PathBuf {
        self.root().join("split")
    }

    pub fn labels_dir(&self) -> PathBuf {
        self.root().join("labels")
    }

    pub fn out_dir(&self) -> PathBuf {
        self.root().join("out")
    }

    /// Writes `body` to `raw/<name>` and returns the path.
    pub fn write_raw(&self, name: &str, body: &str) -> PathBuf {
        let path = self.raw_dir().join(name);
        fs::write(&path, body).expect("Failed to write fixture");
        path
    }

    /// Writes `body` to `out/<name>` and returns the path.
    pub fn write_out(&self, name: &str, body: &str) -> PathBuf {
        let path = self.out_dir().join(name);
        fs::write(&path, body).expect("Failed to write fixture");
        path
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
