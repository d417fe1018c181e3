//! Test rows → trimmed sessions and leave-one-out labels.

use std::path::{Path, PathBuf};

use dataset_io::{ensure_dir, read_session_rows, write_jsonl};
use serde::Serialize;
use sessions_core::{group_session_rows, LeaveOneOutLabeler, Result};
use telemetry::metrics;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::stage::Stage;
use crate::{TEST_LABELS_FILE, TEST_SESSIONS_FILE};

/// Outcome of a labels run.
#[derive(Debug, Clone, Serialize)]
pub struct LabelsReport {
    pub sessions_read: usize,
    pub sessions_labelled: usize,
    pub sessions_skipped: usize,
    pub sessions_path: PathBuf,
    pub labels_path: PathBuf,
}

/// Labels the sessions in `test_set` and writes `test_sessions.jsonl` and
/// `test_labels.jsonl` into `output_dir`.
#[instrument(name = "labels", skip_all, fields(run_id = %Uuid::new_v4(), test_set = %test_set.display()))]
pub fn run_labels(config: &PipelineConfig, test_set: &Path, output_dir: &Path) -> Result<LabelsReport> {
    config.check()?;
    info!(seed = config.seed, "Starting labels job");

    let stage = Stage::start("read_test_set");
    let sessions = group_session_rows(read_session_rows(test_set)?);
    stage.finish(sessions.len());

    let stage = Stage::start("label_sessions");
    let labeled = LeaveOneOutLabeler::new(config.seed).label_sessions(&sessions)?;
    metrics()
        .sessions_labelled
        .inc_by(labeled.sessions.len() as u64);
    metrics().sessions_skipped.inc_by(labeled.skipped as u64);
    stage.finish(labeled.sessions.len());

    ensure_dir(output_dir)?;
    let sessions_path = output_dir.join(TEST_SESSIONS_FILE);
    let labels_path = output_dir.join(TEST_LABELS_FILE);
    write_jsonl(&sessions_path, &labeled.sessions)?;
    write_jsonl(&labels_path, &labeled.labels)?;

    let report = LabelsReport {
        sessions_read: sessions.len(),
        sessions_labelled: labeled.sessions.len(),
        sessions_skipped: labeled.skipped,
        sessions_path,
        labels_path,
    };

    info!(
        labelled = report.sessions_labelled,
        skipped = report.sessions_skipped,
        "Labels job complete"
    );
    metrics().log_snapshot("labels");

    Ok(report)
}
