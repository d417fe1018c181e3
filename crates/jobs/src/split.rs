//! Raw events → train/test session rows.

use std::path::{Path, PathBuf};

use dataset_io::{ensure_dir, read_events, write_session_rows};
use serde::Serialize;
use sessions_core::split::SplitWindows;
use sessions_core::{Result, SessionBuilder, TemporalSplitter};
use telemetry::metrics;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::stage::{warn_if_empty, Stage};
use crate::{TEST_SET_FILE, TRAIN_SET_FILE};

/// Outcome of a split run.
#[derive(Debug, Clone, Serialize)]
pub struct SplitReport {
    pub events: usize,
    pub sessions: usize,
    pub dropped_single_event: usize,
    pub qualifying_sessions: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub train_sessions: usize,
    pub test_sessions: usize,
    pub windows: Option<SplitWindows>,
    pub train_path: PathBuf,
    pub test_path: PathBuf,
}

/// Sessionizes the raw event log at `input` and writes
/// `train_set.csv` and `test_set.csv` into `output_dir`.
#[instrument(name = "split", skip_all, fields(run_id = %Uuid::new_v4(), input = %input.display()))]
pub fn run_split(config: &PipelineConfig, input: &Path, output_dir: &Path) -> Result<SplitReport> {
    config.check()?;
    info!(
        gap_secs = config.session_gap_secs,
        train_weeks = config.train_weeks,
        test_weeks = config.test_weeks,
        "Starting split job"
    );

    let stage = Stage::start("read_events");
    let events = read_events(input)?;
    metrics().events_read.inc_by(events.len() as u64);
    let event_count = events.len();
    stage.finish(event_count);

    let stage = Stage::start("build_sessions");
    let (sessions, stats) = SessionBuilder::new()
        .with_gap(config.session_gap_secs)
        .build_with_stats(events);
    metrics().sessions_built.inc_by(sessions.len() as u64);
    metrics()
        .single_event_sessions_dropped
        .inc_by(stats.dropped_single_event as u64);
    stage.finish(sessions.len());

    if config.train_weeks <= 0 || config.test_weeks <= 0 {
        warn!(
            train_weeks = config.train_weeks,
            test_weeks = config.test_weeks,
            "Non-positive week count, split will be empty"
        );
    }

    let stage = Stage::start("split");
    let outcome = TemporalSplitter::new(config.train_weeks, config.test_weeks).split(&sessions);
    stage.finish(outcome.train.len() + outcome.test.len());

    if let Some(windows) = &outcome.windows {
        info!(
            max_timestamp = windows.max_timestamp,
            train_start = windows.train_start,
            test_start = windows.test_start,
            "Split windows"
        );
    } else if !sessions.is_empty() && config.train_weeks > 0 && config.test_weeks > 0 {
        warn!(
            train_weeks = config.train_weeks,
            test_weeks = config.test_weeks,
            "Week counts out of range, split will be empty"
        );
    }
    warn_if_empty("train_set", outcome.train.len());
    warn_if_empty("test_set", outcome.test.len());

    metrics()
        .qualifying_sessions
        .inc_by(outcome.qualifying_sessions as u64);
    metrics().train_rows.inc_by(outcome.train.len() as u64);
    metrics().test_rows.inc_by(outcome.test.len() as u64);

    ensure_dir(output_dir)?;
    let train_path = output_dir.join(TRAIN_SET_FILE);
    let test_path = output_dir.join(TEST_SET_FILE);
    write_session_rows(&train_path, &outcome.train)?;
    write_session_rows(&test_path, &outcome.test)?;

    let report = SplitReport {
        events: event_count,
        sessions: sessions.len(),
        dropped_single_event: stats.dropped_single_event,
        qualifying_sessions: outcome.qualifying_sessions,
        train_rows: outcome.train.len(),
        test_rows: outcome.test.len(),
        train_sessions: outcome.train_session_ids().len(),
        test_sessions: outcome.test_session_ids().len(),
        windows: outcome.windows,
        train_path,
        test_path,
    };

    info!(
        train_rows = report.train_rows,
        test_rows = report.test_rows,
        train_sessions = report.train_sessions,
        test_sessions = report.test_sessions,
        "Split job complete"
    );
    metrics().log_snapshot("split");

    Ok(report)
}
