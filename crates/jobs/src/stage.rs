//! Stage timing and empty-output warnings shared by the jobs.

use std::time::Instant;

use telemetry::metrics;
use tracing::{debug, warn};

/// Times one stage of a job.
pub(crate) struct Stage {
    name: &'static str,
    start: Instant,
}

impl Stage {
    pub(crate) fn start(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    /// Records latency and warns when the stage produced no rows.
    pub(crate) fn finish(self, rows: usize) {
        let elapsed = self.start.elapsed();
        metrics().stage_latency_ms.observe(elapsed.as_millis() as u64);
        warn_if_empty(self.name, rows);

        debug!(
            stage = self.name,
            rows = rows,
            latency_ms = %elapsed.as_millis(),
            "Stage complete"
        );
    }
}

/// Logs and counts an empty stage output.
pub(crate) fn warn_if_empty(what: &str, rows: usize) {
    if rows == 0 {
        metrics().empty_stage_warnings.inc();
        warn!(stage = what, "Stage produced no rows");
    }
}
