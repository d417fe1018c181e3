//! Pipeline counters and stage latency.
//!
//! Counters live in a process-wide registry; each job logs a snapshot when
//! it finishes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) -> u64 {
        self.0.swap(0, Ordering::Relaxed)
    }
}

/// Latency histogram in milliseconds.
#[derive(Debug)]
pub struct Histogram {
    /// Upper bounds: 10ms, 50ms, 100ms, 500ms, 1s, 5s, 30s, 60s, 5min, +inf
    buckets: [AtomicU64; 10],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 10] = [10, 50, 100, 500, 1_000, 5_000, 30_000, 60_000, 300_000, u64::MAX];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        let idx = Self::BUCKET_BOUNDS
            .iter()
            .position(|&bound| ms <= bound)
            .unwrap_or(Self::BUCKET_BOUNDS.len() - 1);
        self.buckets[idx].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }

    /// Returns `(upper bound, count)` per bucket.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Collected metrics for the session pipeline.
#[derive(Debug, Default)]
pub struct Metrics {
    // Sessionization
    pub events_read: Counter,
    pub sessions_built: Counter,
    pub single_event_sessions_dropped: Counter,
    pub qualifying_sessions: Counter,

    // Split
    pub train_rows: Counter,
    pub test_rows: Counter,

    // Labeling
    pub sessions_labelled: Counter,
    pub sessions_skipped: Counter,

    // Evaluation
    pub labels_read: Counter,
    pub predictions_read: Counter,

    // Categories
    pub item_categories_written: Counter,

    /// Stages that produced zero rows.
    pub empty_stage_warnings: Counter,

    pub stage_latency_ms: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub events_read: u64,
    pub sessions_built: u64,
    pub single_event_sessions_dropped: u64,
    pub qualifying_sessions: u64,
    pub train_rows: u64,
    pub test_rows: u64,
    pub sessions_labelled: u64,
    pub sessions_skipped: u64,
    pub labels_read: u64,
    pub predictions_read: u64,
    pub item_categories_written: u64,
    pub empty_stage_warnings: u64,
    pub stages_timed: u64,
    pub stage_latency_mean_ms: f64,
}

impl Metrics {
    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            events_read: self.events_read.get(),
            sessions_built: self.sessions_built.get(),
            single_event_sessions_dropped: self.single_event_sessions_dropped.get(),
            qualifying_sessions: self.qualifying_sessions.get(),
            train_rows: self.train_rows.get(),
            test_rows: self.test_rows.get(),
            sessions_labelled: self.sessions_labelled.get(),
            sessions_skipped: self.sessions_skipped.get(),
            labels_read: self.labels_read.get(),
            predictions_read: self.predictions_read.get(),
            item_categories_written: self.item_categories_written.get(),
            empty_stage_warnings: self.empty_stage_warnings.get(),
            stages_timed: self.stage_latency_ms.count(),
            stage_latency_mean_ms: self.stage_latency_ms.mean(),
        }
    }

    /// Logs the current snapshot at info level, tagged with the finished job.
    pub fn log_snapshot(&self, job: &str) {
        let snapshot = self.snapshot();
        info!(
            job = job,
            events_read = snapshot.events_read,
            sessions_built = snapshot.sessions_built,
            single_event_sessions_dropped = snapshot.single_event_sessions_dropped,
            qualifying_sessions = snapshot.qualifying_sessions,
            train_rows = snapshot.train_rows,
            test_rows = snapshot.test_rows,
            sessions_labelled = snapshot.sessions_labelled,
            sessions_skipped = snapshot.sessions_skipped,
            labels_read = snapshot.labels_read,
            predictions_read = snapshot.predictions_read,
            item_categories_written = snapshot.item_categories_written,
            empty_stage_warnings = snapshot.empty_stage_warnings,
            stage_latency_mean_ms = %format!("{:.1}", snapshot.stage_latency_mean_ms),
            "Pipeline metrics"
        );
    }
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
