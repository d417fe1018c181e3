//! Raw event log reader.

use std::path::Path;
use std::time::Instant;

use sessions_core::schema::{validate_raw_event, RawEvent};
use sessions_core::{Event, Result};
use tracing::debug;

use crate::files::{csv_error, open_reader};

/// Reads and validates the raw event log
/// (`timestamp,visitorid,event,itemid,transactionid`, timestamps in ms).
pub fn read_events(path: &Path) -> Result<Vec<Event>> {
    let start = Instant::now();
    let mut reader = csv::Reader::from_reader(open_reader(path)?);

    let mut events = Vec::new();
    for (i, record) in reader.deserialize::<RawEvent>().enumerate() {
        let raw = record.map_err(|e| csv_error(path, e))?;
        events.push(validate_raw_event(raw, i + 1)?);
    }

    debug!(
        path = %path.display(),
        count = events.len(),
        latency_ms = %start.elapsed().as_millis(),
        "Read raw events"
    );

    Ok(events)
}
