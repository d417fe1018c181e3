//! Schema validation for raw event log rows.

use serde::Deserialize;
use validator::Validate;

use crate::error::{Error, Result};
use crate::events::{Event, EventKind, ItemId, Timestamp};

/// One row of the raw event log, exactly as it appears in the CSV.
///
/// `timestamp` is in milliseconds; it is converted to seconds on validation.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RawEvent {
    pub timestamp: u64,
    pub visitorid: u32,
    pub event: String,
    #[validate(length(max = 256))]
    pub itemid: String,
    pub transactionid: Option<u32>,
}

/// Converts a millisecond timestamp to seconds, checking it fits the session schema.
pub fn millis_to_seconds(millis: u64) -> Result<Timestamp> {
    Timestamp::try_from(millis / 1000)
        .map_err(|_| Error::schema(format!("timestamp {} ms is out of range", millis)))
}

/// Validates a raw row into an [`Event`].
///
/// `row` is the 1-based data row number, used in error messages.
pub fn validate_raw_event(raw: RawEvent, row: usize) -> Result<Event> {
    raw.validate()
        .map_err(|e| Error::schema(format!("row {}: {}", row, e)))?;

    let item_id = ItemId::parse(&raw.itemid)
        .ok_or_else(|| Error::missing_field(format!("row {}: itemid", row)))?;

    let kind: EventKind = raw.event.trim().parse().map_err(|e| match e {
        Error::InvalidEventKind(kind) => Error::InvalidEventKind(format!("row {}: {:?}", row, kind)),
        other => other,
    })?;

    let timestamp =
        millis_to_seconds(raw.timestamp).map_err(|e| Error::schema(format!("row {}: {}", row, e)))?;

    Ok(Event {
        timestamp,
        visitor_id: raw.visitorid,
        item_id,
        kind,
        transaction_id: raw.transactionid,
    })
}

/// Validates every row, failing on the first bad one.
pub fn validate_raw_events(raws: impl IntoIterator<Item = RawEvent>) -> Result<Vec<Event>> {
    raws.into_iter()
        .enumerate()
        .map(|(i, raw)| validate_raw_event(raw, i + 1))
        .collect()
}
