//! Session row CSV (`timestamp,event,itemid,session`).

use std::path::Path;

use serde::{Deserialize, Serialize};
use sessions_core::{Error, EventKind, ItemId, Result, SessionId, SessionRow, Timestamp};
use tracing::debug;

use crate::files::{create_writer, csv_error, open_reader};

/// On-disk shape of a [`SessionRow`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionRecord {
    timestamp: Timestamp,
    event: EventKind,
    itemid: String,
    session: SessionId,
}

impl From<&SessionRow> for SessionRecord {
    fn from(row: &SessionRow) -> Self {
        Self {
            timestamp: row.timestamp,
            event: row.kind,
            itemid: row.item_id.to_string(),
            session: row.session_id,
        }
    }
}

impl SessionRecord {
    fn into_row(self, line: usize) -> Result<SessionRow> {
        let item_id = ItemId::parse(&self.itemid)
            .ok_or_else(|| Error::missing_field(format!("row {}: itemid", line)))?;
        Ok(SessionRow {
            timestamp: self.timestamp,
            kind: self.event,
            item_id,
            session_id: self.session,
        })
    }
}

/// Writes session rows with a header line. Returns the number of rows written.
pub fn write_session_rows(path: &Path, rows: &[SessionRow]) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(create_writer(path)?);
    // An empty file still carries the header.
    if rows.is_empty() {
        writer
            .write_record(["timestamp", "event", "itemid", "session"])
            .map_err(|e| csv_error(path, e))?;
    }
    for row in rows {
        writer
            .serialize(SessionRecord::from(row))
            .map_err(|e| csv_error(path, e))?;
    }
    writer.flush()?;

    debug!(path = %path.display(), count = rows.len(), "Wrote session rows");
    Ok(rows.len())
}

/// Reads session rows written by [`write_session_rows`].
pub fn read_session_rows(path: &Path) -> Result<Vec<SessionRow>> {
    let mut reader = csv::Reader::from_reader(open_reader(path)?);

    let rows = reader
        .deserialize::<SessionRecord>()
        .enumerate()
        .map(|(i, record)| record.map_err(|e| csv_error(path, e))?.into_row(i + 1))
        .collect::<Result<Vec<_>>>()?;

    debug!(path = %path.display(), count = rows.len(), "Read session rows");
    Ok(rows)
}
