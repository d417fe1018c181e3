//! Newline-delimited JSON.

use std::io::{BufRead, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sessions_core::{Error, Result};
use tracing::debug;

use crate::files::{create_writer, open_reader};

/// Writes one JSON object per line. Returns the number of records written.
pub fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> Result<usize> {
    let mut writer = create_writer(path)?;
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    debug!(path = %path.display(), count = records.len(), "Wrote JSONL");
    Ok(records.len())
}

/// Reads one JSON object per non-blank line.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut records = Vec::new();
    for (i, line) in open_reader(path)?.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line)
            .map_err(|e| Error::schema(format!("{} line {}: {}", path.display(), i + 1, e)))?;
        records.push(record);
    }
    Ok(records)
}
