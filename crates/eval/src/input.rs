//! Parsing of label and prediction files.
//!
//! Labels are newline-delimited JSON records `{"session": …, "labels": {…}}`.
//! Predictions are CSV lines `{session}_{kind},{space separated item ids}`
//! after a header line.

use std::io::BufRead;

use sessions_core::{Error, ItemId, LabelKind, Result, SessionId, SessionLabels};
use tracing::debug;

use crate::metrics::{Predictions, SessionLabelMap};

/// One parsed prediction line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionLine {
    pub session_id: SessionId,
    pub kind: LabelKind,
    pub items: Vec<ItemId>,
}

/// Parses `{session}_{kind},{items}`. `line_no` is 1-based.
pub fn parse_prediction_line(line: &str, line_no: usize) -> Result<PredictionLine> {
    let fields: Vec<&str> = line.trim().split(',').collect();
    let [key, items] = fields.as_slice() else {
        return Err(Error::malformed_prediction(
            line_no,
            format!("expected 2 comma-separated fields, got {}", fields.len()),
        ));
    };

    let (session, kind) = key
        .split_once('_')
        .ok_or_else(|| Error::malformed_prediction(line_no, format!("key {:?} is not {{session}}_{{kind}}", key)))?;

    let session_id: SessionId = session
        .trim()
        .parse()
        .map_err(|_| Error::malformed_prediction(line_no, format!("session id {:?} is not an integer", session)))?;

    let kind: LabelKind = kind
        .trim()
        .parse()
        .map_err(|_| Error::malformed_prediction(line_no, format!("unknown event type {:?}", kind)))?;

    let items = items
        .split_whitespace()
        .map(|item| {
            item.parse::<u64>()
                .map(ItemId::Num)
                .map_err(|_| Error::malformed_prediction(line_no, format!("item id {:?} is not an integer", item)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(PredictionLine {
        session_id,
        kind,
        items,
    })
}

/// Reads a prediction file, skipping the header line and blank lines.
///
/// A later line for the same session and kind replaces an earlier one.
pub fn read_predictions<R: BufRead>(reader: R) -> Result<Predictions> {
    let mut predictions = Predictions::new();
    let mut lines = 0usize;

    for (i, line) in reader.lines().enumerate().skip(1) {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let parsed = parse_prediction_line(&line, i + 1)?;
        predictions
            .entry(parsed.session_id)
            .or_default()
            .insert(parsed.kind, parsed.items);
        lines += 1;
    }

    debug!(lines, sessions = predictions.len(), "Parsed predictions");
    Ok(predictions)
}

/// Parses one label record. `line_no` is 1-based.
pub fn parse_label_line(line: &str, line_no: usize) -> Result<SessionLabels> {
    serde_json::from_str(line).map_err(|e| Error::schema(format!("labels line {}: {}", line_no, e)))
}

/// Reads a label file keyed by session.
pub fn read_labels<R: BufRead>(reader: R) -> Result<SessionLabelMap> {
    let mut labels = SessionLabelMap::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = parse_label_line(&line, i + 1)?;
        labels.insert(record.session_id, record.labels);
    }

    debug!(sessions = labels.len(), "Parsed labels");
    Ok(labels)
}
