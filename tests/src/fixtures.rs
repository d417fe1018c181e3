//! Test fixtures and file builders.

use ranking_eval::SessionLabelMap;
use sessions_core::LabelKind;

/// Seconds in a day.
pub const DAY: u32 = 86_400;
/// Seconds in a week.
pub const WEEK: u32 = 7 * DAY;
/// Start of the synthetic event log, in seconds.
pub const T0: u32 = 1_430_000_000;
/// Latest timestamp in [`retail_event_log`]; five weeks after [`T0`].
pub const MAX_TS: u32 = T0 + 5 * WEEK;

/// One raw event: `(timestamp secs, visitor, event, item)`.
pub type RawRow = (u32, u32, &'static str, u64);

/// Renders raw events as the event log CSV (timestamps in milliseconds).
pub fn events_csv(rows: &[RawRow]) -> String {
    let mut out = String::from("timestamp,visitorid,event,itemid,transactionid\n");
    for (i, (ts, visitor, event, item)) in rows.iter().enumerate() {
        let transaction = if *event == "transaction" {
            (i + 1).to_string()
        } else {
            String::new()
        };
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            u64::from(*ts) * 1000,
            visitor,
            event,
            item,
            transaction
        ));
    }
    out
}

/// A small event log spanning five weeks.
///
/// With the default 3 + 2 week windows:
/// - visitors 1..=6 shop in the train window (view, view, cart)
/// - visitors 11..=16 shop in the test window (view, view, cart, buy)
/// - visitor 20 only browses, visitor 21 has a single event
/// - visitor 30 browses at the very end to pin the latest timestamp
pub fn retail_event_log() -> Vec<RawRow> {
    let mut rows = Vec::new();

    for visitor in 1..=6u32 {
        let start = T0 + visitor * 2 * DAY;
        let item = u64::from(visitor) * 100;
        rows.push((start, visitor, "view", item));
        rows.push((start + 60, visitor, "view", item + 1));
        rows.push((start + 120, visitor, "addtocart", item + 1));
    }

    let test_start = MAX_TS - 2 * WEEK;
    for visitor in 11..=16u32 {
        let start = test_start + (visitor - 10) * DAY;
        let item = u64::from(visitor) * 100;
        rows.push((start, visitor, "view", item));
        rows.push((start + 30, visitor, "view", item + 1));
        rows.push((start + 90, visitor, "addtocart", item + 1));
        rows.push((start + 150, visitor, "transaction", item + 1));
    }

    rows.push((T0 + DAY, 20, "view", 7));
    rows.push((T0 + DAY + 10, 20, "view", 8));
    rows.push((T0 + 3 * DAY, 21, "addtocart", 9));
    rows.push((MAX_TS - 100, 30, "view", 10));
    rows.push((MAX_TS, 30, "view", 11));

    rows
}

/// Predictions CSV that ranks exactly the labelled items for each session.
pub fn perfect_predictions(labels: &SessionLabelMap) -> String {
    let mut out = String::from("session_type,labels\n");
    for (session, session_labels) in labels {
        for (kind, items) in session_labels.iter() {
            let items: Vec<String> = items.iter().map(|i| i.to_string()).collect();
            out.push_str(&format!("{}_{},{}\n", session, kind, items.join(" ")));
        }
    }
    out
}

/// Predictions CSV with the same item list for every labelled session and kind.
pub fn constant_predictions(labels: &SessionLabelMap, items: &[u64]) -> String {
    let items: Vec<String> = items.iter().map(|i| i.to_string()).collect();
    let mut out = String::from("session_type,labels\n");
    for session in labels.keys() {
        for kind in LabelKind::ALL {
            out.push_str(&format!("{}_{},{}\n", session, kind, items.join(" ")));
        }
    }
    out
}

/// Labels for the three-session scoring example.
pub fn scoring_labels_jsonl() -> String {
    [
        r#"{"session":1,"labels":{"addtocart":[],"transaction":[0,1,2,3,4,5,16,17,18,19,20]}}"#,
        r#"{"session":2,"labels":{"addtocart":[1000000,1000004,1000007],"transaction":[1000000,1000004]}}"#,
        r#"{"session":3,"labels":{"addtocart":[1000000,1000004,1000007],"transaction":[]}}"#,
        r#"{"session":4,"labels":{"addtocart":[1000000,1000004,1000007],"transaction":[]}}"#,
    ]
    .join("\n")
        + "\n"
}

/// Predictions for the three-session scoring example.
pub fn scoring_predictions_csv() -> String {
    [
        "session_type,labels",
        "1_addtocart,1 2 3",
        "1_transaction,1 32 33",
        "2_addtocart,1000004 2 3 1000007",
        "2_transaction,1 2 3",
        "3_addtocart,1000007 1000004 3",
        "3_transaction,1 2 3",
    ]
    .join("\n")
        + "\n"
}
