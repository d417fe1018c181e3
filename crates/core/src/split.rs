//! Temporal train/test partitioning of sessions.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::events::{SessionEvent, SessionId, SessionRow, Timestamp};
use crate::session::{group_session_rows, Session};

/// Seconds in one week.
pub const SECONDS_PER_WEEK: i64 = 7 * 24 * 60 * 60;

/// Default number of weeks in the train window.
pub const DEFAULT_TRAIN_WEEKS: i64 = 3;

/// Default number of weeks in the test window.
pub const DEFAULT_TEST_WEEKS: i64 = 2;

/// Train and test window boundaries, in seconds.
///
/// Train is `[train_start, test_start)`, test is `[test_start, ∞)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitWindows {
    pub max_timestamp: i64,
    pub train_start: i64,
    pub test_start: i64,
}

impl SplitWindows {
    /// Derives the windows backwards from the latest timestamp in the data.
    ///
    /// Returns `None` when the week counts push a boundary outside `i64`.
    pub fn from_max_timestamp(max_timestamp: Timestamp, train_weeks: i64, test_weeks: i64) -> Option<Self> {
        let max_timestamp = i64::from(max_timestamp);
        let test_start = max_timestamp.checked_sub(test_weeks.checked_mul(SECONDS_PER_WEEK)?)?;
        let train_start = test_start.checked_sub(train_weeks.checked_mul(SECONDS_PER_WEEK)?)?;
        Some(Self {
            max_timestamp,
            train_start,
            test_start,
        })
    }

    pub fn in_train(&self, timestamp: Timestamp) -> bool {
        let ts = i64::from(timestamp);
        self.train_start <= ts && ts < self.test_start
    }

    pub fn in_test(&self, timestamp: Timestamp) -> bool {
        i64::from(timestamp) >= self.test_start
    }
}

/// Result of a temporal split.
#[derive(Debug, Clone, Default)]
pub struct SplitOutcome {
    /// Windows used, or `None` when the input was empty or the week counts were out of range
    pub windows: Option<SplitWindows>,
    /// Sessions with a cart or transaction after their first event
    pub qualifying_sessions: usize,
    pub train: Vec<SessionRow>,
    pub test: Vec<SessionRow>,
}

impl SplitOutcome {
    pub fn train_session_ids(&self) -> HashSet<SessionId> {
        self.train.iter().map(|r| r.session_id).collect()
    }

    pub fn test_session_ids(&self) -> HashSet<SessionId> {
        self.test.iter().map(|r| r.session_id).collect()
    }
}

/// Partitions sessions into disjoint train and test windows.
#[derive(Debug, Clone)]
pub struct TemporalSplitter {
    train_weeks: i64,
    test_weeks: i64,
}

impl Default for TemporalSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_TRAIN_WEEKS, DEFAULT_TEST_WEEKS)
    }
}

impl TemporalSplitter {
    pub fn new(train_weeks: i64, test_weeks: i64) -> Self {
        Self {
            train_weeks,
            test_weeks,
        }
    }

    /// Splits sessions into train and test rows.
    ///
    /// Qualification is decided on the full session before any windowing,
    /// since restricting to a window can drop the cart or transaction that
    /// made the session interesting. Test sessions whose id survived into
    /// train are removed entirely. Both outputs are sorted by
    /// `(session_id, timestamp)`.
    pub fn split(&self, sessions: &[Session]) -> SplitOutcome {
        if self.train_weeks <= 0 || self.test_weeks <= 0 {
            return SplitOutcome::default();
        }

        // Merge any repeated ids and put events in time order.
        let sessions = group_session_rows(sessions.iter().flat_map(|s| s.rows()).collect());

        let max_timestamp = match sessions
            .iter()
            .filter_map(|s| s.last_timestamp())
            .max()
        {
            Some(ts) => ts,
            None => return SplitOutcome::default(),
        };
        let windows = match SplitWindows::from_max_timestamp(max_timestamp, self.train_weeks, self.test_weeks) {
            Some(windows) => windows,
            None => return SplitOutcome::default(),
        };

        let qualifying: HashSet<SessionId> = sessions
            .iter()
            .filter(|s| s.is_qualifying())
            .map(|s| s.id)
            .collect();

        let mut train = Vec::new();
        for session in sessions.iter().filter(|s| qualifying.contains(&s.id)) {
            let events = windowed(session, |ts| windows.in_train(ts));
            if events.len() > 1 {
                train.extend(rows(session.id, events));
            }
        }

        let train_ids: HashSet<SessionId> = train.iter().map(|r| r.session_id).collect();

        let mut test = Vec::new();
        for session in sessions
            .iter()
            .filter(|s| qualifying.contains(&s.id) && !train_ids.contains(&s.id))
        {
            let events = windowed(session, |ts| windows.in_test(ts));
            if events.len() > 1 {
                test.extend(rows(session.id, events));
            }
        }

        train.sort_by_key(|r| (r.session_id, r.timestamp));
        test.sort_by_key(|r| (r.session_id, r.timestamp));

        SplitOutcome {
            windows: Some(windows),
            qualifying_sessions: qualifying.len(),
            train,
            test,
        }
    }
}

fn windowed(session: &Session, keep: impl Fn(Timestamp) -> bool) -> Vec<&SessionEvent> {
    session.events.iter().filter(|e| keep(e.timestamp)).collect()
}

fn rows(session_id: SessionId, events: Vec<&SessionEvent>) -> impl Iterator<Item = SessionRow> + '_ {
    events.into_iter().map(move |e| SessionRow {
        timestamp: e.timestamp,
        kind: e.kind,
        item_id: e.item_id.clone(),
        session_id,
    })
}

/// Splits sessions into `(train, test)` rows.
pub fn split(sessions: &[Session], train_weeks: i64, test_weeks: i64) -> (Vec<SessionRow>, Vec<SessionRow>) {
    let outcome = TemporalSplitter::new(train_weeks, test_weeks).split(sessions);
    (outcome.train, outcome.test)
}
