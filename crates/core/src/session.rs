//! Session construction from per-visitor event streams.

use serde::{Deserialize, Serialize};

use crate::events::{Event, EventKind, SessionEvent, SessionId, SessionRow, Timestamp};

/// Session timeout (30 minutes of inactivity), in seconds.
pub const SESSION_TIMEOUT_SECS: u32 = 30 * 60;

/// A visitor session: an inactivity-gap-delimited run of events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "session")]
    pub id: SessionId,
    pub events: Vec<SessionEvent>,
}

impl Session {
    pub fn new(id: SessionId, events: Vec<SessionEvent>) -> Self {
        Self { id, events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<Timestamp> {
        self.events.first().map(|e| e.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.events.last().map(|e| e.timestamp)
    }

    /// Whether a cart or transaction event occurs after the opening event.
    ///
    /// A session that opens with its only cart/transaction offers no context
    /// to predict from, so it counts as view-only.
    pub fn is_qualifying(&self) -> bool {
        self.events.iter().skip(1).any(|e| e.kind != EventKind::View)
    }

    /// Flattens the session into persisted rows.
    pub fn rows(&self) -> impl Iterator<Item = SessionRow> + '_ {
        self.events.iter().map(move |e| SessionRow {
            timestamp: e.timestamp,
            kind: e.kind,
            item_id: e.item_id.clone(),
            session_id: self.id,
        })
    }
}

/// Counters from one construction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Sessions found before single-event filtering
    pub raw_sessions: usize,
    /// Sessions dropped for having a single event
    pub dropped_single_event: usize,
}

/// Groups events into sessions by an inactivity-gap rule.
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    gap_secs: u32,
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self {
            gap_secs: SESSION_TIMEOUT_SECS,
        }
    }

    /// Overrides the inactivity gap.
    pub fn with_gap(mut self, gap_secs: u32) -> Self {
        self.gap_secs = gap_secs;
        self
    }

    pub fn gap_secs(&self) -> u32 {
        self.gap_secs
    }

    /// Whether `event` opens a new session after `prev` (events sorted by visitor, time).
    pub fn is_boundary(&self, prev: Option<&Event>, event: &Event) -> bool {
        match prev {
            None => true,
            Some(prev) if prev.visitor_id != event.visitor_id => true,
            Some(prev) => event.timestamp.saturating_sub(prev.timestamp) >= self.gap_secs,
        }
    }

    /// Builds sessions; see [`SessionBuilder::build_with_stats`].
    pub fn build(&self, events: Vec<Event>) -> Vec<Session> {
        self.build_with_stats(events).0
    }

    /// Builds sessions with dense ids starting at 1.
    ///
    /// Events are stably sorted by `(visitor_id, timestamp)`, split on visitor
    /// change or a gap of at least the configured timeout, and single-event
    /// sessions are dropped before numbering.
    pub fn build_with_stats(&self, mut events: Vec<Event>) -> (Vec<Session>, BuildStats) {
        events.sort_by_key(|e| (e.visitor_id, e.timestamp));

        let mut groups: Vec<Vec<SessionEvent>> = Vec::new();
        let mut prev: Option<Event> = None;

        for event in events {
            if self.is_boundary(prev.as_ref(), &event) {
                groups.push(Vec::new());
            }
            if let Some(group) = groups.last_mut() {
                group.push(event.clone().into_session_event());
            }
            prev = Some(event);
        }

        let raw_sessions = groups.len();
        let sessions: Vec<Session> = groups
            .into_iter()
            .filter(|events| events.len() > 1)
            .zip(1..)
            .map(|(events, id)| Session::new(id, events))
            .collect();

        let stats = BuildStats {
            raw_sessions,
            dropped_single_event: raw_sessions - sessions.len(),
        };
        (sessions, stats)
    }
}

/// Builds sessions with the default 30 minute timeout.
pub fn build_sessions(events: Vec<Event>) -> Vec<Session> {
    SessionBuilder::new().build(events)
}

/// Regroups persisted rows into sessions, keeping their ids.
///
/// Sessions come back in ascending id order with events sorted by timestamp.
pub fn group_session_rows(mut rows: Vec<SessionRow>) -> Vec<Session> {
    rows.sort_by_key(|r| (r.session_id, r.timestamp));

    let mut sessions: Vec<Session> = Vec::new();
    for row in rows {
        match sessions.last_mut() {
            Some(session) if session.id == row.session_id => session.events.push(row.event()),
            _ => sessions.push(Session::new(row.session_id, vec![row.event()])),
        }
    }
    sessions
}
