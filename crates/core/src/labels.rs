//! Leave-one-out ground truth for test sessions.
//!
//! Each test session is cut at a point; the events before the cut are the
//! observed context and the items added to cart or bought after it are the
//! labels a recommender has to predict.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::events::{ItemId, LabelKind, SessionEvent, SessionId};
use crate::session::Session;

/// Default seed for choosing cut points.
pub const DEFAULT_SEED: u64 = 42;

/// Future interactions per tracked kind.
///
/// A kind with no items is absent rather than mapped to an empty set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Labels(BTreeMap<LabelKind, BTreeSet<ItemId>>);

impl Labels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the items for a kind. Empty sets are not stored.
    pub fn insert(&mut self, kind: LabelKind, items: BTreeSet<ItemId>) {
        if items.is_empty() {
            self.0.remove(&kind);
        } else {
            self.0.insert(kind, items);
        }
    }

    /// Items for a kind, as stored.
    pub fn get(&self, kind: LabelKind) -> Option<&BTreeSet<ItemId>> {
        self.0.get(&kind)
    }

    /// Items for a kind, treating an empty set as absent.
    pub fn non_empty(&self, kind: LabelKind) -> Option<&BTreeSet<ItemId>> {
        self.get(kind).filter(|items| !items.is_empty())
    }

    /// True when no kind has any item.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeSet::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (LabelKind, &BTreeSet<ItemId>)> {
        self.0.iter().map(|(kind, items)| (*kind, items))
    }
}

impl<I: Into<ItemId>> FromIterator<(LabelKind, Vec<I>)> for Labels {
    fn from_iter<T: IntoIterator<Item = (LabelKind, Vec<I>)>>(iter: T) -> Self {
        let mut labels = Labels::new();
        for (kind, items) in iter {
            labels.insert(kind, items.into_iter().map(Into::into).collect());
        }
        labels
    }
}

/// A session event with the interactions that follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledEvent {
    pub event: SessionEvent,
    pub labels: Labels,
}

/// Persisted label record for one test session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLabels {
    #[serde(rename = "session")]
    pub session_id: SessionId,
    pub labels: Labels,
}

/// Attaches to every event the items added to cart or bought after it.
///
/// One backward pass with one accumulator per tracked kind. The last event
/// has nothing after it, so the result is one element shorter than the input.
pub fn ground_truth(events: &[SessionEvent]) -> Vec<LabeledEvent> {
    let mut seen: BTreeMap<LabelKind, BTreeSet<ItemId>> = BTreeMap::new();
    let mut labeled = Vec::with_capacity(events.len());

    for event in events.iter().rev() {
        let mut labels = Labels::new();
        for (kind, items) in &seen {
            labels.insert(*kind, items.clone());
        }
        labeled.push(LabeledEvent {
            event: event.clone(),
            labels,
        });

        if let Some(kind) = event.kind.label_kind() {
            seen.entry(kind).or_default().insert(event.item_id.clone());
        }
    }

    labeled.reverse();
    labeled.pop();
    labeled
}

/// Cuts a session into an observed prefix and the labels at the cut.
///
/// With `split_idx` of `None` the cut is drawn uniformly from
/// `[1, last_possible_idx]`, where `last_possible_idx` is the last position
/// whose labels are non-empty; it is fixed at 1 when that position is 0 or
/// no position has labels.
pub fn split_events<R: Rng + ?Sized>(
    events: &[SessionEvent],
    split_idx: Option<usize>,
    rng: &mut R,
) -> Result<(Vec<SessionEvent>, Labels)> {
    if events.len() < 2 {
        return Err(Error::invalid_split(format!(
            "session needs at least 2 events, got {}",
            events.len()
        )));
    }

    let truth = ground_truth(events);

    let split_idx = match split_idx {
        Some(idx) if idx == 0 || idx > truth.len() => {
            return Err(Error::invalid_split(format!(
                "split index {} outside [1, {}]",
                idx,
                truth.len()
            )));
        }
        Some(idx) => idx,
        None => {
            let last_possible_idx = truth
                .iter()
                .rposition(|e| !e.labels.is_empty())
                .unwrap_or(0);
            if last_possible_idx == 0 {
                1
            } else {
                rng.gen_range(1..=last_possible_idx)
            }
        }
    };

    let labels = truth[split_idx - 1].labels.clone();
    let prefix = truth.into_iter().take(split_idx).map(|e| e.event).collect();
    Ok((prefix, labels))
}

/// Trimmed sessions and their labels for a whole test set.
#[derive(Debug, Clone, Default)]
pub struct LabeledTestSet {
    pub sessions: Vec<Session>,
    pub labels: Vec<SessionLabels>,
    /// Sessions skipped for having fewer than 2 events
    pub skipped: usize,
}

/// Produces trimmed sessions and label records from test sessions.
pub struct LeaveOneOutLabeler<R = ChaCha8Rng> {
    rng: R,
}

impl LeaveOneOutLabeler<ChaCha8Rng> {
    /// Creates a labeler whose cut points are reproducible for `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> LeaveOneOutLabeler<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Labels one session, or returns `None` if it is too short.
    pub fn label_session(&mut self, session: &Session) -> Result<Option<(Session, SessionLabels)>> {
        if session.len() < 2 {
            return Ok(None);
        }

        let (prefix, labels) = split_events(&session.events, None, &mut self.rng)?;
        Ok(Some((
            Session::new(session.id, prefix),
            SessionLabels {
                session_id: session.id,
                labels,
            },
        )))
    }

    /// Labels every session in ascending id order.
    pub fn label_sessions(&mut self, sessions: &[Session]) -> Result<LabeledTestSet> {
        let mut ordered: Vec<&Session> = sessions.iter().collect();
        ordered.sort_by_key(|s| s.id);

        let mut out = LabeledTestSet::default();
        for session in ordered {
            match self.label_session(session)? {
                Some((trimmed, labels)) => {
                    out.sessions.push(trimmed);
                    out.labels.push(labels);
                }
                None => out.skipped += 1,
            }
        }
        Ok(out)
    }
}
