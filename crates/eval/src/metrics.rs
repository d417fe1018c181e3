//! Recall@K and MRR by interaction kind.
//!
//! Three outcomes are kept apart throughout: a kind with nothing to evaluate
//! (`None`), a kind evaluated with no hits (`Some(0)`), and a kind with hits.
//! Collapsing the first two changes the recall denominator relationship.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use sessions_core::{Error, ItemId, LabelKind, Labels, Result, SessionId};

/// Default cutoff for recall.
pub const DEFAULT_K: usize = 20;

/// Ranked items per kind for one session.
pub type Prediction = BTreeMap<LabelKind, Vec<ItemId>>;

/// Predictions keyed by session.
pub type Predictions = BTreeMap<SessionId, Prediction>;

/// Ground truth keyed by session.
pub type SessionLabelMap = BTreeMap<SessionId, Labels>;

/// Hit count per kind for one session; `None` when there was nothing to score.
pub type SessionHits = BTreeMap<LabelKind, Option<usize>>;

/// Hit counts keyed by session.
pub type EvaluatedSessions = BTreeMap<SessionId, SessionHits>;

/// Hits of the top `k` predictions against the labels, per kind.
///
/// A kind is scored only when its label set is non-empty and the prediction
/// holds a non-empty list for it; otherwise it is `None`.
pub fn evaluate_session(labels: &Labels, prediction: &Prediction, k: usize) -> SessionHits {
    LabelKind::ALL
        .iter()
        .map(|&kind| {
            let ranked = prediction.get(&kind).filter(|ranked| !ranked.is_empty());
            let hits = match (labels.non_empty(kind), ranked) {
                (Some(relevant), Some(ranked)) => Some(
                    ranked
                        .iter()
                        .take(k)
                        .collect::<BTreeSet<_>>()
                        .into_iter()
                        .filter(|item| relevant.contains(*item))
                        .count(),
                ),
                _ => None,
            };
            (kind, hits)
        })
        .collect()
}

/// Scores every labeled session.
///
/// A session without a prediction counts as a total miss: zero hits for each
/// kind that has labels.
pub fn evaluate_sessions(labels: &SessionLabelMap, predictions: &Predictions, k: usize) -> EvaluatedSessions {
    labels
        .iter()
        .map(|(session_id, session_labels)| {
            let hits = match predictions.get(session_id) {
                Some(prediction) => evaluate_session(session_labels, prediction, k),
                None => missed(session_labels),
            };
            (*session_id, hits)
        })
        .collect()
}

fn missed(labels: &Labels) -> SessionHits {
    LabelKind::ALL
        .iter()
        .map(|&kind| (kind, labels.non_empty(kind).map(|_| 0)))
        .collect()
}

/// Recall denominators: per kind, the sum over sessions of `min(|labels|, k)`.
pub fn num_events(labels: &SessionLabelMap, k: usize) -> BTreeMap<LabelKind, usize> {
    let mut totals: BTreeMap<LabelKind, usize> = LabelKind::ALL.iter().map(|&kind| (kind, 0)).collect();

    for session_labels in labels.values() {
        for kind in LabelKind::ALL {
            if let Some(items) = session_labels.non_empty(kind) {
                *totals.entry(kind).or_default() += items.len().min(k);
            }
        }
    }
    totals
}

/// Total hits divided by the denominator from [`num_events`], per kind.
///
/// Fails with [`Error::ZeroDenominator`] when a kind has no relevant events.
pub fn recall_by_event_type(
    evaluated: &EvaluatedSessions,
    totals: &BTreeMap<LabelKind, usize>,
) -> Result<BTreeMap<LabelKind, f64>> {
    LabelKind::ALL
        .iter()
        .map(|&kind| {
            let hits: usize = evaluated
                .values()
                .filter_map(|hits| hits.get(&kind).copied().flatten())
                .sum();
            let total = totals.get(&kind).copied().unwrap_or(0);
            if total == 0 {
                return Err(Error::ZeroDenominator(kind));
            }
            Ok((kind, hits as f64 / total as f64))
        })
        .collect()
}

/// Reciprocal rank of the first relevant item, or 0 when none is ranked.
pub fn reciprocal_rank(ranked: &[ItemId], relevant: &BTreeSet<ItemId>) -> f64 {
    ranked
        .iter()
        .position(|item| relevant.contains(item))
        .map(|i| 1.0 / (i + 1) as f64)
        .unwrap_or(0.0)
}

/// Mean reciprocal rank per kind over the full ranked lists.
///
/// A session counts for a kind when it has a non-empty label set and any
/// prediction list for that kind, even an empty one. Kinds with no such
/// session are `None`. Predicted sessions without labels are ignored.
pub fn mrr_by_event_type(predictions: &Predictions, labels: &SessionLabelMap) -> BTreeMap<LabelKind, Option<f64>> {
    let mut ranks: BTreeMap<LabelKind, Vec<f64>> = BTreeMap::new();

    for (session_id, prediction) in predictions {
        let Some(session_labels) = labels.get(session_id) else {
            continue;
        };
        for kind in LabelKind::ALL {
            if let (Some(ranked), Some(relevant)) = (prediction.get(&kind), session_labels.non_empty(kind)) {
                ranks
                    .entry(kind)
                    .or_default()
                    .push(reciprocal_rank(ranked, relevant));
            }
        }
    }

    LabelKind::ALL
        .iter()
        .map(|&kind| {
            let mean = ranks
                .get(&kind)
                .filter(|rs| !rs.is_empty())
                .map(|rs| rs.iter().sum::<f64>() / rs.len() as f64);
            (kind, mean)
        })
        .collect()
}

/// Aggregate scores for one prediction run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scores {
    pub k: usize,
    pub recall: BTreeMap<LabelKind, f64>,
    pub mrr: BTreeMap<LabelKind, Option<f64>>,
}

/// Computes recall@k and MRR by event type.
pub fn get_scores(labels: &SessionLabelMap, predictions: &Predictions, k: usize) -> Result<Scores> {
    let totals = num_events(labels, k);
    let evaluated = evaluate_sessions(labels, predictions, k);
    let recall = recall_by_event_type(&evaluated, &totals)?;
    let mrr = mrr_by_event_type(predictions, labels);
    Ok(Scores { k, recall, mrr })
}

impl fmt::Display for Scores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Recall@{}:", self.k)?;
        for (kind, recall) in &self.recall {
            write!(f, " {}={:.4}", kind, recall)?;
        }
        write!(f, " | MRR:")?;
        for (kind, mrr) in &self.mrr {
            match mrr {
                Some(mrr) => write!(f, " {}={:.4}", kind, mrr)?,
                None => write!(f, " {}=n/a", kind)?,
            }
        }
        Ok(())
    }
}
