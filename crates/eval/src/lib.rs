//! Ranking evaluation for next-item predictions.
//!
//! Predictions are scored against leave-one-out labels with recall@K per
//! event type and mean reciprocal rank.

pub mod input;
pub mod metrics;

pub use input::{parse_label_line, parse_prediction_line, read_labels, read_predictions, PredictionLine};
pub use metrics::*;
