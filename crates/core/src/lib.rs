//! Core types, session construction, temporal splitting and leave-one-out
//! labeling for the retail session pipeline.

pub mod categories;
pub mod error;
pub mod events;
pub mod labels;
pub mod schema;
pub mod session;
pub mod split;

pub use error::{Error, Result};
pub use events::*;
pub use labels::{ground_truth, split_events, LabeledTestSet, Labels, LeaveOneOutLabeler, SessionLabels};
pub use session::*;
pub use split::{split, SplitOutcome, SplitWindows, TemporalSplitter};
