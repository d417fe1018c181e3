//! Batch jobs for the retail session pipeline.
//!
//! - Split (raw events → train/test session rows)
//! - Labels (test rows → trimmed sessions + leave-one-out labels)
//! - Evaluate (labels + predictions → recall@K and MRR)
//! - Categories (item properties + category tree → item categories)

pub mod categories;
pub mod config;
pub mod evaluate;
pub mod labels;
pub mod split;
mod stage;

pub use categories::{run_categories, CategoriesReport};
pub use config::PipelineConfig;
pub use evaluate::run_evaluate;
pub use labels::{run_labels, LabelsReport};
pub use split::{run_split, SplitReport};

/// Train rows written by the split job.
pub const TRAIN_SET_FILE: &str = "train_set.csv";
/// Test rows written by the split job.
pub const TEST_SET_FILE: &str = "test_set.csv";
/// Trimmed test sessions written by the labels job.
pub const TEST_SESSIONS_FILE: &str = "test_sessions.jsonl";
/// Label records written by the labels job.
pub const TEST_LABELS_FILE: &str = "test_labels.jsonl";
/// Category tree read by the categories job.
pub const CATEGORY_TREE_FILE: &str = "category_tree.csv";
/// Item property logs read by the categories job.
pub const ITEM_PROPERTIES_FILES: [&str; 2] = ["item_properties_part1.csv", "item_properties_part2.csv"];
/// Output of the categories job.
pub const ITEM_CATEGORIES_FILE: &str = "item_categories.csv";
