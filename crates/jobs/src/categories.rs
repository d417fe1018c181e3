//! Item properties + category tree → item categories.

use std::path::{Path, PathBuf};

use dataset_io::{
    ensure_dir, read_category_tree, read_item_properties, read_session_rows, write_item_categories,
};
use serde::Serialize;
use sessions_core::categories::{item_categories, CategoryTree};
use sessions_core::split::SplitWindows;
use sessions_core::Result;
use telemetry::metrics;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::stage::Stage;
use crate::{CATEGORY_TREE_FILE, ITEM_CATEGORIES_FILE, ITEM_PROPERTIES_FILES, TRAIN_SET_FILE};

/// Outcome of a categories run.
#[derive(Debug, Clone, Serialize)]
pub struct CategoriesReport {
    pub categories: usize,
    pub property_rows: usize,
    pub item_categories: usize,
    pub windows: Option<SplitWindows>,
    pub output_path: PathBuf,
}

/// Writes `item_categories.csv` into `output_dir`.
///
/// Windows are derived from the latest timestamp in
/// `train_set_dir/train_set.csv`; the category tree and both item property
/// files are read from `input_dir`.
#[instrument(
    name = "categories",
    skip_all,
    fields(run_id = %Uuid::new_v4(), input = %input_dir.display())
)]
pub fn run_categories(
    config: &PipelineConfig,
    train_set_dir: &Path,
    input_dir: &Path,
    output_dir: &Path,
) -> Result<CategoriesReport> {
    config.check()?;
    info!(
        train_weeks = config.train_weeks,
        test_weeks = config.test_weeks,
        "Starting categories job"
    );

    let stage = Stage::start("read_train_set");
    let train = read_session_rows(&train_set_dir.join(TRAIN_SET_FILE))?;
    stage.finish(train.len());

    let windows = train
        .iter()
        .map(|r| r.timestamp)
        .max()
        .and_then(|max| SplitWindows::from_max_timestamp(max, config.train_weeks, config.test_weeks));

    let stage = Stage::start("read_category_tree");
    let tree = CategoryTree::from_rows(read_category_tree(&input_dir.join(CATEGORY_TREE_FILE))?);
    stage.finish(tree.len());

    let stage = Stage::start("read_item_properties");
    let mut properties = Vec::new();
    for file in ITEM_PROPERTIES_FILES {
        properties.extend(read_item_properties(&input_dir.join(file))?);
    }
    let property_rows = properties.len();
    stage.finish(property_rows);

    let stage = Stage::start("join_categories");
    let rows = match &windows {
        Some(windows) => item_categories(&tree, properties, windows)?,
        None => {
            warn!(
                train_rows = train.len(),
                train_weeks = config.train_weeks,
                test_weeks = config.test_weeks,
                "No train window to select item properties"
            );
            Vec::new()
        }
    };
    stage.finish(rows.len());

    ensure_dir(output_dir)?;
    let output_path = output_dir.join(ITEM_CATEGORIES_FILE);
    write_item_categories(&output_path, &rows)?;
    metrics().item_categories_written.inc_by(rows.len() as u64);

    info!(rows = rows.len(), "Categories job complete");
    metrics().log_snapshot("categories");

    Ok(CategoriesReport {
        categories: tree.len(),
        property_rows,
        item_categories: rows.len(),
        windows,
        output_path,
    })
}
