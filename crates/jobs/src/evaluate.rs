//! Labels + predictions → recall@K and MRR.

use std::path::Path;

use dataset_io::open_reader;
use ranking_eval::{get_scores, read_labels, read_predictions, Scores};
use sessions_core::Result;
use telemetry::metrics;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::stage::Stage;

/// Scores the predictions file against the label file at cutoff `config.k`.
#[instrument(
    name = "evaluate",
    skip_all,
    fields(run_id = %Uuid::new_v4(), labels = %test_labels.display(), predictions = %predictions.display())
)]
pub fn run_evaluate(config: &PipelineConfig, test_labels: &Path, predictions: &Path) -> Result<Scores> {
    config.check()?;
    info!(k = config.k, "Starting evaluate job");

    let stage = Stage::start("read_labels");
    let labels = read_labels(open_reader(test_labels)?)?;
    metrics().labels_read.inc_by(labels.len() as u64);
    stage.finish(labels.len());

    let stage = Stage::start("read_predictions");
    let predictions = read_predictions(open_reader(predictions)?)?;
    metrics().predictions_read.inc_by(predictions.len() as u64);
    stage.finish(predictions.len());

    let stage = Stage::start("score");
    let scores = get_scores(&labels, &predictions, config.k)?;
    stage.finish(labels.len());

    info!(%scores, "Evaluate job complete");
    metrics().log_snapshot("evaluate");

    Ok(scores)
}
