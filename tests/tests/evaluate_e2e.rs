//! Evaluation over label and prediction files.

use integration_tests::{fixtures, setup::TestContext};
use pipeline_jobs::{run_evaluate, PipelineConfig};
use sessions_core::{Error, LabelKind};

fn k(k: usize) -> PipelineConfig {
    PipelineConfig {
        k,
        ..Default::default()
    }
}

#[test]
fn test_three_session_scores() {
    let ctx = TestContext::new();
    let labels = ctx.write_out("test_labels.jsonl", &fixtures::scoring_labels_jsonl());
    let predictions = ctx.write_out("predictions.csv", &fixtures::scoring_predictions_csv());

    let scores = run_evaluate(&k(3), &labels, &predictions).unwrap();

    assert_eq!(scores.recall[&LabelKind::AddToCart], 3.0 / 9.0);
    assert_eq!(scores.recall[&LabelKind::Transaction], 1.0 / 5.0);
    assert_eq!(scores.mrr[&LabelKind::AddToCart], Some(1.0));
    assert_eq!(scores.mrr[&LabelKind::Transaction], Some(0.5));

    let json = serde_json::to_value(&scores).unwrap();
    assert_eq!(json["k"], 3);
    assert_eq!(json["mrr"]["addtocart"], 1.0);
}

#[test]
fn test_larger_cutoff_counts_more_hits() {
    let ctx = TestContext::new();
    let labels = ctx.write_out("test_labels.jsonl", &fixtures::scoring_labels_jsonl());
    let predictions = ctx.write_out("predictions.csv", &fixtures::scoring_predictions_csv());

    // k = 20: session 2 now also hits 1000007 and the transaction
    // denominator of session 1 grows to all 11 labels.
    let scores = run_evaluate(&k(20), &labels, &predictions).unwrap();
    assert_eq!(scores.recall[&LabelKind::AddToCart], 4.0 / 9.0);
    assert_eq!(scores.recall[&LabelKind::Transaction], 1.0 / 13.0);
}

#[test]
fn test_malformed_prediction_reports_line() {
    let ctx = TestContext::new();
    let labels = ctx.write_out("test_labels.jsonl", &fixtures::scoring_labels_jsonl());
    let predictions = ctx.write_out(
        "predictions.csv",
        "session_type,labels\n1_addtocart,1 2 3\n\n2_checkout,1\n",
    );

    let err = run_evaluate(&k(3), &labels, &predictions).unwrap_err();
    assert!(matches!(err, Error::MalformedPrediction { line: 4, .. }));
    assert_eq!(err.error_code(), Some("EVAL_001"));
}

#[test]
fn test_missing_predictions_file() {
    let ctx = TestContext::new();
    let labels = ctx.write_out("test_labels.jsonl", &fixtures::scoring_labels_jsonl());

    let err = run_evaluate(&k(3), &labels, &ctx.out_dir().join("absent.csv")).unwrap_err();
    assert!(matches!(err, Error::Storage(_)));
}

#[test]
fn test_no_transaction_labels_is_an_error() {
    let ctx = TestContext::new();
    let labels = ctx.write_out(
        "test_labels.jsonl",
        "{\"session\":1,\"labels\":{\"addtocart\":[4]}}\n",
    );
    let predictions = ctx.write_out("predictions.csv", "session_type,labels\n1_addtocart,4\n");

    let err = run_evaluate(&k(3), &labels, &predictions).unwrap_err();
    assert!(matches!(err, Error::ZeroDenominator(LabelKind::Transaction)));
    assert_eq!(err.error_code(), Some("EVAL_002"));
}
