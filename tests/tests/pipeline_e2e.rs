//! End-to-end tests for split → labels → evaluate.
//!
//! Every job reads and writes real files in a temporary directory, so the
//! on-disk formats are exercised between stages.

use std::collections::BTreeSet;
use std::fs;

use dataset_io::{read_jsonl, read_session_rows};
use integration_tests::{fixtures, setup::TestContext};
use pipeline_jobs::{
    run_evaluate, run_labels, run_split, PipelineConfig, TEST_SET_FILE, TRAIN_SET_FILE,
};
use ranking_eval::read_labels;
use sessions_core::{EventKind, LabelKind, Session, SessionLabels};

fn split_fixture(ctx: &TestContext) -> pipeline_jobs::SplitReport {
    let input = ctx.write_raw("events.csv", &fixtures::events_csv(&fixtures::retail_event_log()));
    run_split(&ctx.config, &input, &ctx.split_dir()).expect("split job failed")
}

#[test]
fn test_split_partitions_sessions() {
    let ctx = TestContext::new();
    let report = split_fixture(&ctx);

    assert_eq!(report.events, 47);
    assert_eq!(report.sessions, 14);
    assert_eq!(report.dropped_single_event, 1);
    assert_eq!(report.qualifying_sessions, 12);
    assert_eq!(report.train_sessions, 6);
    assert_eq!(report.test_sessions, 6);
    assert_eq!(report.train_rows, 18);
    assert_eq!(report.test_rows, 24);

    let windows = report.windows.expect("windows for non-empty input");
    assert_eq!(windows.max_timestamp, i64::from(fixtures::MAX_TS));
    assert_eq!(windows.train_start, i64::from(fixtures::T0));

    let train = read_session_rows(&ctx.split_dir().join(TRAIN_SET_FILE)).unwrap();
    let test = read_session_rows(&ctx.split_dir().join(TEST_SET_FILE)).unwrap();

    let train_ids: BTreeSet<_> = train.iter().map(|r| r.session_id).collect();
    let test_ids: BTreeSet<_> = test.iter().map(|r| r.session_id).collect();
    assert_eq!(train_ids, (1..=6).collect());
    assert_eq!(test_ids, (7..=12).collect());

    assert!(train
        .windows(2)
        .all(|w| (w[0].session_id, w[0].timestamp) <= (w[1].session_id, w[1].timestamp)));
    assert!(test.iter().all(|r| i64::from(r.timestamp) >= windows.test_start));
}

#[test]
fn test_split_labels_evaluate_round_trip() {
    let ctx = TestContext::new();
    split_fixture(&ctx);

    let labels_report = run_labels(
        &ctx.config,
        &ctx.split_dir().join(TEST_SET_FILE),
        &ctx.labels_dir(),
    )
    .expect("labels job failed");
    assert_eq!(labels_report.sessions_labelled, 6);
    assert_eq!(labels_report.sessions_skipped, 0);

    // Trimmed sessions never reveal the purchase.
    let sessions: Vec<Session> = read_jsonl(&labels_report.sessions_path).unwrap();
    assert_eq!(sessions.len(), 6);
    for session in &sessions {
        assert!(!session.is_empty() && session.len() <= 2);
        assert!(session.events.iter().all(|e| e.kind == EventKind::View));
    }

    let records: Vec<SessionLabels> = read_jsonl(&labels_report.labels_path).unwrap();
    for record in &records {
        assert!(record.labels.non_empty(LabelKind::AddToCart).is_some());
        assert!(record.labels.non_empty(LabelKind::Transaction).is_some());
    }

    let labels = read_labels(fs::read_to_string(&labels_report.labels_path).unwrap().as_bytes()).unwrap();

    let perfect = ctx.write_out("perfect.csv", &fixtures::perfect_predictions(&labels));
    let scores = run_evaluate(&ctx.config, &labels_report.labels_path, &perfect).unwrap();
    assert_eq!(scores.recall[&LabelKind::AddToCart], 1.0);
    assert_eq!(scores.recall[&LabelKind::Transaction], 1.0);
    assert_eq!(scores.mrr[&LabelKind::AddToCart], Some(1.0));
    assert_eq!(scores.mrr[&LabelKind::Transaction], Some(1.0));

    let misses = ctx.write_out("misses.csv", &fixtures::constant_predictions(&labels, &[1, 2, 3]));
    let scores = run_evaluate(&ctx.config, &labels_report.labels_path, &misses).unwrap();
    assert_eq!(scores.recall[&LabelKind::AddToCart], 0.0);
    assert_eq!(scores.mrr[&LabelKind::Transaction], Some(0.0));
}

#[test]
fn test_labels_are_reproducible_per_seed() {
    let ctx = TestContext::new();
    split_fixture(&ctx);
    let test_set = ctx.split_dir().join(TEST_SET_FILE);

    let first = run_labels(&ctx.config, &test_set, &ctx.labels_dir().join("a")).unwrap();
    let second = run_labels(&ctx.config, &test_set, &ctx.labels_dir().join("b")).unwrap();

    assert_eq!(
        fs::read_to_string(&first.labels_path).unwrap(),
        fs::read_to_string(&second.labels_path).unwrap()
    );
    assert_eq!(
        fs::read_to_string(&first.sessions_path).unwrap(),
        fs::read_to_string(&second.sessions_path).unwrap()
    );
}

#[test]
fn test_short_gap_breaks_sessions_apart() {
    let ctx = TestContext::new().with_config(PipelineConfig {
        session_gap_secs: 45,
        ..Default::default()
    });
    let report = split_fixture(&ctx);

    // Only the two quick views of each test shopper and visitor 20 survive,
    // and none of them contains a cart or purchase.
    assert_eq!(report.sessions, 7);
    assert_eq!(report.qualifying_sessions, 0);
    assert_eq!(report.train_rows + report.test_rows, 0);
    assert_eq!(
        fs::read_to_string(ctx.split_dir().join(TRAIN_SET_FILE)).unwrap(),
        "timestamp,event,itemid,session\n"
    );
}

#[test]
fn test_non_positive_weeks_produce_empty_split() {
    let ctx = TestContext::new().with_config(PipelineConfig {
        train_weeks: 0,
        ..Default::default()
    });
    let report = split_fixture(&ctx);

    assert!(report.windows.is_none());
    assert_eq!(report.train_rows + report.test_rows, 0);
    assert!(read_session_rows(&ctx.split_dir().join(TEST_SET_FILE))
        .unwrap()
        .is_empty());
}
