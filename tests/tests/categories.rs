//! Category enrichment over a split produced by the split job.

use std::fs;

use integration_tests::{fixtures, setup::TestContext};
use pipeline_jobs::{run_categories, run_split, CATEGORY_TREE_FILE, ITEM_PROPERTIES_FILES};

const TREE: &str = "categoryid,parentid\n1016,213\n809,169\n570,9\n213,\n";

fn property_row(ts_secs: u32, item: u32, property: &str, value: &str) -> String {
    format!("{},{},{},{}\n", u64::from(ts_secs) * 1000, item, property, value)
}

#[test]
fn test_categories_follow_train_set_windows() {
    let ctx = TestContext::new();
    let events = ctx.write_raw("events.csv", &fixtures::events_csv(&fixtures::retail_event_log()));
    run_split(&ctx.config, &events, &ctx.split_dir()).unwrap();

    // The latest train event is visitor 6's cart at T0 + 12 days + 120 s,
    // so the category window ends two weeks before that.
    let inside = fixtures::T0 - fixtures::WEEK;
    let after = fixtures::T0 + 2 * fixtures::DAY;

    let header = "timestamp,itemid,property,value\n";
    let part1 = [
        header.to_string(),
        property_row(inside, 460429, "categoryid", "1016"),
        property_row(inside + 60, 460429, "categoryid", "1016"),
        property_row(inside, 206783, "available", "1"),
        property_row(after, 111, "categoryid", "809"),
    ]
    .concat();
    let part2 = [
        header.to_string(),
        property_row(inside, 395014, "categoryid", "4242"),
        property_row(inside, 59481, "categoryid", "213"),
    ]
    .concat();

    ctx.write_raw(CATEGORY_TREE_FILE, TREE);
    ctx.write_raw(ITEM_PROPERTIES_FILES[0], &part1);
    ctx.write_raw(ITEM_PROPERTIES_FILES[1], &part2);

    let report = run_categories(&ctx.config, &ctx.split_dir(), &ctx.raw_dir(), &ctx.out_dir()).unwrap();

    assert_eq!(report.categories, 4);
    assert_eq!(report.property_rows, 6);
    assert_eq!(report.item_categories, 3);
    assert_eq!(
        fs::read_to_string(&report.output_path).unwrap(),
        "itemid,categoryid,parentid\n59481,213,213\n395014,4242,4242\n460429,1016,213\n"
    );
}

#[test]
fn test_bad_category_value_fails() {
    let ctx = TestContext::new();
    let events = ctx.write_raw("events.csv", &fixtures::events_csv(&fixtures::retail_event_log()));
    run_split(&ctx.config, &events, &ctx.split_dir()).unwrap();

    let header = "timestamp,itemid,property,value\n";
    ctx.write_raw(CATEGORY_TREE_FILE, TREE);
    ctx.write_raw(
        ITEM_PROPERTIES_FILES[0],
        &[header.to_string(), property_row(fixtures::T0, 1, "categoryid", "n1016")].concat(),
    );
    ctx.write_raw(ITEM_PROPERTIES_FILES[1], header);

    let err = run_categories(&ctx.config, &ctx.split_dir(), &ctx.raw_dir(), &ctx.out_dir()).unwrap_err();
    assert!(err.is_schema_error());
}

#[test]
fn test_missing_property_file_fails() {
    let ctx = TestContext::new();
    let events = ctx.write_raw("events.csv", &fixtures::events_csv(&fixtures::retail_event_log()));
    run_split(&ctx.config, &events, &ctx.split_dir()).unwrap();
    ctx.write_raw(CATEGORY_TREE_FILE, TREE);

    let err = run_categories(&ctx.config, &ctx.split_dir(), &ctx.raw_dir(), &ctx.out_dir()).unwrap_err();
    assert!(matches!(err, sessions_core::Error::Storage(_)));
}
