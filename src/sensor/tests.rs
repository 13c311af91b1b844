use std::fs;
use std::path::PathBuf;

use tempfile::tempdir;

use super::layout::FEATURE_COUNT;
use super::loader::{load_sensor_file, load_with_target};
use crate::error::LearnError;

const CANONICAL_HEADER: &str =
    "timestamp,pir,touch_left,touch_right,light_left,light_right,ir_left,ir_right,label";

fn write_log(lines: &[&str]) -> (tempfile::TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data.csv");
    fs::write(&path, lines.join("\n")).unwrap();
    (dir, path)
}

#[test]
fn test_valid_rows_produce_eight_features_and_stripped_labels() {
    let (_dir, path) = write_log(&[
        CANONICAL_HEADER,
        "2021-06-01 00:00:00.000,1,0,0,300,280,-1,-1,'sit'",
        "2021-06-01 00:00:01.000,0,1,0,310,275,-1,-1,\"stand\"",
    ]);

    let dataset = load_sensor_file(&path).unwrap();

    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.features[0].len(), FEATURE_COUNT);
    assert_eq!(dataset.features[0][0], 1622505600.0);
    assert_eq!(dataset.features[0][1..], [1.0, 0.0, 0.0, 300.0, 280.0, -1.0, -1.0]);
    assert_eq!(dataset.labels, vec!["sit", "stand"]);
}

#[test]
fn test_empty_file_is_an_empty_dataset() {
    let (_dir, path) = write_log(&[]);
    let dataset = load_sensor_file(&path).unwrap();
    assert!(dataset.is_empty());
}

#[test]
fn test_header_only_file_is_an_empty_dataset() {
    let (_dir, path) = write_log(&[CANONICAL_HEADER]);
    let dataset = load_sensor_file(&path).unwrap();
    assert!(dataset.is_empty());
}

#[test]
fn test_short_row_is_an_error_not_a_truncation() {
    let (_dir, path) = write_log(&[
        CANONICAL_HEADER,
        "2021-06-01 00:00:00.000,1,0,0,300",
    ]);

    let err = load_sensor_file(&path).unwrap_err();
    assert!(matches!(err, LearnError::Csv(_)), "got {err}");
}

#[test]
fn test_missing_file_reports_resolved_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nope.csv");
    let err = load_sensor_file(&path).unwrap_err();

    match err {
        LearnError::MissingResource { path: reported } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_target_column_cites_name() {
    let (_dir, path) = write_log(&[
        CANONICAL_HEADER,
        "2021-06-01 00:00:00.000,1,0,0,300,280,-1,-1,'sit'",
    ]);

    let err = load_with_target(&path, "activity").unwrap_err();
    match err {
        LearnError::MissingColumn { name } => assert_eq!(name, "activity"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_reordered_header_loads_by_name() {
    // Right-before-left header from an older recorder revision.
    let (_dir, path) = write_log(&[
        "timestamp,pir,touch_right,touch_left,light_right,light_left,ir_right,ir_left,label",
        "2021-06-01 00:00:00.000,1,10,20,30,40,50,60,'sit'",
    ]);

    let dataset = load_sensor_file(&path).unwrap();
    // Canonical order: pir, touch_left, touch_right, light_left, light_right, ir_left, ir_right.
    assert_eq!(dataset.features[0][1..], [1.0, 20.0, 10.0, 40.0, 30.0, 60.0, 50.0]);
}

#[test]
fn test_bad_timestamp_is_an_error() {
    let (_dir, path) = write_log(&[
        CANONICAL_HEADER,
        "yesterday,1,0,0,300,280,-1,-1,'sit'",
    ]);

    let err = load_sensor_file(&path).unwrap_err();
    assert!(matches!(err, LearnError::Timestamp { .. }), "got {err}");
}

#[test]
fn test_non_numeric_reading_is_an_error() {
    let (_dir, path) = write_log(&[
        CANONICAL_HEADER,
        "2021-06-01 00:00:00.000,high,0,0,300,280,-1,-1,'sit'",
    ]);

    let err = load_sensor_file(&path).unwrap_err();
    assert!(matches!(err, LearnError::InvalidArgument(_)), "got {err}");
}
