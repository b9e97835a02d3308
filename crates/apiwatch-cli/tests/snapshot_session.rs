use apiwatch_cli::commands::{DashboardSession, DataOptions, load_dashboard};
use apiwatch_core::analysis::DashboardOptions;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to get path to test fixtures
fn fixture_path(filename: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
        .join(filename)
}

#[allow(deprecated)]
fn get_apiwatch_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("apiwatch")
}

fn line(id: usize, api: &str, created_at: &str) -> String {
    format!(
        r#"{{"id": "{id}", "apiName": "{api}", "createdAt": "{created_at}", "response": "{{\"status\": true}}"}}"#
    )
}

/// Copy of the sample snapshot that a test may append to
fn writable_snapshot(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("logs.jsonl");
    fs::copy(fixture_path("sample.jsonl"), &path).unwrap();
    path
}

/// Only the 50,000 newest rows of a snapshot are analysed
#[test]
fn test_file_snapshot_keeps_newest_fifty_thousand_rows() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("large.jsonl");

    let mut content = String::new();
    for id in 0..10 {
        writeln!(content, "{}", line(id, "legacyDetails", "2024-01-01T08:00:00")).unwrap();
    }
    for id in 10..50_010 {
        writeln!(content, "{}", line(id, "panDetails", "2024-05-01T10:00:00")).unwrap();
    }
    fs::write(&path, content).unwrap();

    let data = DataOptions::from_file(&path).with_window("all");
    let dashboard = load_dashboard(&data, &DashboardOptions::default()).unwrap();

    assert_eq!(dashboard.report.overall.total, 50_000);
    assert!(
        dashboard
            .report
            .endpoints
            .iter()
            .all(|e| e.api_name != "legacyDetails")
    );
}

#[test]
fn test_row_limit_option_caps_file_snapshot() {
    let data = DataOptions::from_file(fixture_path("sample.jsonl"))
        .with_window("all")
        .with_row_limit(5);

    let dashboard = load_dashboard(&data, &DashboardOptions::default()).unwrap();
    assert_eq!(dashboard.report.overall.total, 5);
    let (_, end) = dashboard.report.date_range.unwrap();
    assert_eq!(end, "2024-05-02 12:00:00");
}

/// A second render within the TTL reuses the first fetch
#[test]
fn test_second_render_within_ttl_is_not_refetched() {
    let temp_dir = TempDir::new().unwrap();
    let path = writable_snapshot(&temp_dir);
    let data = DataOptions::from_file(&path).with_window("all");
    let session = DashboardSession::open(&data).unwrap();

    let first = session.load(&DashboardOptions::default()).unwrap();
    assert!(!first.cached);
    assert_eq!(first.report.overall.total, 23);

    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    writeln!(file, "{}", line(999, "panDetails", "2024-05-02T12:30:00")).unwrap();

    let second = session.load(&DashboardOptions::default()).unwrap();
    assert!(second.cached);
    assert_eq!(second.report.overall.total, 23);

    // A separate session fetches again and sees the new row
    let fresh = load_dashboard(&data, &DashboardOptions::default()).unwrap();
    assert!(!fresh.cached);
    assert_eq!(fresh.report.overall.total, 24);
}

#[test]
fn test_status_watch_renders_from_cache() {
    let mut cmd = Command::new(get_apiwatch_bin());
    cmd.env_remove("APIWATCH_FILE")
        .arg("-v")
        .arg("--file")
        .arg(fixture_path("sample.jsonl"))
        .arg("status")
        .arg("--watch")
        .arg("1")
        .arg("--count")
        .arg("2");

    let assert = cmd
        .assert()
        .success()
        .stderr(predicate::str::contains("cached: false"))
        .stderr(predicate::str::contains("cached: true"));

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert_eq!(stdout.matches("API Health Dashboard").count(), 2);
}

#[test]
fn test_count_requires_watch() {
    let mut cmd = Command::new(get_apiwatch_bin());
    cmd.arg("--file")
        .arg(fixture_path("sample.jsonl"))
        .arg("status")
        .arg("--count")
        .arg("2");

    cmd.assert().failure();
}
