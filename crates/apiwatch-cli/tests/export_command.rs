use apiwatch_cli::commands::{self, DataOptions};
use apiwatch_core::io::LogReader;
use std::fs;
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

#[test]
fn test_export_jsonl() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("classified.jsonl");
    let data = DataOptions::from_file(fixture_path("sample.jsonl"));

    let written = commands::export::execute(&data, &output, true).unwrap();
    assert_eq!(written, 21);

    let content = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 21);

    // Snapshot order is newest first
    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["apiName"], "idfcCreateLoanApplicationId");
    assert_eq!(first["createdAt"], "2024-05-02T12:00:00");
    assert_eq!(first["status"], "Failure");
    assert_eq!(first["reason"], "Technical Error");
}

#[test]
fn test_export_json_array_reads_back() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("classified.json");
    let data = DataOptions::from_file(fixture_path("sample.jsonl"))
        .with_apis(vec!["mobileDetails".to_string()]);

    let written = commands::export::execute(&data, &output, false).unwrap();
    assert_eq!(written, 4);

    let records = LogReader::from_file(&output).unwrap();
    assert_eq!(records.len(), 4);
    assert!(records.iter().all(|r| r.api_name == "mobileDetails"));

    let content = fs::read_to_string(&output).unwrap();
    assert!(content.contains("\"status\": \"No Data\""));
    assert!(content.contains("\"reason\": \"Customer Not Found\""));
}
