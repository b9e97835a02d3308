use crate::record::LogRecord;
use crate::{Error, Result};
use std::fs;
use std::path::Path;

/// Reads log snapshots exported as a JSON array or as JSON Lines
pub struct LogReader;

impl LogReader {
    /// Read and parse a snapshot file
    pub fn from_file(path: &Path) -> Result<Vec<LogRecord>> {
        tracing::debug!("Reading log snapshot from: {}", path.display());

        let content = fs::read_to_string(path)?;
        let records = Self::from_str(&content)?;

        tracing::info!(
            "Loaded {} log records from {}",
            records.len(),
            path.display()
        );

        Ok(records)
    }

    /// Parse a snapshot from a string
    ///
    /// Content starting with `[` is a JSON array; anything else is read as
    /// one record per line, skipping blank lines.
    pub fn from_str(content: &str) -> Result<Vec<LogRecord>> {
        let trimmed = content.trim_start();

        if trimmed.starts_with('[') {
            tracing::debug!("Parsing log snapshot as JSON array");
            return Ok(serde_json::from_str(trimmed)?);
        }

        tracing::debug!("Parsing log snapshot as JSON Lines");
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str(line).map_err(|source| Error::InvalidLine {
                    line: idx + 1,
                    source,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RawResponse;

    #[test]
    fn test_parse_json_array() {
        let content = r#"[
            {"id": 1, "apiName": "panDetails", "createdAt": "2024-05-01 10:00:00", "response": "{\"status\": true}"},
            {"id": 2, "apiName": "mobileDetails", "createdAt": "2024-05-01 10:05:00", "response": null}
        ]"#;

        let records = LogReader::from_str(content).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].response, RawResponse::Missing);
    }

    #[test]
    fn test_parse_json_lines() {
        let content = concat!(
            r#"{"id": "a", "apiName": "panDetails", "createdAt": "2024-05-01T10:00:00", "response": {"status": false}}"#,
            "\n\n",
            r#"{"id": "b", "apiName": "vehicleDetails", "createdAt": "2024-05-01T11:00:00"}"#,
            "\n"
        );

        let records = LogReader::from_str(content).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "a");
        assert_eq!(records[1].response, RawResponse::Missing);
    }

    #[test]
    fn test_bad_line_reports_line_number() {
        let content = concat!(
            r#"{"apiName": "panDetails", "createdAt": "2024-05-01T10:00:00"}"#,
            "\n",
            r#"{"apiName": "panDetails", "createdAt": "last tuesday"}"#,
        );

        match LogReader::from_str(content) {
            Err(Error::InvalidLine { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected InvalidLine, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_content() {
        assert!(LogReader::from_str("").unwrap().is_empty());
        assert!(LogReader::from_str("[]").unwrap().is_empty());
    }
}
