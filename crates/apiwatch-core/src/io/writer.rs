use crate::Result;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes records (raw or classified) as a JSON array or JSON Lines
pub struct LogWriter;

impl LogWriter {
    /// Write records to a file as a pretty-printed JSON array
    pub fn to_file<T: Serialize>(records: &[T], path: &Path) -> Result<()> {
        tracing::debug!("Writing {} records to: {}", records.len(), path.display());

        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, records)?;

        tracing::info!(
            "Successfully wrote {} records to {}",
            records.len(),
            path.display()
        );

        Ok(())
    }

    /// Write records to a file, one compact JSON document per line
    pub fn to_jsonl_file<T: Serialize>(records: &[T], path: &Path) -> Result<()> {
        tracing::debug!(
            "Writing {} records as JSON Lines to: {}",
            records.len(),
            path.display()
        );

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_jsonl(records, &mut writer)?;
        writer.flush()?;

        tracing::info!(
            "Successfully wrote {} records to {}",
            records.len(),
            path.display()
        );

        Ok(())
    }

    pub fn write_jsonl<T: Serialize, W: Write>(records: &[T], writer: &mut W) -> Result<()> {
        for record in records {
            serde_json::to_writer(&mut *writer, record)?;
            writer.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Convert records to a pretty JSON string
    pub fn to_string<T: Serialize>(records: &[T]) -> Result<String> {
        Ok(serde_json::to_string_pretty(records)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classifier;
    use crate::io::LogReader;
    use crate::record::{LogRecord, RawResponse};
    use chrono::NaiveDate;

    fn sample() -> Vec<LogRecord> {
        let created = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        vec![
            LogRecord::new(
                "1",
                "panDetails",
                created,
                RawResponse::Text(r#"{"status": false, "message": "Invalid PAN"}"#.to_string()),
            ),
            LogRecord::new("2", "mobileDetails", created, RawResponse::Missing),
        ]
    }

    #[test]
    fn test_jsonl_file_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.jsonl");

        LogWriter::to_jsonl_file(&sample(), &path).unwrap();
        let records = LogReader::from_file(&path).unwrap();
        assert_eq!(records, sample());
    }

    #[test]
    fn test_classified_records_are_flattened() {
        let classified = Classifier::default().classify_all(&sample());
        let json = LogWriter::to_string(&classified).unwrap();

        assert!(json.contains("\"apiName\": \"panDetails\""));
        assert!(json.contains("\"status\": \"Failure\""));
        assert!(json.contains("\"reason\": \"Invalid PAN\""));
        assert!(json.contains("\"reason\": \"Parse Error\""));
    }
}
