use crate::Result;
use apiwatch_core::io::LogReader;
use apiwatch_core::record::LogRecord;
use async_trait::async_trait;
use std::path::PathBuf;

/// Where log records come from
///
/// Implementations return the most recent rows, newest first, bounded by
/// their row limit.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Human-readable origin, used in log lines and advisories
    fn describe(&self) -> String;

    async fn fetch(&self) -> Result<Vec<LogRecord>>;
}

#[async_trait]
impl<S: RecordSource + ?Sized> RecordSource for Box<S> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    async fn fetch(&self) -> Result<Vec<LogRecord>> {
        (**self).fetch().await
    }
}

/// Records read from a JSON or JSON Lines export
pub struct FileSource {
    path: PathBuf,
    row_limit: Option<usize>,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            row_limit: None,
        }
    }

    pub fn with_row_limit(mut self, limit: usize) -> Self {
        self.row_limit = Some(limit);
        self
    }
}

#[async_trait]
impl RecordSource for FileSource {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn fetch(&self) -> Result<Vec<LogRecord>> {
        tracing::debug!("Reading log snapshot from: {}", self.path.display());
        let content = tokio::fs::read_to_string(&self.path).await?;
        let mut records = LogReader::from_str(&content)?;

        newest_first(&mut records);
        if let Some(limit) = self.row_limit {
            records.truncate(limit);
        }

        tracing::debug!("Loaded {} records from {}", records.len(), self.path.display());
        Ok(records)
    }
}

/// Stable sort by `created_at`, descending
pub(crate) fn newest_first(records: &mut [LogRecord]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
