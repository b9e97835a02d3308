use crate::source::RecordSource;
use apiwatch_core::record::LogRecord;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const UNAVAILABLE_ADVISORY: &str = "Data source unavailable or empty";

/// One load of the log table
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub records: Arc<Vec<LogRecord>>,
    /// Set when the fetch failed; the records are then empty
    pub advisory: Option<String>,
    /// Served from memoized results rather than a new fetch
    pub cached: bool,
}

impl Snapshot {
    fn fetched(records: Arc<Vec<LogRecord>>, cached: bool) -> Self {
        Self {
            records,
            advisory: None,
            cached,
        }
    }

    /// Empty snapshot explaining why nothing could be loaded
    pub fn unavailable(cause: impl fmt::Display) -> Self {
        Self {
            records: Arc::new(Vec::new()),
            advisory: Some(format!("{}: {}", UNAVAILABLE_ADVISORY, cause)),
            cached: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Memoizes successful fetches of a [`RecordSource`] for a fixed TTL
///
/// Fetch failures are never fatal and never cached: they produce an empty
/// snapshot with an advisory, and the next load tries the source again.
pub struct CachedSource<S> {
    source: S,
    ttl: Duration,
    cached: Mutex<Option<(Instant, Arc<Vec<LogRecord>>)>>,
}

impl<S: RecordSource> CachedSource<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            cached: Mutex::new(None),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn load(&self) -> Snapshot {
        if let Some(records) = self.fresh() {
            tracing::debug!("Serving {} cached records", records.len());
            return Snapshot::fetched(records, true);
        }

        match self.source.fetch().await {
            Ok(records) => {
                let records = Arc::new(records);
                *self.cached.lock() = Some((Instant::now(), Arc::clone(&records)));
                Snapshot::fetched(records, false)
            }
            Err(e) => {
                tracing::warn!("Log fetch from {} failed: {}", self.source.describe(), e);
                Snapshot::unavailable(e)
            }
        }
    }

    fn fresh(&self) -> Option<Arc<Vec<LogRecord>>> {
        let guard = self.cached.lock();
        match guard.as_ref() {
            Some((fetched_at, records)) if fetched_at.elapsed() < self.ttl => {
                Some(Arc::clone(records))
            }
            _ => None,
        }
    }
}
