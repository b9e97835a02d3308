mod endpoint_matcher;
mod window;

pub use endpoint_matcher::EndpointPattern;
pub use window::TimeWindow;

use crate::record::LogRecord;
use chrono::NaiveDateTime;

/// Filter criteria for log records
///
/// Both conditions are combined with AND logic. The filter is an immutable
/// value: builders consume and return it, and nothing reads filter state
/// from anywhere else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    /// Time window over `createdAt`
    pub window: TimeWindow,
    /// Endpoint patterns (any pattern matching = pass, empty = all pass)
    pub endpoints: Vec<EndpointPattern>,
}

impl FilterSpec {
    /// Create a new FilterSpec with default (no filtering)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    /// Add endpoint patterns from a list of pattern strings
    pub fn with_endpoints<I, S>(mut self, patterns: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            self.endpoints.push(EndpointPattern::parse(pattern.as_ref())?);
        }
        Ok(self)
    }

    /// Check if a record matches the endpoint criteria
    pub fn matches_endpoint(&self, api_name: &str) -> bool {
        if self.endpoints.is_empty() {
            return true;
        }
        self.endpoints.iter().any(|pattern| pattern.matches(api_name))
    }

    /// Check if a record matches all criteria
    ///
    /// `latest` is the newest `createdAt` of the snapshot the record came from.
    pub fn matches(&self, record: &LogRecord, latest: NaiveDateTime) -> bool {
        self.matches_endpoint(&record.api_name) && self.window.contains(record.created_at, latest)
    }
}

/// Earliest and latest `createdAt` of `records`, for display
pub fn resolved_bounds<R>(records: &[R]) -> Option<(NaiveDateTime, NaiveDateTime)>
where
    R: AsRef<LogRecord>,
{
    records
        .iter()
        .map(|r| r.as_ref().created_at)
        .fold(None, |bounds, ts| match bounds {
            None => Some((ts, ts)),
            Some((lo, hi)) => Some((lo.min(ts), hi.max(ts))),
        })
}

/// Newest `createdAt` in a snapshot
pub fn latest_timestamp<R>(records: &[R]) -> Option<NaiveDateTime>
where
    R: AsRef<LogRecord>,
{
    records.iter().map(|r| r.as_ref().created_at).max()
}

/// Filter records by a [`FilterSpec`]
///
/// Returns the matching records in input order. The lookback
/// anchor is the newest record of the whole input, before endpoint
/// filtering. An empty result is not an error.
pub fn filter_records<R>(records: &[R], spec: &FilterSpec) -> Vec<R>
where
    R: AsRef<LogRecord> + Clone,
{
    let Some(latest) = latest_timestamp(records) else {
        return Vec::new();
    };

    let filtered: Vec<R> = records
        .iter()
        .filter(|record| spec.matches(record.as_ref(), latest))
        .cloned()
        .collect();

    tracing::debug!(
        "Filter kept {} of {} records ({})",
        filtered.len(),
        records.len(),
        spec.window
    );

    filtered
}
