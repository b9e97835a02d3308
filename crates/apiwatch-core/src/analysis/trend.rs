use super::{Aggregator, StatusCounts, TimeBucketSummary};
use crate::record::ClassifiedRecord;
use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BucketGranularity {
    #[default]
    Hour,
    Day,
}

impl BucketGranularity {
    /// Start of the bucket containing `ts`
    pub fn bucket_start(&self, ts: NaiveDateTime) -> NaiveDateTime {
        let day_start = ts.date().and_time(NaiveTime::MIN);
        match self {
            BucketGranularity::Day => day_start,
            BucketGranularity::Hour => day_start + Duration::hours(i64::from(ts.hour())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BucketGranularity::Hour => "hour",
            BucketGranularity::Day => "day",
        }
    }
}

impl fmt::Display for BucketGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BucketGranularity {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "hour" | "hourly" | "h" => Ok(BucketGranularity::Hour),
            "day" | "daily" | "d" => Ok(BucketGranularity::Day),
            other => Err(crate::Error::InvalidWindow(format!(
                "Unknown bucket granularity: {}",
                other
            ))),
        }
    }
}

/// Success rate per time bucket
///
/// The series is sparse: buckets without records are omitted rather than
/// zero-filled.
pub struct TimeBucketAggregator {
    granularity: BucketGranularity,
}

impl TimeBucketAggregator {
    pub fn new(granularity: BucketGranularity) -> Self {
        Self { granularity }
    }
}

impl Default for TimeBucketAggregator {
    fn default() -> Self {
        Self::new(BucketGranularity::Hour)
    }
}

impl Aggregator for TimeBucketAggregator {
    type Output = Vec<TimeBucketSummary>;

    fn aggregate(&self, records: &[ClassifiedRecord]) -> Self::Output {
        tracing::debug!(
            "Bucketing {} records by {}",
            records.len(),
            self.granularity
        );

        let mut buckets: BTreeMap<NaiveDateTime, StatusCounts> = BTreeMap::new();
        for record in records {
            buckets
                .entry(self.granularity.bucket_start(record.created_at()))
                .or_default()
                .record(record.status);
        }

        buckets
            .into_iter()
            .map(|(bucket, counts)| TimeBucketSummary {
                bucket,
                total: counts.total,
                success_count: counts.success,
                failure_count: counts.failure,
                no_data_count: counts.no_data,
                success_rate: counts.success_rate(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{at, classified};
    use super::*;
    use crate::record::Status;

    #[test]
    fn test_hourly_buckets_are_sparse_and_ordered() {
        let records = vec![
            classified("a", Status::Success, "-", at(1, 14, 5)),
            classified("a", Status::Failure, "x", at(1, 9, 59)),
            classified("b", Status::Success, "-", at(1, 9, 0)),
            classified("b", Status::Success, "-", at(1, 14, 30)),
            classified("b", Status::NoData, "y", at(1, 14, 45)),
        ];

        let trend = TimeBucketAggregator::default().aggregate(&records);
        assert_eq!(trend.len(), 2);

        assert_eq!(trend[0].bucket, at(1, 9, 0));
        assert_eq!(trend[0].total, 2);
        assert_eq!(trend[0].success_rate, 50.0);

        assert_eq!(trend[1].bucket, at(1, 14, 0));
        assert_eq!(trend[1].total, 3);
        assert_eq!(trend[1].no_data_count, 1);
        assert_eq!(trend[1].success_rate, 66.7);
    }

    #[test]
    fn test_daily_buckets() {
        let records = vec![
            classified("a", Status::Success, "-", at(1, 0, 0)),
            classified("a", Status::Success, "-", at(1, 23, 59)),
            classified("a", Status::Failure, "x", at(4, 12, 0)),
        ];

        let trend = TimeBucketAggregator::new(BucketGranularity::Day).aggregate(&records);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].bucket, at(1, 0, 0));
        assert_eq!(trend[0].success_rate, 100.0);
        assert_eq!(trend[1].bucket, at(4, 0, 0));
        assert_eq!(trend[1].success_rate, 0.0);
    }

    #[test]
    fn test_parse_granularity() {
        assert_eq!("hour".parse::<BucketGranularity>().unwrap(), BucketGranularity::Hour);
        assert_eq!("Day".parse::<BucketGranularity>().unwrap(), BucketGranularity::Day);
        assert!("week".parse::<BucketGranularity>().is_err());
    }
}
