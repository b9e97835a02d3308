use super::{Aggregator, HealthStatus, OverallSummary, StatusCounts};
use crate::record::ClassifiedRecord;

/// Whole-window totals and the health banner
pub struct OverallAggregator;

impl Aggregator for OverallAggregator {
    type Output = OverallSummary;

    fn aggregate(&self, records: &[ClassifiedRecord]) -> Self::Output {
        let counts: StatusCounts = records.iter().collect();
        let success_rate = counts.success_rate();

        OverallSummary {
            total: counts.total,
            success_count: counts.success,
            failure_count: counts.failure,
            no_data_count: counts.no_data,
            success_rate,
            health: HealthStatus::from_rate(success_rate),
        }
    }
}
