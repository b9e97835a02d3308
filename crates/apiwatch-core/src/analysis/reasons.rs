use super::{Aggregator, FailureReasonCount};
use crate::record::{ClassifiedRecord, Status};
use std::collections::HashMap;

pub const DEFAULT_TOP_REASONS: usize = 15;

/// Most frequent (endpoint, reason) pairs among unsuccessful calls
pub struct FailureReasonAggregator {
    top_n: usize,
    include_no_data: bool,
}

impl FailureReasonAggregator {
    pub fn new(top_n: usize) -> Self {
        Self {
            top_n,
            include_no_data: true,
        }
    }

    /// Whether No Data records are counted alongside failures
    pub fn with_no_data(mut self, include: bool) -> Self {
        self.include_no_data = include;
        self
    }

    fn counts(&self, status: Status) -> bool {
        match status {
            Status::Success => false,
            Status::Failure => true,
            Status::NoData => self.include_no_data,
        }
    }
}

impl Default for FailureReasonAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_REASONS)
    }
}

impl Aggregator for FailureReasonAggregator {
    type Output = Vec<FailureReasonCount>;

    fn aggregate(&self, records: &[ClassifiedRecord]) -> Self::Output {
        let mut groups: HashMap<(&str, &str), usize> = HashMap::new();
        for record in records.iter().filter(|r| self.counts(r.status)) {
            *groups
                .entry((record.api_name(), record.reason.as_str()))
                .or_insert(0) += 1;
        }

        let mut reasons: Vec<FailureReasonCount> = groups
            .into_iter()
            .map(|((api_name, reason), count)| FailureReasonCount {
                api_name: api_name.to_string(),
                reason: reason.to_string(),
                count,
            })
            .collect();

        reasons.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.api_name.cmp(&b.api_name))
                .then_with(|| a.reason.cmp(&b.reason))
        });
        reasons.truncate(self.top_n);

        reasons
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::repeat;
    use super::*;

    fn sample() -> Vec<ClassifiedRecord> {
        let mut records = repeat("panDetails", Status::Failure, "Invalid PAN", 4);
        records.extend(repeat("panDetails", Status::Failure, "Technical Error", 2));
        records.extend(repeat("cibilDetails", Status::Failure, "Timeout", 2));
        records.extend(repeat("mobileDetails", Status::NoData, "Customer Not Found", 3));
        records.extend(repeat("panDetails", Status::Success, "-", 10));
        records
    }

    #[test]
    fn test_sorted_by_count_then_name() {
        let reasons = FailureReasonAggregator::default().aggregate(&sample());
        let rows: Vec<(&str, &str, usize)> = reasons
            .iter()
            .map(|r| (r.api_name.as_str(), r.reason.as_str(), r.count))
            .collect();

        assert_eq!(
            rows,
            vec![
                ("panDetails", "Invalid PAN", 4),
                ("mobileDetails", "Customer Not Found", 3),
                ("cibilDetails", "Timeout", 2),
                ("panDetails", "Technical Error", 2),
            ]
        );
    }

    #[test]
    fn test_failures_only() {
        let reasons = FailureReasonAggregator::default()
            .with_no_data(false)
            .aggregate(&sample());
        assert_eq!(reasons.len(), 3);
        assert!(reasons.iter().all(|r| r.api_name != "mobileDetails"));
    }

    #[test]
    fn test_top_n() {
        let reasons = FailureReasonAggregator::new(2).aggregate(&sample());
        assert_eq!(reasons.len(), 2);
        assert_eq!(reasons[1].reason, "Customer Not Found");
    }

    #[test]
    fn test_all_successful() {
        let records = repeat("panDetails", Status::Success, "-", 5);
        assert!(FailureReasonAggregator::default().aggregate(&records).is_empty());
    }
}
