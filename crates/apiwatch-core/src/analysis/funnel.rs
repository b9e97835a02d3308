use super::{Aggregator, FunnelStage, StatusCounts, percentage};
use crate::record::ClassifiedRecord;
use std::collections::HashMap;

/// Loan origination funnel, entry point first
pub const DEFAULT_FUNNEL: [&str; 5] = [
    "mobileDetails",
    "vehicleDetails",
    "panDetails",
    "cibilDetails",
    "idfcCreateLoanApplicationId",
];

/// Request and success counts along an ordered sequence of endpoints
///
/// Drop percentages are measured against the first stage's request count,
/// not the previous stage: `(requests - successes) / first_requests * 100`.
pub struct FunnelAggregator {
    stages: Vec<String>,
}

impl FunnelAggregator {
    pub fn new(stages: Vec<String>) -> Self {
        Self { stages }
    }

    pub fn stages(&self) -> &[String] {
        &self.stages
    }
}

impl Default for FunnelAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_FUNNEL.iter().map(|s| s.to_string()).collect())
    }
}

impl Aggregator for FunnelAggregator {
    type Output = Vec<FunnelStage>;

    fn aggregate(&self, records: &[ClassifiedRecord]) -> Self::Output {
        let mut per_endpoint: HashMap<&str, StatusCounts> = HashMap::new();
        for record in records {
            per_endpoint
                .entry(record.api_name())
                .or_default()
                .record(record.status);
        }

        let stage_counts: Vec<(&String, StatusCounts)> = self
            .stages
            .iter()
            .map(|stage| {
                let counts = per_endpoint.get(stage.as_str()).copied().unwrap_or_default();
                (stage, counts)
            })
            .collect();

        let entry_requests = stage_counts.first().map(|(_, c)| c.total).unwrap_or(0);

        stage_counts
            .into_iter()
            .map(|(stage, counts)| FunnelStage {
                api_name: stage.clone(),
                requests: counts.total,
                successes: counts.success,
                drop_percent: percentage(counts.total - counts.success, entry_requests),
            })
            .collect()
    }
}
