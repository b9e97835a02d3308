use super::{Aggregator, EndpointSummary, StatusCounts};
use crate::record::ClassifiedRecord;
use std::collections::BTreeMap;

/// Per-endpoint summaries, worst success rate first
///
/// Ties are broken by endpoint name so the card order is identical across
/// runs over the same input.
pub struct EndpointAggregator;

impl Aggregator for EndpointAggregator {
    type Output = Vec<EndpointSummary>;

    fn aggregate(&self, records: &[ClassifiedRecord]) -> Self::Output {
        tracing::debug!("Aggregating {} records per endpoint", records.len());

        let mut groups: BTreeMap<&str, StatusCounts> = BTreeMap::new();
        for record in records {
            groups
                .entry(record.api_name())
                .or_default()
                .record(record.status);
        }

        let mut summaries: Vec<EndpointSummary> = groups
            .into_iter()
            .map(|(api_name, counts)| EndpointSummary::new(api_name, counts))
            .collect();

        summaries.sort_by(|a, b| {
            a.success_rate
                .total_cmp(&b.success_rate)
                .then_with(|| a.api_name.cmp(&b.api_name))
        });

        summaries
    }
}

/// Endpoints whose success rate is below the SLA threshold, in input order
pub fn sla_breaches(summaries: &[EndpointSummary]) -> Vec<EndpointSummary> {
    summaries
        .iter()
        .filter(|s| s.is_sla_breach())
        .cloned()
        .collect()
}
