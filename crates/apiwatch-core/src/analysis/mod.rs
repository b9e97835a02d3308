mod endpoint;
mod funnel;
mod overall;
mod reasons;
mod trend;

pub use endpoint::{EndpointAggregator, sla_breaches};
pub use funnel::{DEFAULT_FUNNEL, FunnelAggregator};
pub use overall::OverallAggregator;
pub use reasons::{DEFAULT_TOP_REASONS, FailureReasonAggregator};
pub use trend::{BucketGranularity, TimeBucketAggregator};

use crate::classify::Classifier;
use crate::filter::{FilterSpec, filter_records, resolved_bounds};
use crate::record::{ClassifiedRecord, LogRecord, Status, timestamp};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

/// An endpoint below this success rate is in SLA breach
pub const SLA_BREACH_THRESHOLD: f64 = 90.0;
/// Reference line for trend output
pub const SLA_TARGET: f64 = 95.0;
/// Lowest success rate still reported as healthy
pub const HEALTHY_THRESHOLD: f64 = 97.0;
/// Lowest success rate still reported as degraded
pub const DEGRADED_THRESHOLD: f64 = 90.0;

/// Percentage rounded to one decimal; 0 when the denominator is 0
pub fn percentage(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round_one_decimal(numerator as f64 / denominator as f64 * 100.0)
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Overall health tier of a success rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Critical,
}

impl HealthStatus {
    /// Boundary values belong to the higher tier
    pub fn from_rate(rate: f64) -> Self {
        if rate >= HEALTHY_THRESHOLD {
            HealthStatus::Healthy
        } else if rate >= DEGRADED_THRESHOLD {
            HealthStatus::Degraded
        } else {
            HealthStatus::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "HEALTHY",
            HealthStatus::Degraded => "DEGRADED",
            HealthStatus::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-status tallies shared by every summary shape
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: usize,
    pub success: usize,
    pub failure: usize,
    pub no_data: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: Status) {
        self.total += 1;
        match status {
            Status::Success => self.success += 1,
            Status::Failure => self.failure += 1,
            Status::NoData => self.no_data += 1,
        }
    }

    pub fn success_rate(&self) -> f64 {
        percentage(self.success, self.total)
    }
}

impl<'a> FromIterator<&'a ClassifiedRecord> for StatusCounts {
    fn from_iter<I: IntoIterator<Item = &'a ClassifiedRecord>>(iter: I) -> Self {
        let mut counts = StatusCounts::default();
        for record in iter {
            counts.record(record.status);
        }
        counts
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSummary {
    pub api_name: String,
    pub total: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub no_data_count: usize,
    pub success_rate: f64,
}

impl EndpointSummary {
    pub fn new(api_name: impl Into<String>, counts: StatusCounts) -> Self {
        Self {
            api_name: api_name.into(),
            total: counts.total,
            success_count: counts.success,
            failure_count: counts.failure,
            no_data_count: counts.no_data,
            success_rate: counts.success_rate(),
        }
    }

    pub fn is_sla_breach(&self) -> bool {
        self.success_rate < SLA_BREACH_THRESHOLD
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus::from_rate(self.success_rate)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBucketSummary {
    #[serde(with = "timestamp")]
    pub bucket: NaiveDateTime,
    pub total: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub no_data_count: usize,
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReasonCount {
    pub api_name: String,
    pub reason: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelStage {
    pub api_name: String,
    pub requests: usize,
    pub successes: usize,
    /// Unsuccessful requests as a share of the first stage's requests
    pub drop_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallSummary {
    pub total: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub no_data_count: usize,
    pub success_rate: f64,
    pub health: HealthStatus,
}

pub trait Aggregator {
    type Output;

    fn aggregate(&self, records: &[ClassifiedRecord]) -> Self::Output;
}

/// Endpoint summaries and the trend series in one pass
pub fn aggregate(
    records: &[ClassifiedRecord],
    granularity: BucketGranularity,
) -> (Vec<EndpointSummary>, Vec<TimeBucketSummary>) {
    (
        EndpointAggregator.aggregate(records),
        TimeBucketAggregator::new(granularity).aggregate(records),
    )
}

/// Knobs for [`DashboardReport::build`]
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardOptions {
    pub granularity: BucketGranularity,
    pub top_reasons: usize,
    pub include_no_data_reasons: bool,
    pub funnel_stages: Vec<String>,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            granularity: BucketGranularity::Hour,
            top_reasons: DEFAULT_TOP_REASONS,
            include_no_data_reasons: true,
            funnel_stages: DEFAULT_FUNNEL.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Everything the presentation layer renders for one window
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub window: String,
    pub date_range: Option<(String, String)>,
    pub overall: OverallSummary,
    pub endpoints: Vec<EndpointSummary>,
    pub breaches: Vec<EndpointSummary>,
    pub trend: Vec<TimeBucketSummary>,
    pub failure_reasons: Vec<FailureReasonCount>,
    pub funnel: Vec<FunnelStage>,
}

impl DashboardReport {
    /// Aggregate already filtered, classified records
    pub fn build(
        records: &[ClassifiedRecord],
        window_label: impl Into<String>,
        options: &DashboardOptions,
    ) -> Self {
        let (endpoints, trend) = aggregate(records, options.granularity);
        let breaches = sla_breaches(&endpoints);

        let date_range =
            resolved_bounds(records).map(|(start, end)| (start.to_string(), end.to_string()));

        let report = Self {
            window: window_label.into(),
            date_range,
            overall: OverallAggregator.aggregate(records),
            endpoints,
            breaches,
            trend,
            failure_reasons: FailureReasonAggregator::new(options.top_reasons)
                .with_no_data(options.include_no_data_reasons)
                .aggregate(records),
            funnel: FunnelAggregator::new(options.funnel_stages.clone()).aggregate(records),
        };

        tracing::info!(
            "Dashboard built: {} records, {} endpoints, {} in breach, health {}",
            report.overall.total,
            report.endpoints.len(),
            report.breaches.len(),
            report.overall.health
        );

        report
    }
}

/// Filter, classify and aggregate one snapshot
pub fn run_pipeline(
    records: &[LogRecord],
    spec: &FilterSpec,
    classifier: &Classifier,
    options: &DashboardOptions,
) -> (Vec<ClassifiedRecord>, DashboardReport) {
    let filtered = filter_records(records, spec);
    let classified = classifier.classify_all(&filtered);
    let report = DashboardReport::build(&classified, spec.window.label(), options);
    (classified, report)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::filter::TimeWindow;
    use crate::record::RawResponse;
    use proptest::prelude::*;

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(7, 10), 70.0);
        assert_eq!(percentage(2, 3), 66.7);
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(5, 5), 100.0);
    }

    #[test]
    fn test_health_boundaries() {
        assert_eq!(HealthStatus::from_rate(100.0), HealthStatus::Healthy);
        assert_eq!(HealthStatus::from_rate(97.0), HealthStatus::Healthy);
        assert_eq!(HealthStatus::from_rate(96.9), HealthStatus::Degraded);
        assert_eq!(HealthStatus::from_rate(90.0), HealthStatus::Degraded);
        assert_eq!(HealthStatus::from_rate(89.9), HealthStatus::Critical);
        assert_eq!(HealthStatus::from_rate(0.0), HealthStatus::Critical);
    }

    #[test]
    fn test_seventy_percent_is_critical() {
        let mut records = repeat("endpointA", Status::Success, "-", 7);
        records.extend(repeat("endpointA", Status::Failure, "Invalid PAN", 2));
        records.extend(repeat("endpointA", Status::NoData, "Customer Not Found", 1));

        let report = DashboardReport::build(&records, "All Time", &DashboardOptions::default());
        assert_eq!(report.overall.total, 10);
        assert_eq!(report.overall.success_rate, 70.0);
        assert_eq!(report.overall.health, HealthStatus::Critical);
        assert_eq!(report.endpoints.len(), 1);
        assert!(report.endpoints[0].is_sla_breach());
        assert_eq!(report.breaches.len(), 1);
    }

    #[test]
    fn test_empty_dashboard_is_all_zero() {
        let report = DashboardReport::build(&[], "Last 24 Hours", &DashboardOptions::default());
        assert_eq!(report.overall.total, 0);
        assert_eq!(report.overall.success_rate, 0.0);
        assert!(report.endpoints.is_empty());
        assert!(report.trend.is_empty());
        assert!(report.failure_reasons.is_empty());
        assert!(report.date_range.is_none());
        assert!(report.funnel.iter().all(|s| s.requests == 0 && s.drop_percent == 0.0));
    }

    #[test]
    fn test_run_pipeline_end_to_end() {
        let records = vec![
            LogRecord::new(
                "1",
                "panDetails",
                at(1, 9, 0),
                RawResponse::Text(r#"{"status": true, "data": {"x": 1}}"#.to_string()),
            ),
            LogRecord::new(
                "2",
                "mobileDetails",
                at(3, 9, 0),
                RawResponse::Text(r#"{"status": true, "data": null}"#.to_string()),
            ),
            LogRecord::new(
                "3",
                "panDetails",
                at(3, 10, 0),
                RawResponse::Text("not json".to_string()),
            ),
        ];
        let spec = FilterSpec::new().with_window(TimeWindow::Last24Hours);

        let (classified, report) = run_pipeline(
            &records,
            &spec,
            &Classifier::default(),
            &DashboardOptions::default(),
        );

        assert_eq!(classified.len(), 2);
        assert_eq!(report.window, "Last 24 Hours");
        assert_eq!(report.overall.no_data_count, 1);
        assert_eq!(report.overall.failure_count, 1);
        assert_eq!(report.overall.success_rate, 0.0);
        assert_eq!(
            report.date_range,
            Some(("2024-05-03 09:00:00".to_string(), "2024-05-03 10:00:00".to_string()))
        );
    }

    #[test]
    fn test_report_json_uses_camel_case_keys() {
        let mut records = repeat("panDetails", Status::Success, "-", 3);
        records.extend(repeat("panDetails", Status::Failure, "Invalid PAN", 1));
        let options = DashboardOptions {
            funnel_stages: vec!["panDetails".to_string()],
            ..DashboardOptions::default()
        };
        let report = DashboardReport::build(&records, "All Time", &options);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["dateRange"].is_array());
        assert_eq!(json["overall"]["successRate"], 75.0);
        assert_eq!(json["overall"]["failureCount"], 1);
        assert_eq!(json["endpoints"][0]["apiName"], "panDetails");
        assert_eq!(json["failureReasons"][0]["reason"], "Invalid PAN");
        assert!(json["trend"][0]["successRate"].is_number());
        assert!(json["funnel"][0]["dropPercent"].is_number());
        assert!(json["overall"].get("success_rate").is_none());
        assert!(json.get("failure_reasons").is_none());
    }

    fn arb_records() -> impl Strategy<Value = Vec<ClassifiedRecord>> {
        let status = prop_oneof![
            Just(Status::Success),
            Just(Status::Failure),
            Just(Status::NoData)
        ];
        let api = prop_oneof![Just("a"), Just("b"), Just("c"), Just("d")];
        proptest::collection::vec((api, status, 0u32..24, 0u32..60), 0..200).prop_map(|rows| {
            rows.into_iter()
                .map(|(api, status, hour, minute)| {
                    let reason = if status == Status::Success { "-" } else { "Timeout" };
                    classified(api, status, reason, at(2, hour, minute))
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_endpoint_summaries_conserve_and_bound(records in arb_records()) {
            let (endpoints, trend) = aggregate(&records, BucketGranularity::Hour);

            let total: usize = endpoints.iter().map(|s| s.total).sum();
            prop_assert_eq!(total, records.len());

            for summary in &endpoints {
                prop_assert_eq!(
                    summary.success_count + summary.failure_count + summary.no_data_count,
                    summary.total
                );
                prop_assert!(summary.success_rate >= 0.0 && summary.success_rate <= 100.0);
            }
            for bucket in &trend {
                prop_assert!(bucket.total > 0);
                prop_assert!(bucket.success_rate >= 0.0 && bucket.success_rate <= 100.0);
            }

            for pair in endpoints.windows(2) {
                prop_assert!(
                    pair[0].success_rate < pair[1].success_rate
                        || (pair[0].success_rate == pair[1].success_rate
                            && pair[0].api_name < pair[1].api_name)
                );
            }

            let (again, _) = aggregate(&records, BucketGranularity::Hour);
            prop_assert_eq!(endpoints, again);
        }
    }
}
