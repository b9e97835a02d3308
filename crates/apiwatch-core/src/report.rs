//! Executive summary text built from a [`DashboardReport`].

use crate::analysis::DashboardReport;

/// Failure reasons listed in the executive summary
const REPORT_REASONS: usize = 5;

const ACTION_POINTS: [&str; 3] = [
    "Investigate APIs below SLA",
    "Track recurring failure reasons",
    "Monitor business impact of No Data cases",
];

/// Render the plain-text executive summary
pub fn executive_summary(report: &DashboardReport) -> String {
    let mut out = String::new();
    let overall = &report.overall;

    out.push_str(&format!("SYSTEM STATUS: {}\n", overall.health));
    match &report.date_range {
        Some((start, end)) => {
            out.push_str(&format!("TIME WINDOW: {} ({} to {})\n", report.window, start, end));
        }
        None => {
            out.push_str(&format!("TIME WINDOW: {}\n", report.window));
        }
    }
    out.push('\n');

    out.push_str(&format!("TOTAL REQUESTS: {}\n", overall.total));
    out.push_str(&format!("SUCCESS RATE: {:.1}%\n", overall.success_rate));
    out.push_str(&format!("FAILURES: {}\n", overall.failure_count));
    out.push_str(&format!("NO DATA CASES: {}\n", overall.no_data_count));

    if !report.breaches.is_empty() {
        out.push_str("\nAPIS BELOW SLA:\n");
        for breach in &report.breaches {
            out.push_str(&format!("- {} ({:.1}%)\n", breach.api_name, breach.success_rate));
        }
    }

    if !report.failure_reasons.is_empty() {
        out.push_str("\nTOP FAILURE REASONS:\n");
        for reason in report.failure_reasons.iter().take(REPORT_REASONS) {
            out.push_str(&format!(
                "- {}: {} ({})\n",
                reason.api_name, reason.reason, reason.count
            ));
        }
    }

    out.push_str("\nACTION POINTS:\n");
    for point in ACTION_POINTS {
        out.push_str(&format!("- {}\n", point));
    }

    out
}
