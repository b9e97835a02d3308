use super::{DataOptions, csv_field, load_dashboard, print_advisory};
use crate::OutputFormat;
use anyhow::Result;
use apiwatch_core::analysis::{DashboardOptions, FailureReasonCount};

/// Most frequent failure (and, unless `failures_only`, No Data) reasons
pub fn top_reasons(
    data: &DataOptions,
    top: usize,
    failures_only: bool,
) -> Result<Vec<FailureReasonCount>> {
    let options = DashboardOptions {
        top_reasons: top,
        include_no_data_reasons: !failures_only,
        ..DashboardOptions::default()
    };
    let dashboard = load_dashboard(data, &options)?;
    print_advisory(&dashboard);
    Ok(dashboard.report.failure_reasons)
}

pub fn execute(data: &DataOptions, top: usize, failures_only: bool, format: OutputFormat) -> Result<()> {
    tracing::info!("Collecting top {} failure reasons for window: {}", top, data.window);

    let reasons = top_reasons(data, top, failures_only)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reasons)?),
        OutputFormat::Table => {
            println!("API,Reason,Count");
            for reason in &reasons {
                println!(
                    "{},{},{}",
                    csv_field(&reason.api_name),
                    csv_field(&reason.reason),
                    reason.count
                );
            }
        }
        OutputFormat::Pretty => output_pretty(&reasons),
    }

    Ok(())
}

fn output_pretty(reasons: &[FailureReasonCount]) {
    use console::style;

    println!("\n{}", style("Top Failure Reasons").bold().cyan());
    println!("{}", style("===================").cyan());

    if reasons.is_empty() {
        println!("\n  {}", style("No failures in this window").green());
        println!();
        return;
    }

    println!();
    for (i, reason) in reasons.iter().enumerate() {
        println!(
            "  {:>2}. [{}] {} - {}",
            i + 1,
            style(reason.count).yellow(),
            reason.api_name,
            reason.reason
        );
    }
    println!();
}
