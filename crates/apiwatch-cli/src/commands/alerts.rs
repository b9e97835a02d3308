use super::{DataOptions, csv_field, load_dashboard, print_advisory};
use crate::OutputFormat;
use anyhow::Result;
use apiwatch_core::analysis::{DashboardOptions, EndpointSummary, SLA_BREACH_THRESHOLD};

/// Endpoints whose success rate is below the SLA threshold, worst first
pub fn sla_alerts(data: &DataOptions) -> Result<Vec<EndpointSummary>> {
    let dashboard = load_dashboard(data, &DashboardOptions::default())?;
    print_advisory(&dashboard);
    Ok(dashboard.report.breaches)
}

pub fn execute(data: &DataOptions, format: OutputFormat) -> Result<()> {
    tracing::info!("Checking SLA breaches for window: {}", data.window);

    let breaches = sla_alerts(data)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&breaches)?),
        OutputFormat::Table => output_table(&breaches),
        OutputFormat::Pretty => output_pretty(&breaches),
    }

    Ok(())
}

fn output_pretty(breaches: &[EndpointSummary]) {
    use console::style;

    println!("\n{}", style("SLA Alerts").bold().cyan());
    println!("{}", style("==========").cyan());

    if breaches.is_empty() {
        println!(
            "\n  {}",
            style(format!("All APIs at or above {:.0}% SLA", SLA_BREACH_THRESHOLD)).green()
        );
    } else {
        println!();
        for breach in breaches {
            println!(
                "  {} {} success rate {:.1}% ({} of {} failed, {} no data)",
                style("!").red().bold(),
                style(&breach.api_name).red(),
                breach.success_rate,
                breach.failure_count,
                breach.total,
                breach.no_data_count
            );
        }
    }

    println!();
}

fn output_table(breaches: &[EndpointSummary]) {
    println!("API,Success Rate,Total,Failure,No Data");
    for breach in breaches {
        println!(
            "{},{:.1},{},{},{}",
            csv_field(&breach.api_name),
            breach.success_rate,
            breach.total,
            breach.failure_count,
            breach.no_data_count
        );
    }
}
