use super::{Dashboard, DashboardSession, DataOptions, csv_field, print_advisory, styled_health};
use crate::OutputFormat;
use anyhow::Result;
use apiwatch_core::analysis::{DashboardOptions, EndpointSummary, OverallSummary};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusOutput<'a> {
    window: &'a str,
    date_range: Option<&'a (String, String)>,
    overall: &'a OverallSummary,
    endpoints: &'a [EndpointSummary],
}

/// Re-render settings for `status --watch`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watch {
    pub interval: Duration,
    /// Stop after this many renders; unbounded when `None`
    pub count: Option<usize>,
}

pub fn execute(data: &DataOptions, watch: Option<Watch>, format: OutputFormat) -> Result<()> {
    tracing::info!("Building status for window: {}", data.window);

    let session = DashboardSession::open(data)?;
    let Some(watch) = watch else {
        return render(&session, format);
    };

    tracing::info!("Refreshing every {}s", watch.interval.as_secs());
    let term = console::Term::stdout();
    let mut renders = 0;
    loop {
        if term.is_term() {
            term.clear_screen()?;
        }
        render(&session, format)?;
        renders += 1;

        if watch.count.is_some_and(|count| renders >= count) {
            return Ok(());
        }
        std::thread::sleep(watch.interval);
    }
}

fn render(session: &DashboardSession, format: OutputFormat) -> Result<()> {
    let dashboard = session.load(&DashboardOptions::default())?;
    print_advisory(&dashboard);

    match format {
        OutputFormat::Json => output_json(&dashboard)?,
        OutputFormat::Table => output_table(&dashboard),
        OutputFormat::Pretty => output_pretty(&dashboard),
    }

    Ok(())
}

fn output_pretty(dashboard: &Dashboard) {
    use console::style;

    let report = &dashboard.report;
    let overall = &report.overall;

    println!("\n{}", style("API Health Dashboard").bold().cyan());
    println!("{}", style("====================").cyan());
    println!(
        "{}",
        style(format!(
            "Generated {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ))
        .dim()
    );

    println!("\n  SYSTEM STATUS: {}", styled_health(overall.health));
    match &report.date_range {
        Some((start, end)) => println!("  Time Window:   {} ({} to {})", report.window, start, end),
        None => println!("  Time Window:   {}", report.window),
    }

    println!("\n{}", style("Overview:").bold());
    println!("  Total Requests: {}", style(overall.total).yellow());
    println!("  Success Rate:   {:.1}%", overall.success_rate);
    println!("  Failures:       {}", overall.failure_count);
    println!("  No Data Cases:  {}", overall.no_data_count);

    if !report.endpoints.is_empty() {
        println!("\n{}", style("Endpoints:").bold());
        for endpoint in &report.endpoints {
            println!(
                "  {:<32} {:>6.1}%  {:<8}  {} total, {} failed, {} no data",
                endpoint.api_name,
                endpoint.success_rate,
                styled_health(endpoint.health()),
                endpoint.total,
                endpoint.failure_count,
                endpoint.no_data_count
            );
        }
    }

    println!();
}

fn output_json(dashboard: &Dashboard) -> Result<()> {
    let report = &dashboard.report;
    let output = StatusOutput {
        window: &report.window,
        date_range: report.date_range.as_ref(),
        overall: &report.overall,
        endpoints: &report.endpoints,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn output_table(dashboard: &Dashboard) {
    println!("API,Total,Success,Failure,No Data,Success Rate,Health");
    for endpoint in &dashboard.report.endpoints {
        println!(
            "{},{},{},{},{},{:.1},{}",
            csv_field(&endpoint.api_name),
            endpoint.total,
            endpoint.success_count,
            endpoint.failure_count,
            endpoint.no_data_count,
            endpoint.success_rate,
            endpoint.health()
        );
    }

    let overall = &dashboard.report.overall;
    println!(
        "TOTAL,{},{},{},{},{:.1},{}",
        overall.total,
        overall.success_count,
        overall.failure_count,
        overall.no_data_count,
        overall.success_rate,
        overall.health
    );
}
