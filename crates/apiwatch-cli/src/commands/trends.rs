use super::{DataOptions, load_dashboard, print_advisory};
use crate::OutputFormat;
use anyhow::Result;
use apiwatch_core::analysis::{BucketGranularity, DashboardOptions, SLA_TARGET, TimeBucketSummary};
use serde::Serialize;

/// Width of the pretty bar at 100%
const BAR_WIDTH: usize = 40;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TrendOutput<'a> {
    granularity: &'static str,
    sla_target: f64,
    buckets: &'a [TimeBucketSummary],
}

pub fn success_trend(
    data: &DataOptions,
    granularity: BucketGranularity,
) -> Result<Vec<TimeBucketSummary>> {
    let options = DashboardOptions {
        granularity,
        ..DashboardOptions::default()
    };
    let dashboard = load_dashboard(data, &options)?;
    print_advisory(&dashboard);
    Ok(dashboard.report.trend)
}

pub fn execute(data: &DataOptions, granularity: BucketGranularity, format: OutputFormat) -> Result<()> {
    tracing::info!("Building {} trend for window: {}", granularity, data.window);

    let trend = success_trend(data, granularity)?;

    match format {
        OutputFormat::Json => {
            let output = TrendOutput {
                granularity: granularity.as_str(),
                sla_target: SLA_TARGET,
                buckets: &trend,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => output_table(&trend),
        OutputFormat::Pretty => output_pretty(&trend, granularity),
    }

    Ok(())
}

fn bucket_label(bucket: &TimeBucketSummary, granularity: BucketGranularity) -> String {
    match granularity {
        BucketGranularity::Hour => bucket.bucket.format("%Y-%m-%d %H:00").to_string(),
        BucketGranularity::Day => bucket.bucket.format("%Y-%m-%d").to_string(),
    }
}

fn output_pretty(trend: &[TimeBucketSummary], granularity: BucketGranularity) {
    use console::style;

    println!("\n{}", style("Success Rate Trend").bold().cyan());
    println!("{}", style("==================").cyan());
    println!(
        "  Granularity: {}    SLA target: {:.0}%\n",
        granularity, SLA_TARGET
    );

    let target_at = (SLA_TARGET / 100.0 * BAR_WIDTH as f64).round() as usize;

    for bucket in trend {
        let filled = (bucket.success_rate / 100.0 * BAR_WIDTH as f64).round() as usize;
        let bar: String = (0..BAR_WIDTH)
            .map(|i| match i {
                i if i < filled => '█',
                i if i == target_at => '|',
                _ => ' ',
            })
            .collect();

        let rate = format!("{:>5.1}%", bucket.success_rate);
        let rate = if bucket.success_rate < SLA_TARGET {
            style(rate).red()
        } else {
            style(rate).green()
        };

        println!(
            "  {:<16} {} {} ({} requests)",
            bucket_label(bucket, granularity),
            rate,
            bar,
            bucket.total
        );
    }

    println!();
}

fn output_table(trend: &[TimeBucketSummary]) {
    println!("Bucket,Total,Success,Failure,No Data,Success Rate,SLA Target");
    for bucket in trend {
        println!(
            "{},{},{},{},{},{:.1},{:.1}",
            bucket.bucket.format("%Y-%m-%dT%H:%M:%S"),
            bucket.total,
            bucket.success_count,
            bucket.failure_count,
            bucket.no_data_count,
            bucket.success_rate,
            SLA_TARGET
        );
    }
}
