use super::{DataOptions, csv_field, load_dashboard, print_advisory};
use crate::OutputFormat;
use anyhow::Result;
use apiwatch_core::analysis::{DEFAULT_FUNNEL, DashboardOptions, FunnelStage};

/// Funnel over `stages`, or the default loan journey when empty
pub fn funnel_stages(data: &DataOptions, stages: Vec<String>) -> Result<Vec<FunnelStage>> {
    let stages = if stages.is_empty() {
        DEFAULT_FUNNEL.iter().map(|s| s.to_string()).collect()
    } else {
        stages
    };

    let options = DashboardOptions {
        funnel_stages: stages,
        ..DashboardOptions::default()
    };
    let dashboard = load_dashboard(data, &options)?;
    print_advisory(&dashboard);
    Ok(dashboard.report.funnel)
}

pub fn execute(data: &DataOptions, stages: Vec<String>, format: OutputFormat) -> Result<()> {
    tracing::info!("Building funnel for window: {}", data.window);

    let funnel = funnel_stages(data, stages)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&funnel)?),
        OutputFormat::Table => {
            println!("Stage,API,Requests,Successes,Drop %");
            for (i, stage) in funnel.iter().enumerate() {
                println!(
                    "{},{},{},{},{:.1}",
                    i + 1,
                    csv_field(&stage.api_name),
                    stage.requests,
                    stage.successes,
                    stage.drop_percent
                );
            }
        }
        OutputFormat::Pretty => output_pretty(&funnel),
    }

    Ok(())
}

fn output_pretty(funnel: &[FunnelStage]) {
    use console::style;

    println!("\n{}", style("Loan Funnel").bold().cyan());
    println!("{}", style("===========").cyan());
    println!(
        "  {}",
        style("Drop % is measured against first-stage requests").dim()
    );
    println!();

    for (i, stage) in funnel.iter().enumerate() {
        println!(
            "  {}. {:<32} {:>7} requests {:>7} succeeded  drop {}",
            i + 1,
            stage.api_name,
            stage.requests,
            stage.successes,
            style(format!("{:.1}%", stage.drop_percent)).yellow()
        );
    }

    println!();
}
