use super::{DataOptions, load_dashboard, print_advisory};
use crate::OutputFormat;
use anyhow::Result;
use apiwatch_core::analysis::DashboardOptions;
use apiwatch_core::report::executive_summary;
use std::fs;
use std::path::PathBuf;

pub fn execute(data: &DataOptions, output: Option<PathBuf>, format: OutputFormat) -> Result<()> {
    tracing::info!("Generating executive report for window: {}", data.window);

    let dashboard = load_dashboard(data, &DashboardOptions::default())?;
    print_advisory(&dashboard);

    let content = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&dashboard.report)? + "\n",
        OutputFormat::Pretty | OutputFormat::Table => executive_summary(&dashboard.report),
    };

    match output {
        Some(path) => {
            tracing::debug!("Writing report to: {}", path.display());
            fs::write(&path, content)?;
            println!("Report written to {}", path.display());
        }
        None => print!("{}", content),
    }

    Ok(())
}
