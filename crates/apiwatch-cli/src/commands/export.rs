use super::{DataOptions, load_dashboard, print_advisory};
use anyhow::Result;
use apiwatch_core::analysis::DashboardOptions;
use apiwatch_core::io::LogWriter;
use std::path::Path;

/// Write the window's classified records to `output`
///
/// Returns the number of records written.
pub fn execute(data: &DataOptions, output: &Path, jsonl: bool) -> Result<usize> {
    tracing::info!("Exporting classified records for window: {}", data.window);

    let dashboard = load_dashboard(data, &DashboardOptions::default())?;
    print_advisory(&dashboard);

    if jsonl {
        LogWriter::to_jsonl_file(&dashboard.records, output)?;
    } else {
        LogWriter::to_file(&dashboard.records, output)?;
    }

    println!(
        "Exported {} records to {}",
        dashboard.records.len(),
        output.display()
    );
    Ok(dashboard.records.len())
}
