pub mod alerts;
pub mod completion;
pub mod export;
pub mod failures;
pub mod funnel;
pub mod report;
pub mod status;
pub mod trends;

use anyhow::Result;
use apiwatch_core::analysis::{DashboardOptions, DashboardReport, run_pipeline};
use apiwatch_core::classify::{Classifier, EndpointRule};
use apiwatch_core::filter::{FilterSpec, TimeWindow};
use apiwatch_core::record::ClassifiedRecord;
use apiwatch_store::config::{DEFAULT_CACHE_TTL_SECS, DEFAULT_ROW_LIMIT};
use apiwatch_store::{
    CachedSource, DbConfig, FileSource, MySqlSource, RecordSource, Snapshot,
    UNAVAILABLE_ADVISORY,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Runtime;

/// Where records come from and how they are narrowed before aggregation
#[derive(Debug, Clone)]
pub struct DataOptions {
    /// Read a JSON / JSON Lines snapshot instead of the database
    pub file: Option<PathBuf>,
    /// Database config file; defaults to the per-user location
    pub config: Option<PathBuf>,
    pub window: String,
    pub apis: Vec<String>,
    /// Extra No-Data rules
    pub rules: Option<PathBuf>,
    /// Keep at most this many of the newest rows; overrides the config file
    pub row_limit: Option<u32>,
}

impl Default for DataOptions {
    fn default() -> Self {
        Self {
            file: None,
            config: None,
            window: "24h".to_string(),
            apis: Vec::new(),
            rules: None,
            row_limit: None,
        }
    }
}

impl DataOptions {
    pub fn from_file(file: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(file.into()),
            ..Self::default()
        }
    }

    pub fn with_window(mut self, window: impl Into<String>) -> Self {
        self.window = window.into();
        self
    }

    pub fn with_apis(mut self, apis: Vec<String>) -> Self {
        self.apis = apis;
        self
    }

    pub fn with_rules(mut self, rules: impl Into<PathBuf>) -> Self {
        self.rules = Some(rules.into());
        self
    }

    pub fn with_row_limit(mut self, limit: u32) -> Self {
        self.row_limit = Some(limit);
        self
    }

    /// Build the filter from the window and endpoint flags
    pub fn filter_spec(&self) -> Result<FilterSpec> {
        let window = TimeWindow::parse(&self.window)?;

        // Handle comma-separated values as well as repeated flags
        let patterns: Vec<String> = self
            .apis
            .iter()
            .flat_map(|a| a.split(',').map(|s| s.trim().to_string()))
            .filter(|s| !s.is_empty())
            .collect();

        let mut spec = FilterSpec::new().with_window(window);
        if !patterns.is_empty() {
            spec = spec.with_endpoints(patterns)?;
        }
        Ok(spec)
    }

    pub fn classifier(&self) -> Result<Classifier> {
        let mut classifier = Classifier::with_default_rules();
        if let Some(path) = &self.rules {
            classifier.register_all(EndpointRule::from_file(path)?);
        }
        Ok(classifier)
    }
}

/// Classified records of the window plus everything aggregated from them
pub struct Dashboard {
    pub records: Vec<ClassifiedRecord>,
    pub report: DashboardReport,
    /// Why the snapshot is empty, when it is
    pub advisory: Option<String>,
    /// Built from a memoized snapshot instead of a new fetch
    pub cached: bool,
}

enum SessionSource {
    Ready(CachedSource<Box<dyn RecordSource>>),
    /// The database settings could not be resolved
    Unconfigured(String),
}

/// One data source memoized across renders
///
/// Loads within the cache TTL reuse the previous snapshot, so a
/// refreshing view only goes back to the source once the TTL expires.
pub struct DashboardSession {
    runtime: Runtime,
    source: SessionSource,
    data: DataOptions,
}

impl DashboardSession {
    pub fn open(data: &DataOptions) -> Result<Self> {
        let runtime = Runtime::new()?;

        let source = match &data.file {
            Some(path) => {
                let limit = data.row_limit.unwrap_or(DEFAULT_ROW_LIMIT);
                let source: Box<dyn RecordSource> =
                    Box::new(FileSource::new(path).with_row_limit(limit as usize));
                SessionSource::Ready(CachedSource::new(
                    source,
                    Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
                ))
            }
            None => match DbConfig::load(data.config.as_deref()) {
                Ok(mut config) => {
                    if let Some(limit) = data.row_limit {
                        config.row_limit = limit;
                    }
                    let ttl = config.cache_ttl;
                    let source: Box<dyn RecordSource> = Box::new(MySqlSource::new(config));
                    SessionSource::Ready(CachedSource::new(source, ttl))
                }
                Err(e) => {
                    tracing::warn!("Database is not configured: {}", e);
                    SessionSource::Unconfigured(e.to_string())
                }
            },
        };

        Ok(Self {
            runtime,
            source,
            data: data.clone(),
        })
    }

    /// Fetch (or reuse), filter, classify and aggregate
    pub fn load(&self, options: &DashboardOptions) -> Result<Dashboard> {
        let spec = self.data.filter_spec()?;
        let classifier = self.data.classifier()?;

        let snapshot = self.snapshot()?;
        let advisory = if snapshot.is_empty() {
            Some(
                snapshot
                    .advisory
                    .clone()
                    .unwrap_or_else(|| UNAVAILABLE_ADVISORY.to_string()),
            )
        } else {
            None
        };

        tracing::debug!(
            "Snapshot holds {} records (cached: {})",
            snapshot.records.len(),
            snapshot.cached
        );

        let (records, report) = run_pipeline(&snapshot.records, &spec, &classifier, options);
        Ok(Dashboard {
            records,
            report,
            advisory,
            cached: snapshot.cached,
        })
    }

    fn snapshot(&self) -> Result<Snapshot> {
        let source = match &self.source {
            SessionSource::Ready(source) => source,
            SessionSource::Unconfigured(cause) => return Ok(Snapshot::unavailable(cause)),
        };

        let spinner = spinner("Loading API logs...")?;
        let snapshot = self.runtime.block_on(source.load());
        spinner.finish_and_clear();
        Ok(snapshot)
    }
}

/// Fetch, filter, classify and aggregate once
///
/// Data source failures do not fail the command: they yield an empty
/// dashboard carrying an advisory.
pub fn load_dashboard(data: &DataOptions, options: &DashboardOptions) -> Result<Dashboard> {
    DashboardSession::open(data)?.load(options)
}

fn spinner(message: &'static str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

/// Print the advisory for an empty snapshot to stderr
pub(crate) fn print_advisory(dashboard: &Dashboard) {
    use console::style;

    if let Some(advisory) = &dashboard.advisory {
        eprintln!("{}", style(advisory).yellow());
    }
}

/// Colored health label
pub(crate) fn styled_health(
    health: apiwatch_core::analysis::HealthStatus,
) -> console::StyledObject<&'static str> {
    use apiwatch_core::analysis::HealthStatus;
    use console::style;

    match health {
        HealthStatus::Healthy => style(health.as_str()).green().bold(),
        HealthStatus::Degraded => style(health.as_str()).yellow().bold(),
        HealthStatus::Critical => style(health.as_str()).red().bold(),
    }
}

/// Quote a CSV field when needed
pub(crate) fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
