use anyhow::Result;
use apiwatch_cli::{OutputFormat, commands};
use apiwatch_core::analysis::{BucketGranularity, DEFAULT_TOP_REASONS};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;

const COMPLETION_HELP: &str = "\
SUPPORTED SHELLS:
    bash, zsh, fish, powershell, elvish

INSTALLATION:
    bash:  apiwatch completion --shell bash >> ~/.bashrc
    zsh:   apiwatch completion --shell zsh > \"${fpath[1]}/_apiwatch\"
    fish:  apiwatch completion --shell fish > ~/.config/fish/completions/apiwatch.fish";

#[derive(Parser)]
#[command(name = "apiwatch")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Health dashboard for API call logs",
    long_about = "apiwatch classifies logged third-party API calls as Success, Failure or No Data \
                  and reports success rates, SLA breaches, trends, failure reasons and the loan funnel."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,

    /// Read records from a JSON / JSON Lines snapshot instead of the database
    #[arg(long, global = true, env = "APIWATCH_FILE", value_name = "PATH")]
    file: Option<PathBuf>,

    /// Database config file (defaults to <config dir>/apiwatch/config.json)
    #[arg(long, global = true, env = "APIWATCH_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Time window: all, 24h, 7d, 30d, <N>h, <N>d or YYYY-MM-DD..YYYY-MM-DD
    #[arg(short, long, global = true, env = "APIWATCH_WINDOW", default_value = "24h")]
    window: String,

    /// Only include these APIs (exact names or glob patterns, comma-separated or repeated)
    #[arg(short, long = "api", global = true, value_name = "PATTERN")]
    apis: Vec<String>,

    /// JSON file with extra No Data rules
    #[arg(long, global = true, env = "APIWATCH_RULES", value_name = "PATH")]
    rules: Option<PathBuf>,

    /// Keep at most this many of the newest rows (default 50000, or rowLimit from the config)
    #[arg(
        long,
        global = true,
        env = "APIWATCH_ROW_LIMIT",
        value_name = "N",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    row_limit: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show overall health and per-API success rates
    Status {
        /// Re-render every SECS seconds, reusing the cached snapshot within its TTL
        #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
        watch: Option<u64>,

        /// With --watch, stop after this many renders
        #[arg(long, requires = "watch")]
        count: Option<usize>,
    },

    /// List APIs below the SLA threshold
    Alerts,

    /// Show the success rate over time
    Trends {
        /// Bucket size (hour or day)
        #[arg(long, default_value = "hour")]
        granularity: BucketGranularity,
    },

    /// Show the most frequent failure reasons
    Failures {
        /// Number of reasons to show
        #[arg(long, default_value_t = DEFAULT_TOP_REASONS)]
        top: usize,

        /// Leave out No Data reasons
        #[arg(long)]
        failures_only: bool,
    },

    /// Show request and drop-off counts along the loan funnel
    Funnel {
        /// Funnel stages in order (comma-separated)
        #[arg(long, value_delimiter = ',')]
        stages: Vec<String>,
    },

    /// Generate the executive summary report
    Report {
        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export classified records of the window
    Export {
        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Write JSON Lines instead of a JSON array
        #[arg(long)]
        jsonl: bool,
    },

    /// Generate shell completion scripts
    #[command(after_help = COMPLETION_HELP)]
    Completion {
        /// Target shell
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    let data = commands::DataOptions {
        file: cli.file,
        config: cli.config,
        window: cli.window,
        apis: cli.apis,
        rules: cli.rules,
        row_limit: cli.row_limit,
    };

    match cli.command {
        Commands::Status { watch, count } => {
            let watch = watch.map(|secs| commands::status::Watch {
                interval: Duration::from_secs(secs),
                count,
            });
            commands::status::execute(&data, watch, cli.format)
        }
        Commands::Alerts => commands::alerts::execute(&data, cli.format),
        Commands::Trends { granularity } => {
            commands::trends::execute(&data, granularity, cli.format)
        }
        Commands::Failures { top, failures_only } => {
            commands::failures::execute(&data, top, failures_only, cli.format)
        }
        Commands::Funnel { stages } => commands::funnel::execute(&data, stages, cli.format),
        Commands::Report { output } => commands::report::execute(&data, output, cli.format),
        Commands::Export { output, jsonl } => {
            commands::export::execute(&data, &output, jsonl).map(|_| ())
        }
        Commands::Completion { shell } => commands::completion::execute(shell, &mut Cli::command()),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("apiwatch=debug,apiwatch_cli=debug,apiwatch_core=debug,apiwatch_store=debug")
    } else {
        EnvFilter::new("apiwatch=info,apiwatch_cli=info,apiwatch_core=warn,apiwatch_store=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
