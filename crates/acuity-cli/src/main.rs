//! acuity CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "acuity", version, about = "Letter-chart visual acuity test")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an acuity test, reading one answer per line from stdin
    Run {
        /// Chart TOML file (default: configured chart, else the built-in Snellen chart)
        #[arg(long)]
        chart: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory (default: from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Do not wait for an acceptable viewing distance
        #[arg(long)]
        skip_distance_check: bool,
    },

    /// Validate chart TOML files
    Validate {
        /// Path to chart file or directory
        #[arg(long)]
        chart: PathBuf,
    },

    /// Print a chart's lines
    Chart {
        /// Chart TOML file (default: the built-in Snellen chart)
        #[arg(long)]
        chart: Option<PathBuf>,
    },

    /// Query the configured distance signal once
    CheckDistance {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compare two test reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Exit code 1 if acuity declined
        #[arg(long)]
        fail_on_decline: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Render an HTML report from a report JSON
    Report {
        /// Report JSON
        #[arg(long)]
        input: PathBuf,

        /// HTML output path (default: next to the input)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Create starter config and example chart
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("acuity=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            chart,
            config,
            output,
            format,
            skip_distance_check,
        } => commands::run::execute(chart, config, output, format, skip_distance_check).await,
        Commands::Validate { chart } => commands::validate::execute(chart),
        Commands::Chart { chart } => commands::chart::execute(chart),
        Commands::CheckDistance { config } => commands::check_distance::execute(config).await,
        Commands::Compare {
            baseline,
            current,
            fail_on_decline,
            format,
        } => commands::compare::execute(baseline, current, fail_on_decline, format),
        Commands::Report { input, output } => commands::report::execute(input, output),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
