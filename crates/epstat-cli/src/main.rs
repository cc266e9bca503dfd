//! # epstat CLI entry point
//!
//! Parses command-line arguments, loads the analysis configuration and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use epstat_cli::count::{run_count, CountArgs};
use epstat_cli::investigate::{run_investigate, InvestigateArgs};
use epstat_cli::load_config;
use epstat_cli::outcomes::{run_export_outcomes, ExportOutcomesArgs};
use epstat_cli::repeats::{run_repeats, RepeatsArgs};
use epstat_cli::schema::{run_schema, SchemaArgs};
use epstat_cli::summary::{run_summary, SummaryArgs};
use epstat_cli::terminations::{
    run_early_terminations, run_short_losses, EarlyTerminationArgs, ShortLossArgs,
};

/// Statistics over reinforcement-learning episode logs.
///
/// Reads JSONL episode records (one episode per line) and reports win
/// rates, step and reward distributions, repeated actions, early
/// terminations and inferred record schemas.
#[derive(Parser, Debug)]
#[command(name = "epstat", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML analysis configuration.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Final reward at or above which an episode is a win.
    #[arg(long, global = true)]
    win_threshold: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Episode inventory per file with breakdowns.
    Count(CountArgs),

    /// Win rate with step and reward statistics.
    Summary(SummaryArgs),

    /// Repeated-action statistics, CSV and plot data.
    Repeats(RepeatsArgs),

    /// Infer field paths and value types.
    Schema(SchemaArgs),

    /// Non-winning episodes that stopped before the step threshold.
    EarlyTerminations(EarlyTerminationArgs),

    /// Short losing episodes with their final actions.
    ShortLosses(ShortLossArgs),

    /// Show chosen episodes of one file in detail.
    Investigate(InvestigateArgs),

    /// Merge episode result files into a network,episode,outcome CSV.
    ExportOutcomes(ExportOutcomesArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("epstat v{} starting", env!("CARGO_PKG_VERSION"));

    let mut config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(1);
        }
    };
    if let Some(threshold) = cli.win_threshold {
        config.win_threshold = threshold;
    }

    let result = match cli.command {
        Commands::Count(args) => run_count(&args, &config),
        Commands::Summary(args) => run_summary(&args, &config),
        Commands::Repeats(args) => run_repeats(&args, &config),
        Commands::Schema(args) => run_schema(&args, &config),
        Commands::EarlyTerminations(args) => run_early_terminations(&args, &config),
        Commands::ShortLosses(args) => run_short_losses(&args, &config),
        Commands::Investigate(args) => run_investigate(&args, &config),
        Commands::ExportOutcomes(args) => run_export_outcomes(&args, &config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
