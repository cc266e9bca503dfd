//! # Early-Termination and Short-Loss Subcommands

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use epstat_core::AnalysisConfig;
use epstat_report::{early_terminations, load_files, short_losses, terminations};

use crate::{finish_config, print_json};

/// Arguments for the `epstat early-terminations` subcommand.
#[derive(Args, Debug)]
pub struct EarlyTerminationArgs {
    /// JSONL episode files.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Non-wins with fewer actions than this are early terminations.
    #[arg(long)]
    pub step_threshold: Option<usize>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the early-terminations subcommand.
pub fn run_early_terminations(args: &EarlyTerminationArgs, config: &AnalysisConfig) -> Result<u8> {
    let mut config = config.clone();
    if let Some(steps) = args.step_threshold {
        config.early_termination_steps = steps;
    }
    let config = finish_config(config)?;

    let report = early_terminations(&load_files(&args.files), &config);
    if args.json {
        print_json(&report)?;
    } else {
        print!("{}", terminations::render_early_text(&report));
    }
    Ok(0)
}

/// Arguments for the `epstat short-losses` subcommand.
#[derive(Args, Debug)]
pub struct ShortLossArgs {
    /// JSONL episode files.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Longest losing episode to list.
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Print the listing as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the short-losses subcommand.
pub fn run_short_losses(args: &ShortLossArgs, config: &AnalysisConfig) -> Result<u8> {
    let mut config = config.clone();
    if let Some(max_steps) = args.max_steps {
        config.short_loss_max_steps = max_steps;
    }
    let config = finish_config(config)?;

    let found = short_losses(&load_files(&args.files), &config, config.short_loss_max_steps);
    if args.json {
        print_json(&found)?;
    } else {
        print!("{}", terminations::render_short_losses(&found));
    }
    Ok(0)
}
