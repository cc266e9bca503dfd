//! # Summary Subcommand
//!
//! Win/loss summary as full text, a single line, or JSON.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use epstat_core::AnalysisConfig;
use epstat_report::{load_files, summarize, summary};

use crate::{finish_config, print_json};

/// Arguments for the `epstat summary` subcommand.
#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// JSONL episode files.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Print a compact one-line summary.
    #[arg(long, conflicts_with = "json")]
    pub compact: bool,

    /// Print the summary as JSON.
    #[arg(long)]
    pub json: bool,

    /// Losses with at least this many actions count as step-limit losses.
    #[arg(long)]
    pub step_limit: Option<usize>,
}

/// Execute the summary subcommand.
pub fn run_summary(args: &SummaryArgs, config: &AnalysisConfig) -> Result<u8> {
    let mut config = config.clone();
    if let Some(step_limit) = args.step_limit {
        config.step_limit = step_limit;
    }
    let config = finish_config(config)?;

    let report = summarize(&load_files(&args.files), &config);
    if args.json {
        print_json(&report)?;
    } else if args.compact {
        println!("{}", summary::render_compact(&report));
    } else {
        print!("{}", summary::render_text(&report));
    }
    Ok(0)
}
