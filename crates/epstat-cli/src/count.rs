//! # Count Subcommand
//!
//! Per-file episode inventory with breakdowns and per-episode details.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use epstat_core::AnalysisConfig;
use epstat_report::{count, count_episodes, load_files};

use crate::{finish_config, print_json};

/// Arguments for the `epstat count` subcommand.
#[derive(Args, Debug)]
pub struct CountArgs {
    /// JSONL episode files.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the count subcommand.
pub fn run_count(args: &CountArgs, config: &AnalysisConfig) -> Result<u8> {
    let config = finish_config(config.clone())?;
    let set = load_files(&args.files);
    let report = count_episodes(&set, &config);
    if args.json {
        print_json(&report)?;
    } else {
        print!("{}", count::render_text(&report));
    }
    Ok(0)
}
