//! # Repeats Subcommand
//!
//! Repeated-action statistics with optional CSV, histogram and box-plot
//! exports.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use epstat_core::AnalysisConfig;
use epstat_report::{analyze_repeats, load_files, repeats};

use crate::{finish_config, print_json};

/// Arguments for the `epstat repeats` subcommand.
#[derive(Args, Debug)]
pub struct RepeatsArgs {
    /// JSONL episode files.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// List the most repeated actions of each episode.
    #[arg(long)]
    pub detailed: bool,

    /// Write per-episode figures to this CSV file.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Write histogram data of distinct repeated actions to this CSV file.
    #[arg(long, value_name = "PATH")]
    pub histogram: Option<PathBuf>,

    /// Write box-plot data of distinct repeated actions to this CSV file.
    #[arg(long, value_name = "PATH")]
    pub boxplot: Option<PathBuf>,

    /// Histogram bin count.
    #[arg(long)]
    pub bins: Option<usize>,
}

/// Execute the repeats subcommand.
pub fn run_repeats(args: &RepeatsArgs, config: &AnalysisConfig) -> Result<u8> {
    let mut config = config.clone();
    if let Some(bins) = args.bins {
        config.histogram_bins = bins;
    }
    let config = finish_config(config)?;

    let report = analyze_repeats(&load_files(&args.files), &config);
    if report.is_empty() {
        println!("No episodes found in the provided files.");
        return Ok(0);
    }

    if args.json {
        print_json(&report)?;
    } else {
        print!("{}", repeats::render_text(&report));
        if args.detailed {
            print!("{}", repeats::render_detailed(&report));
        }
    }

    if let Some(path) = &args.csv {
        repeats::write_repeat_csv(path, &report)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(file = %path.display(), "wrote repeat table");
    }
    if let Some(path) = &args.histogram {
        repeats::write_histogram_csv(path, &report, config.histogram_bins)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(file = %path.display(), bins = config.histogram_bins, "wrote histogram data");
    }
    if let Some(path) = &args.boxplot {
        repeats::write_boxplot_csv(path, &report)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(file = %path.display(), "wrote box-plot data");
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(files: Vec<PathBuf>) -> RepeatsArgs {
        RepeatsArgs {
            files,
            json: false,
            detailed: true,
            csv: None,
            histogram: None,
            boxplot: None,
            bins: None,
        }
    }

    #[test]
    fn writes_requested_exports() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("e.jsonl");
        std::fs::write(
            &log,
            r#"{"trajectory": {"actions": [{"action_type": "A"}, {"action_type": "A"}], "rewards": [-1, 99]}}"#,
        )
        .unwrap();

        let mut a = args(vec![log]);
        a.csv = Some(dir.path().join("r.csv"));
        a.boxplot = Some(dir.path().join("b.csv"));
        assert_eq!(run_repeats(&a, &AnalysisConfig::default()).unwrap(), 0);
        assert!(a.csv.as_ref().unwrap().exists());
        assert!(a.boxplot.as_ref().unwrap().exists());
    }

    #[test]
    fn empty_input_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let a = args(vec![dir.path().join("missing.jsonl")]);
        assert_eq!(run_repeats(&a, &AnalysisConfig::default()).unwrap(), 0);
    }

    #[test]
    fn zero_bins_rejected() {
        let mut a = args(Vec::new());
        a.bins = Some(0);
        assert!(run_repeats(&a, &AnalysisConfig::default()).is_err());
    }
}
