//! # Investigate Subcommand
//!
//! Deep dive into individual episodes of one JSONL file. Without
//! `--episodes` or `--all`, one positive-reward, one negative-reward and
//! one action-less episode are shown.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use epstat_core::AnalysisConfig;
use epstat_report::{investigate, EpisodeSelection};

/// Arguments for the `epstat investigate` subcommand.
#[derive(Args, Debug)]
pub struct InvestigateArgs {
    /// JSONL file to investigate.
    pub file: PathBuf,

    /// 1-based episode numbers to show.
    #[arg(long, num_args = 1.., conflicts_with = "all")]
    pub episodes: Vec<usize>,

    /// Show every episode.
    #[arg(long)]
    pub all: bool,
}

impl InvestigateArgs {
    /// Episode selection implied by the flags.
    pub fn selection(&self) -> EpisodeSelection {
        if self.all {
            EpisodeSelection::All
        } else if !self.episodes.is_empty() {
            EpisodeSelection::Numbers(self.episodes.clone())
        } else {
            EpisodeSelection::Representative
        }
    }
}

/// Execute the investigate subcommand.
pub fn run_investigate(args: &InvestigateArgs, _config: &AnalysisConfig) -> Result<u8> {
    let text = investigate(&args.file, &args.selection())
        .with_context(|| format!("failed to investigate {}", args.file.display()))?;
    print!("{text}");
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(episodes: Vec<usize>, all: bool) -> InvestigateArgs {
        InvestigateArgs {
            file: PathBuf::from("e.jsonl"),
            episodes,
            all,
        }
    }

    #[test]
    fn selection_from_flags() {
        assert_eq!(args(Vec::new(), true).selection(), EpisodeSelection::All);
        assert_eq!(args(vec![2, 5], false).selection(), EpisodeSelection::Numbers(vec![2, 5]));
        assert_eq!(args(Vec::new(), false).selection(), EpisodeSelection::Representative);
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = args(Vec::new(), false);
        a.file = dir.path().join("nope.jsonl");
        assert!(run_investigate(&a, &AnalysisConfig::default()).is_err());
    }
}
