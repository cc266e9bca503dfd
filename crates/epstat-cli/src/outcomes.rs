//! # Export-Outcomes Subcommand
//!
//! Merges per-network episode result files into one
//! `network,episode,outcome` CSV.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use epstat_core::AnalysisConfig;
use epstat_report::outcomes::write_outcome_csv;
use epstat_report::{collect_outcomes, OutcomeSource};

use crate::finish_config;

/// Arguments for the `epstat export-outcomes` subcommand.
#[derive(Args, Debug)]
pub struct ExportOutcomesArgs {
    /// Sources as `NETWORK:PATH[:OFFSET]`.
    #[arg(required = true, value_name = "SOURCE")]
    pub sources: Vec<OutcomeSource>,

    /// Output CSV path.
    #[arg(short, long, default_value = "episodes.csv")]
    pub output: PathBuf,

    /// End reason that counts as a win.
    #[arg(long)]
    pub success_reason: Option<String>,
}

/// Execute the export-outcomes subcommand.
pub fn run_export_outcomes(args: &ExportOutcomesArgs, config: &AnalysisConfig) -> Result<u8> {
    let mut config = config.clone();
    if let Some(reason) = &args.success_reason {
        config.success_end_reason = reason.clone();
    }
    let config = finish_config(config)?;

    let rows = collect_outcomes(&args.sources, &config.success_end_reason)?;
    write_outcome_csv(&args.output, &rows)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!("Wrote {} episodes to {}", rows.len(), args.output.display());
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exports_rows() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("n1.json");
        std::fs::write(
            &src,
            r#"[{"episode": 1, "end_reason": "AgentStatus.Success"}, {"episode": 2}]"#,
        )
        .unwrap();
        let args = ExportOutcomesArgs {
            sources: vec![OutcomeSource { network: 1, path: src, offset: 0 }],
            output: dir.path().join("out.csv"),
            success_reason: None,
        };
        assert_eq!(run_export_outcomes(&args, &AnalysisConfig::default()).unwrap(), 0);
        assert_eq!(
            std::fs::read_to_string(&args.output).unwrap(),
            "network,episode,outcome\n1,1,win\n1,2,fail\n"
        );
    }
}
