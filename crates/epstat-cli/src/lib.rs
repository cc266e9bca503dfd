//! # epstat-cli: Command-Line Interface for Episode Log Analysis
//!
//! Provides the `epstat` binary. Each subcommand module holds its clap
//! arguments and a `run_*` handler that loads the inputs, calls into
//! `epstat-report` and prints the result.
//!
//! ## Subcommands
//!
//! - `epstat count`: Per-file episode inventory.
//! - `epstat summary`: Win rate and step/reward statistics.
//! - `epstat repeats`: Repeated-action statistics, CSV and plot data.
//! - `epstat schema`: Field and type inference.
//! - `epstat early-terminations`: Non-wins that stopped early.
//! - `epstat short-losses`: Short losing episodes with their last actions.
//! - `epstat investigate`: Deep dive into chosen episodes of one file.
//! - `epstat export-outcomes`: `network,episode,outcome` CSV.
//!
//! ```bash
//! epstat summary runs/*.jsonl --compact
//! epstat repeats runs/q_agent.jsonl --csv repeats.csv --boxplot box.csv
//! epstat -v --config epstat.yaml early-terminations runs/q_agent.jsonl
//! ```
//!
//! ## Crate Policy
//!
//! - Handlers delegate to `epstat-report`; no analysis logic here.
//! - Reports go to stdout, diagnostics go to stderr through `tracing`.
//! - Handlers return `anyhow::Result<u8>`; the `u8` is the exit code.

pub mod count;
pub mod investigate;
pub mod outcomes;
pub mod repeats;
pub mod schema;
pub mod summary;
pub mod terminations;

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use epstat_core::AnalysisConfig;

/// Load the analysis configuration.
///
/// Without a path the built-in defaults are used. The result is not yet
/// validated; callers apply their flag overrides first and then call
/// [`finish_config`].
pub fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => {
            let config = AnalysisConfig::from_yaml_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?;
            tracing::debug!(config = %path.display(), "loaded configuration");
            Ok(config)
        }
        None => Ok(AnalysisConfig::default()),
    }
}

/// Validate a configuration after overrides were applied.
pub fn finish_config(config: AnalysisConfig) -> Result<AnalysisConfig> {
    config.validate().context("invalid analysis configuration")?;
    Ok(config)
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize report")?;
    println!("{text}");
    Ok(())
}
