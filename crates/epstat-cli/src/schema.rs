//! # Schema Subcommand
//!
//! Infers the field structure of JSONL files from their first records.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use epstat_core::AnalysisConfig;
use epstat_report::{analyze_schema, schema};

use crate::finish_config;

/// Arguments for the `epstat schema` subcommand.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// JSONL files to inspect.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Records to analyze per file.
    #[arg(long)]
    pub max_lines: Option<usize>,
}

/// Execute the schema subcommand.
///
/// A file that cannot be read is reported and the remaining files are
/// still analyzed.
pub fn run_schema(args: &SchemaArgs, config: &AnalysisConfig) -> Result<u8> {
    let mut config = config.clone();
    if let Some(max_lines) = args.max_lines {
        config.schema_max_lines = max_lines;
    }
    let config = finish_config(config)?;

    for path in &args.files {
        match analyze_schema(path, config.schema_max_lines) {
            Ok(report) => print!("{}", schema::render_text(&report)),
            Err(e) if e.is_not_found() => {
                tracing::warn!("file not found: {}", path.display());
            }
            Err(e) => tracing::error!("error analyzing {}: {e}", path.display()),
        }
    }
    Ok(0)
}
