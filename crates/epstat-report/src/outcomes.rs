//! # Outcome Export
//!
//! Converts per-network episode result files into a single
//! `network,episode,outcome` CSV table.
//!
//! Each source file is a JSON array of `{"episode": N, "end_reason": ...}`
//! objects. A source may shift its episode numbers by an offset, which is
//! how a network split across two files is numbered continuously.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use epstat_core::EpstatError;

use crate::export;

/// One input of the export: a network id, a file and an episode offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeSource {
    /// Network identifier written to every row from this file.
    pub network: u32,
    /// JSON array file.
    pub path: PathBuf,
    /// Added to every episode number from this file.
    pub offset: i64,
}

impl FromStr for OutcomeSource {
    type Err = EpstatError;

    /// Parse `NETWORK:PATH` or `NETWORK:PATH:OFFSET`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EpstatError::InvalidSource(s.to_string());
        let (network, rest) = s.split_once(':').ok_or_else(invalid)?;
        let network = network.trim().parse::<u32>().map_err(|_| invalid())?;

        let (path, offset) = match rest.rsplit_once(':') {
            Some((path, offset)) => match offset.trim().parse::<i64>() {
                Ok(offset) => (path, offset),
                Err(_) => (rest, 0),
            },
            None => (rest, 0),
        };
        if path.is_empty() {
            return Err(invalid());
        }
        Ok(Self {
            network,
            path: PathBuf::from(path),
            offset,
        })
    }
}

impl fmt::Display for OutcomeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.network, self.path.display(), self.offset)
    }
}

/// Exported outcome label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportOutcome {
    /// The episode ended with the success end reason.
    Win,
    /// Any other end reason, including a missing one.
    Fail,
}

impl ExportOutcome {
    /// Classify an end reason against the success reason.
    pub fn from_end_reason(end_reason: Option<&str>, success_reason: &str) -> Self {
        if end_reason == Some(success_reason) {
            Self::Win
        } else {
            Self::Fail
        }
    }
}

/// Entry of a source file.
#[derive(Debug, Clone, Deserialize)]
struct EpisodeEnd {
    episode: i64,
    #[serde(default)]
    end_reason: Option<String>,
}

/// One row of the exported table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRow {
    /// Network identifier.
    pub network: u32,
    /// Episode number after the offset.
    pub episode: i64,
    /// `win` or `fail`.
    pub outcome: ExportOutcome,
}

/// Read one source file into rows.
pub fn load_source(source: &OutcomeSource, success_reason: &str) -> Result<Vec<OutcomeRow>, EpstatError> {
    let text = std::fs::read_to_string(&source.path).map_err(|e| EpstatError::io(&source.path, e))?;
    let entries: Vec<EpisodeEnd> = serde_json::from_str(&text).map_err(|e| EpstatError::Json {
        path: source.path.clone(),
        source: e,
    })?;
    Ok(entries
        .into_iter()
        .map(|entry| OutcomeRow {
            network: source.network,
            episode: entry.episode + source.offset,
            outcome: ExportOutcome::from_end_reason(entry.end_reason.as_deref(), success_reason),
        })
        .collect())
}

/// Rows of every readable source, sorted by network then episode.
///
/// Missing files are warned about and skipped; malformed files are errors.
pub fn collect_outcomes(sources: &[OutcomeSource], success_reason: &str) -> Result<Vec<OutcomeRow>, EpstatError> {
    let mut rows = Vec::new();
    for source in sources {
        match load_source(source, success_reason) {
            Ok(loaded) => {
                tracing::info!(source = %source, episodes = loaded.len(), "loaded episode outcomes");
                rows.extend(loaded);
            }
            Err(e) if e.is_not_found() => {
                tracing::warn!("{} not found, skipping source {source}", source.path.display());
            }
            Err(e) => return Err(e),
        }
    }
    rows.sort_by_key(|r| (r.network, r.episode));
    Ok(rows)
}

/// Write the outcome table.
pub fn write_outcome_csv(path: &Path, rows: &[OutcomeRow]) -> Result<(), EpstatError> {
    export::write_csv(path, rows)
}
