//! # Analysis Configuration
//!
//! Thresholds shared by the analyses. Defaults reproduce the environment's
//! conventions (win at final reward 50, 100-step budget). A YAML file may
//! override any subset:
//!
//! ```yaml
//! win_threshold: 50
//! step_limit: 100
//! early_termination_steps: 95
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EpstatError;
use crate::outcome::DEFAULT_WIN_THRESHOLD;

/// Tunable thresholds for every analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Final reward at or above which an episode is a win.
    pub win_threshold: f64,
    /// Loss length at or above which the loss is a step-limit loss.
    pub step_limit: usize,
    /// Non-wins shorter than this are early terminations.
    pub early_termination_steps: usize,
    /// Longest loss reported by the short-loss report.
    pub short_loss_max_steps: usize,
    /// Records sampled per file by schema inference.
    pub schema_max_lines: usize,
    /// Number of bins for histogram data.
    pub histogram_bins: usize,
    /// `end_reason` that marks a won episode in exported episode files.
    pub success_end_reason: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            win_threshold: DEFAULT_WIN_THRESHOLD,
            step_limit: 100,
            early_termination_steps: 95,
            short_loss_max_steps: 50,
            schema_max_lines: 100,
            histogram_bins: 20,
            success_end_reason: "AgentStatus.Success".to_string(),
        }
    }
}

impl AnalysisConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, EpstatError> {
        let config: Self =
            serde_yaml::from_str(text).map_err(|e| EpstatError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, EpstatError> {
        let text = std::fs::read_to_string(path).map_err(|e| EpstatError::io(path, e))?;
        Self::from_yaml_str(&text)
    }

    /// Reject values no analysis can work with.
    pub fn validate(&self) -> Result<(), EpstatError> {
        if !self.win_threshold.is_finite() {
            return Err(EpstatError::Config(format!(
                "win_threshold must be finite, got {}",
                self.win_threshold
            )));
        }
        if self.histogram_bins == 0 {
            return Err(EpstatError::Config(
                "histogram_bins must be at least 1".to_string(),
            ));
        }
        if self.schema_max_lines == 0 {
            return Err(EpstatError::Config(
                "schema_max_lines must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
