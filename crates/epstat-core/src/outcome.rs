//! # Outcome Classification
//!
//! Win/loss rules shared by every analysis. An episode without actions is
//! never a win or a loss; it is [`Outcome::NoAction`] and callers that
//! report win/loss statistics skip it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::episode::Episode;

/// Final reward at or above which an episode counts as a win.
pub const DEFAULT_WIN_THRESHOLD: f64 = 50.0;

/// Episode outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Final reward reached the win threshold.
    Win,
    /// Actions were taken but the final reward stayed below the threshold.
    Loss,
    /// The episode has no actions.
    NoAction,
}

impl Outcome {
    /// Classify an episode against `win_threshold` (inclusive).
    pub fn classify(episode: &Episode, win_threshold: f64) -> Self {
        if !episode.has_actions() {
            return Self::NoAction;
        }
        match episode.final_reward() {
            Some(reward) if is_win_reward(reward, win_threshold) => Self::Win,
            _ => Self::Loss,
        }
    }

    /// Returns the identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Win => "win",
            Self::Loss => "loss",
            Self::NoAction => "no_action",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True when `reward` reaches `win_threshold`.
pub fn is_win_reward(reward: f64, win_threshold: f64) -> bool {
    reward >= win_threshold
}

/// Why a losing episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossKind {
    /// The agent used up the step budget.
    StepLimit,
    /// The episode ended before the step budget, which in this environment
    /// means the agent exhausted its allowance of invalid actions.
    InvalidActions,
}

impl LossKind {
    /// Classify a loss by its length.
    pub fn classify(num_actions: usize, step_limit: usize) -> Self {
        if num_actions >= step_limit {
            Self::StepLimit
        } else {
            Self::InvalidActions
        }
    }

    /// Returns the identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StepLimit => "step_limit",
            Self::InvalidActions => "invalid_actions",
        }
    }
}

/// Termination class used by the early-termination report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Winning episode.
    Win,
    /// Non-win that ran at least the step threshold.
    NormalLoss,
    /// Non-win that stopped short of the step threshold.
    EarlyTermination,
}

impl Termination {
    /// Classify an episode that has actions. Returns `None` for episodes
    /// without actions.
    pub fn classify(episode: &Episode, win_threshold: f64, step_threshold: usize) -> Option<Self> {
        match Outcome::classify(episode, win_threshold) {
            Outcome::NoAction => None,
            Outcome::Win => Some(Self::Win),
            Outcome::Loss if episode.num_actions() < step_threshold => {
                Some(Self::EarlyTermination)
            }
            Outcome::Loss => Some(Self::NormalLoss),
        }
    }
}
