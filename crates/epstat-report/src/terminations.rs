//! # Early Terminations and Short Losses
//!
//! Two views of episodes that stopped before the step budget ran out.
//!
//! - [`early_terminations`] classifies every episode with actions as a
//!   win, a normal loss, or an early termination (a non-win shorter than
//!   the step threshold) and profiles the early group.
//! - [`short_losses`] lists losing episodes of at most a given length with
//!   their last actions and final-state counters.

use std::fmt::Write;

use serde::Serialize;

use epstat_core::{state_list_len, AnalysisConfig, Termination};

use crate::format;
use crate::loader::EpisodeSet;
use crate::stats::{Distribution, Tally};

/// Trailing actions listed for each short loss.
pub const LAST_ACTIONS: usize = 5;

/// One non-winning episode that ended early.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarlyEpisode {
    /// Source file path.
    pub file: String,
    /// 1-based line number.
    pub line: usize,
    /// Number of actions.
    pub num_actions: usize,
    /// Last reward.
    pub final_reward: Option<f64>,
    /// Sum of rewards.
    pub total_reward: f64,
    /// Recorded end reason.
    pub end_reason: String,
    /// Last action type.
    pub final_action: String,
}

/// Early-termination report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EarlyTerminationReport {
    /// Step threshold used.
    pub step_threshold: usize,
    /// Winning episodes.
    pub wins: usize,
    /// Losses that reached the step threshold.
    pub normal_losses: usize,
    /// Early terminations sorted by action count.
    pub early: Vec<EarlyEpisode>,
    /// Action-count distribution of the early group.
    pub steps: Option<Distribution>,
    /// End reasons of the early group.
    pub end_reasons: Tally,
    /// Final actions of the early group.
    pub final_actions: Tally,
}

/// Classify every episode with actions and profile the early terminations.
pub fn early_terminations(set: &EpisodeSet, config: &AnalysisConfig) -> EarlyTerminationReport {
    let mut report = EarlyTerminationReport {
        step_threshold: config.early_termination_steps,
        ..EarlyTerminationReport::default()
    };

    for loaded in set.episodes() {
        let episode = &loaded.episode;
        let class = Termination::classify(
            episode,
            config.win_threshold,
            config.early_termination_steps,
        );
        match class {
            None => {}
            Some(Termination::Win) => report.wins += 1,
            Some(Termination::NormalLoss) => report.normal_losses += 1,
            Some(Termination::EarlyTermination) => report.early.push(EarlyEpisode {
                file: loaded.file.display().to_string(),
                line: loaded.line,
                num_actions: episode.num_actions(),
                final_reward: episode.final_reward(),
                total_reward: episode.total_reward(),
                end_reason: episode.end_reason_label(),
                final_action: format::opt_label(episode.final_action_type()),
            }),
        }
    }

    // Stable sort keeps input order among equal lengths.
    report.early.sort_by_key(|e| e.num_actions);
    let steps: Vec<f64> = report.early.iter().map(|e| e.num_actions as f64).collect();
    report.steps = Distribution::of(&steps);
    report.end_reasons = report.early.iter().map(|e| e.end_reason.as_str()).collect();
    report.final_actions = report.early.iter().map(|e| e.final_action.as_str()).collect();
    report
}

/// Render the early-termination report.
pub fn render_early_text(report: &EarlyTerminationReport) -> String {
    let mut out = String::new();
    format::banner(&mut out, "SUMMARY");
    let _ = writeln!(out, "Total episodes analyzed:");
    let _ = writeln!(out, "  Wins: {}", report.wins);
    let _ = writeln!(
        out,
        "  Normal losses (>= {} steps): {}",
        report.step_threshold, report.normal_losses
    );
    let _ = writeln!(
        out,
        "  Early terminations (< {} steps, non-wins): {}",
        report.step_threshold,
        report.early.len()
    );

    let Some(steps) = report.steps else {
        return out;
    };

    format::banner(&mut out, "EARLY TERMINATIONS DETAILS");
    for ep in &report.early {
        let _ = writeln!(out, "File: {}, Line: {}", ep.file, ep.line);
        let _ = writeln!(out, "  Actions: {}", ep.num_actions);
        let _ = writeln!(out, "  Final reward: {}", format::opt_number(ep.final_reward));
        let _ = writeln!(out, "  Total reward: {}", ep.total_reward);
        let _ = writeln!(out, "  End reason: {}", ep.end_reason);
        let _ = writeln!(out, "  Final action: {}", ep.final_action);
        out.push('\n');
    }

    format::banner(&mut out, "EARLY TERMINATION STATISTICS");
    let _ = writeln!(out, "  Count: {}", steps.count);
    let _ = writeln!(out, "  Min actions: {}", steps.min);
    let _ = writeln!(out, "  Max actions: {}", steps.max);
    let _ = writeln!(out, "  Avg actions: {:.1}", steps.mean);
    let _ = writeln!(out, "\n  End reason distribution:");
    format::tally_lines(&mut out, &report.end_reasons, "    ", "");
    let _ = writeln!(out, "\n  Final action distribution:");
    format::tally_lines(&mut out, &report.final_actions, "    ", "");
    out
}

/// One of the trailing actions of a short loss.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrailingAction {
    /// 1-based position in the episode.
    pub index: usize,
    /// Action type, `none` when missing.
    pub action_type: String,
    /// Reward at the same position, if recorded.
    pub reward: Option<f64>,
}

/// A losing episode that ended within the step cap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortLoss {
    /// Source file path.
    pub file: String,
    /// 1-based line number.
    pub line: usize,
    /// Number of actions.
    pub num_actions: usize,
    /// Last reward.
    pub final_reward: f64,
    /// Sum of rewards.
    pub total_reward: f64,
    /// Recorded end reason.
    pub end_reason: String,
    /// Up to [`LAST_ACTIONS`] trailing actions.
    pub last_actions: Vec<TrailingAction>,
    /// Controlled hosts in the final state.
    pub controlled_hosts: usize,
    /// Known hosts in the final state.
    pub known_hosts: usize,
    /// Known data entries in the final state.
    pub known_data: usize,
}

/// Losing episodes with at most `max_steps` actions.
///
/// An episode is losing here only when it has a final reward below the win
/// threshold; episodes without rewards are not listed.
pub fn short_losses(set: &EpisodeSet, config: &AnalysisConfig, max_steps: usize) -> Vec<ShortLoss> {
    let mut found = Vec::new();
    for loaded in set.episodes() {
        let episode = &loaded.episode;
        let num_actions = episode.num_actions();
        if num_actions == 0 || num_actions > max_steps {
            continue;
        }
        let Some(final_reward) = episode.final_reward() else {
            continue;
        };
        if final_reward >= config.win_threshold {
            continue;
        }

        let actions = &episode.trajectory.actions;
        let start = num_actions.saturating_sub(LAST_ACTIONS);
        let last_actions = actions[start..]
            .iter()
            .enumerate()
            .map(|(offset, action)| {
                let position = start + offset;
                TrailingAction {
                    index: position + 1,
                    action_type: format::opt_label(epstat_core::action_type(action)),
                    reward: episode.trajectory.rewards.get(position).copied(),
                }
            })
            .collect();

        let state = episode.final_state();
        let count = |field| state.map_or(0, |s| state_list_len(s, field));
        found.push(ShortLoss {
            file: loaded.file.display().to_string(),
            line: loaded.line,
            num_actions,
            final_reward,
            total_reward: episode.total_reward(),
            end_reason: episode.end_reason_label(),
            last_actions,
            controlled_hosts: count("controlled_hosts"),
            known_hosts: count("known_hosts"),
            known_data: count("known_data"),
        });
    }
    tracing::debug!(found = found.len(), max_steps, "collected short losses");
    found
}

/// Render the short-loss listing.
pub fn render_short_losses(losses: &[ShortLoss]) -> String {
    let mut out = String::new();
    for loss in losses {
        let rule = "=".repeat(format::RULE_WIDTH);
        let _ = writeln!(out, "\n{rule}");
        let _ = writeln!(out, "File: {}", loss.file);
        let _ = writeln!(out, "Line: {}", loss.line);
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "Number of actions: {}", loss.num_actions);
        let _ = writeln!(out, "Final reward: {}", loss.final_reward);
        let _ = writeln!(out, "Total reward: {}", loss.total_reward);
        let _ = writeln!(out, "End reason: {}", loss.end_reason);
        let _ = writeln!(out, "\nLast {} actions:", LAST_ACTIONS);
        for action in &loss.last_actions {
            let reward = action
                .reward
                .map_or_else(|| "N/A".to_string(), |r| r.to_string());
            let _ = writeln!(
                out,
                "  {}. {} - reward: {reward}",
                action.index, action.action_type
            );
        }
        let _ = writeln!(out, "\nFinal state info:");
        let _ = writeln!(out, "  Controlled hosts: {}", loss.controlled_hosts);
        let _ = writeln!(out, "  Known hosts: {}", loss.known_hosts);
        let _ = writeln!(out, "  Known data: {}", loss.known_data);
    }
    if losses.is_empty() {
        let _ = writeln!(out, "No short losing episodes found.");
    }
    out
}
