//! # Win/Loss Summary
//!
//! Headline performance numbers over episodes that took at least one
//! action: win rate, losses split by [`LossKind`], and step/reward
//! statistics per category.

use std::fmt::Write;

use serde::Serialize;

use epstat_core::{AnalysisConfig, Episode, LossKind, Outcome};

use crate::format;
use crate::loader::EpisodeSet;
use crate::stats::{mean, percent, Tally};

/// Step and reward figures for one group of episodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupStats {
    /// Episodes in the group.
    pub count: usize,
    /// Mean number of actions.
    pub avg_steps: f64,
    /// Mean total reward.
    pub avg_reward: f64,
    /// Fewest actions, 0 for an empty group.
    pub min_steps: usize,
    /// Most actions, 0 for an empty group.
    pub max_steps: usize,
    /// Final `action_type` counts.
    pub final_actions: Tally,
}

#[derive(Default)]
struct GroupBuilder {
    steps: Vec<usize>,
    rewards: Vec<f64>,
    final_actions: Tally,
}

impl GroupBuilder {
    fn push(&mut self, episode: &Episode) {
        self.steps.push(episode.num_actions());
        self.rewards.push(episode.total_reward());
        self.final_actions
            .add(episode.final_action_type().unwrap_or("none"));
    }

    fn finish(self) -> GroupStats {
        let steps: Vec<f64> = self.steps.iter().map(|&s| s as f64).collect();
        GroupStats {
            count: self.steps.len(),
            avg_steps: mean(&steps),
            avg_reward: mean(&self.rewards),
            min_steps: self.steps.iter().copied().min().unwrap_or(0),
            max_steps: self.steps.iter().copied().max().unwrap_or(0),
            final_actions: self.final_actions,
        }
    }
}

/// Summary of a set of episodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryReport {
    /// Episodes with at least one action.
    pub total_episodes: usize,
    /// Winning episodes.
    pub wins: usize,
    /// Losing episodes.
    pub losses: usize,
    /// Losses that ran into the step limit.
    pub losses_step_limit: usize,
    /// Losses that ended early.
    pub losses_invalid_actions: usize,
    /// `wins / total_episodes * 100`.
    pub win_rate: f64,
    /// Step limit used to split losses.
    pub step_limit: usize,
    /// All episodes.
    pub overall: GroupStats,
    /// Winning episodes.
    pub wins_stats: GroupStats,
    /// Losing episodes.
    pub loss_stats: GroupStats,
    /// Step-limit losses.
    pub loss_step_limit_stats: GroupStats,
    /// Invalid-action losses.
    pub loss_invalid_actions_stats: GroupStats,
}

/// Summarise `set`. Episodes without actions are ignored.
pub fn summarize(set: &EpisodeSet, config: &AnalysisConfig) -> SummaryReport {
    let mut overall = GroupBuilder::default();
    let mut wins = GroupBuilder::default();
    let mut losses = GroupBuilder::default();
    let mut step_limit = GroupBuilder::default();
    let mut invalid = GroupBuilder::default();

    for loaded in set.episodes() {
        let episode = &loaded.episode;
        match Outcome::classify(episode, config.win_threshold) {
            Outcome::NoAction => continue,
            Outcome::Win => wins.push(episode),
            Outcome::Loss => {
                losses.push(episode);
                match LossKind::classify(episode.num_actions(), config.step_limit) {
                    LossKind::StepLimit => step_limit.push(episode),
                    LossKind::InvalidActions => invalid.push(episode),
                }
            }
        }
        overall.push(episode);
    }

    let overall = overall.finish();
    let wins_stats = wins.finish();
    let loss_stats = losses.finish();
    let loss_step_limit_stats = step_limit.finish();
    let loss_invalid_actions_stats = invalid.finish();

    tracing::debug!(
        total = overall.count,
        wins = wins_stats.count,
        losses = loss_stats.count,
        "summarized episodes"
    );

    SummaryReport {
        total_episodes: overall.count,
        wins: wins_stats.count,
        losses: loss_stats.count,
        losses_step_limit: loss_step_limit_stats.count,
        losses_invalid_actions: loss_invalid_actions_stats.count,
        win_rate: percent(wins_stats.count, overall.count),
        step_limit: config.step_limit,
        overall,
        wins_stats,
        loss_stats,
        loss_step_limit_stats,
        loss_invalid_actions_stats,
    }
}

/// One-line summary.
pub fn render_compact(report: &SummaryReport) -> String {
    format!(
        "Episodes: {} | Wins: {} ({:.1}%) | Losses: {} (StepLimit: {}, InvalidActions: {}) | Avg Reward: {:.1} | Avg Steps to Win: {:.1}",
        report.total_episodes,
        report.wins,
        report.win_rate,
        report.losses,
        report.losses_step_limit,
        report.losses_invalid_actions,
        report.overall.avg_reward,
        report.wins_stats.avg_steps,
    )
}

/// Full text summary.
pub fn render_text(report: &SummaryReport) -> String {
    let mut out = String::new();
    format::banner(&mut out, "EPISODE SUMMARY");
    let _ = writeln!(out, "Total Episodes (with actions): {}", report.total_episodes);
    let _ = writeln!(out, "Wins: {}", report.wins);
    let _ = writeln!(out, "Losses: {}", report.losses);
    let _ = writeln!(out, "  - Step Limit Reached: {}", report.losses_step_limit);
    let _ = writeln!(out, "  - Invalid Actions Exhausted: {}", report.losses_invalid_actions);
    if report.total_episodes > 0 {
        let _ = writeln!(out, "Win Rate: {:.1}%", report.win_rate);
    } else {
        let _ = writeln!(out, "Win Rate: N/A");
    }

    format::section(&mut out, "OVERALL STATISTICS");
    if report.overall.count > 0 {
        let o = &report.overall;
        let _ = writeln!(out, "Average Steps: {:.1}", o.avg_steps);
        let _ = writeln!(out, "Average Total Reward: {:.2}", o.avg_reward);
        let _ = writeln!(out, "Min Steps: {}", o.min_steps);
        let _ = writeln!(out, "Max Steps: {}", o.max_steps);
    }

    format::section(&mut out, "WINNING EPISODES");
    let w = &report.wins_stats;
    if w.count > 0 {
        let _ = writeln!(out, "Number of Wins: {}", w.count);
        let _ = writeln!(out, "Average Steps to Win: {:.1}", w.avg_steps);
        let _ = writeln!(out, "Average Total Reward: {:.2}", w.avg_reward);
        let _ = writeln!(out, "Fastest Win: {} steps", w.min_steps);
        let _ = writeln!(out, "Slowest Win: {} steps", w.max_steps);
        let _ = writeln!(out, "\nFinal Actions in Winning Episodes:");
        format::tally_lines(&mut out, &w.final_actions, "  ", "");
    } else {
        let _ = writeln!(out, "No winning episodes found.");
    }

    format::section(&mut out, "LOSING EPISODES");
    let l = &report.loss_stats;
    if l.count > 0 {
        let _ = writeln!(out, "Number of Losses: {}", l.count);
        let _ = writeln!(out, "Average Steps in Loss: {:.1}", l.avg_steps);
        let _ = writeln!(out, "Average Total Reward: {:.2}", l.avg_reward);
        let _ = writeln!(out, "Min Steps: {} steps", l.min_steps);
        let _ = writeln!(out, "Max Steps: {} steps", l.max_steps);
        let _ = writeln!(out, "\nFinal Actions in Losing Episodes:");
        format::tally_lines(&mut out, &l.final_actions, "  ", "");

        format::subsection(&mut out, "LOSS TYPE: STEP LIMIT REACHED");
        loss_kind_block(&mut out, &report.loss_step_limit_stats, "No step-limit losses found.");
        format::subsection(&mut out, "LOSS TYPE: INVALID ACTIONS EXHAUSTED");
        loss_kind_block(
            &mut out,
            &report.loss_invalid_actions_stats,
            "No invalid-action losses found.",
        );
    } else {
        let _ = writeln!(out, "No losing episodes found.");
    }

    format::closing_rule(&mut out);
    out
}

fn loss_kind_block(out: &mut String, stats: &GroupStats, empty: &str) {
    if stats.count == 0 {
        let _ = writeln!(out, "{empty}");
        return;
    }
    let _ = writeln!(out, "Count: {}", stats.count);
    let _ = writeln!(out, "Average Steps: {:.1}", stats.avg_steps);
    let _ = writeln!(out, "Average Total Reward: {:.2}", stats.avg_reward);
    let _ = writeln!(out, "Min Steps: {} steps", stats.min_steps);
    let _ = writeln!(out, "Max Steps: {} steps", stats.max_steps);
    let _ = writeln!(out, "\nFinal Actions:");
    format::tally_lines(out, &stats.final_actions, "  ", "");
}
