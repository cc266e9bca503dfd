//! # Episode Counting
//!
//! Per-file and per-episode inventory of a set of JSONL logs: how many
//! episodes each file holds, how they break down by agent, role, end
//! reason, outcome and final action, and what the final state of each
//! episode knew and controlled.
//!
//! Unlike the win/loss reports, action-less episodes are counted here; they
//! carry the `no_action` outcome.

use std::collections::BTreeSet;
use std::fmt::Write;

use serde::Serialize;
use serde_json::Value;

use epstat_core::{AnalysisConfig, Episode, Outcome};

use crate::format;
use crate::loader::{file_name, EpisodeSet};
use crate::stats::Tally;

/// Aggregates for one input file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileStats {
    /// Path as given on the command line.
    pub path: String,
    /// Decoded episodes.
    pub episodes: usize,
    /// Sum of actions over episodes.
    pub total_actions: usize,
    /// Sum of states over episodes.
    pub total_states: usize,
    /// Sum of rewards over episodes.
    pub total_reward: f64,
    /// File size on disk.
    pub size_bytes: u64,
}

/// Inventory of a single episode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeInventory {
    /// Source file name.
    pub file: String,
    /// 1-based line number.
    pub line_num: usize,
    /// Number of states.
    pub num_states: usize,
    /// Number of actions.
    pub num_actions: usize,
    /// Number of rewards.
    pub num_rewards: usize,
    /// Sum of rewards.
    pub total_reward: f64,
    /// Last reward.
    pub final_reward: Option<f64>,
    /// `action_type` of the last action (`unknown` if it has none).
    pub final_action: Option<String>,
    /// Recorded end reason.
    pub end_reason: String,
    /// Agent name.
    pub agent_name: Option<String>,
    /// Agent role.
    pub agent_role: Option<String>,
    /// Outcome by final reward.
    pub outcome: Outcome,
    /// Distinct controlled host IPs in the final state.
    pub controlled_hosts: BTreeSet<String>,
    /// Distinct known host IPs in the final state.
    pub known_hosts: BTreeSet<String>,
    /// Distinct known networks (`ip/mask`) in the final state.
    pub known_networks: BTreeSet<String>,
}

impl EpisodeInventory {
    fn build(file: String, line_num: usize, episode: &Episode, win_threshold: f64) -> Self {
        let final_state = episode.final_state();
        Self {
            file,
            line_num,
            num_states: episode.num_states(),
            num_actions: episode.num_actions(),
            num_rewards: episode.num_rewards(),
            total_reward: episode.total_reward(),
            final_reward: episode.final_reward(),
            final_action: episode.trajectory.actions.last().map(|a| {
                epstat_core::action_type(a)
                    .unwrap_or("unknown")
                    .to_string()
            }),
            end_reason: episode.end_reason_label(),
            agent_name: episode.agent_name_label(),
            agent_role: episode.agent_role_label(),
            outcome: Outcome::classify(episode, win_threshold),
            controlled_hosts: host_set(final_state, "controlled_hosts"),
            known_hosts: host_set(final_state, "known_hosts"),
            known_networks: network_set(final_state),
        }
    }
}

/// Result of counting a set of files.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CountReport {
    /// Episodes across all files.
    pub total_episodes: usize,
    /// Per-file aggregates in input order.
    pub files: Vec<FileStats>,
    /// Files that could not be read.
    pub skipped_files: Vec<String>,
    /// Episodes per agent name.
    pub by_agent: Tally,
    /// Episodes per agent role.
    pub by_role: Tally,
    /// Episodes per end reason.
    pub by_end_reason: Tally,
    /// Episodes per outcome.
    pub by_outcome: Tally,
    /// Episodes per final action type (episodes with actions only).
    pub by_final_action: Tally,
    /// One entry per episode.
    pub episode_details: Vec<EpisodeInventory>,
}

/// Count the episodes of `set`.
pub fn count_episodes(set: &EpisodeSet, config: &AnalysisConfig) -> CountReport {
    let mut report = CountReport {
        skipped_files: set
            .skipped
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
        ..CountReport::default()
    };

    for file in &set.files {
        let mut stats = FileStats {
            path: file.path.display().to_string(),
            episodes: 0,
            total_actions: 0,
            total_states: 0,
            total_reward: 0.0,
            size_bytes: file.size_bytes,
        };

        for loaded in &file.episodes {
            let inventory = EpisodeInventory::build(
                loaded.file_name(),
                loaded.line,
                &loaded.episode,
                config.win_threshold,
            );

            stats.episodes += 1;
            stats.total_actions += inventory.num_actions;
            stats.total_states += inventory.num_states;
            stats.total_reward += inventory.total_reward;

            report.total_episodes += 1;
            report
                .by_agent
                .add(inventory.agent_name.as_deref().unwrap_or("unknown"));
            report
                .by_role
                .add(inventory.agent_role.as_deref().unwrap_or("unknown"));
            report.by_end_reason.add(inventory.end_reason.as_str());
            report.by_outcome.add(inventory.outcome.as_str());
            if let Some(action) = &inventory.final_action {
                report.by_final_action.add(action.as_str());
            }
            report.episode_details.push(inventory);
        }

        report.files.push(stats);
    }

    report
}

/// Distinct host IPs listed under `field` of the state.
///
/// Hosts may be objects with an `ip` member or bare strings.
fn host_set(state: Option<&Value>, field: &str) -> BTreeSet<String> {
    let Some(Value::Array(hosts)) = state.and_then(|s| s.get(field)) else {
        return BTreeSet::new();
    };
    hosts
        .iter()
        .filter_map(|host| match host {
            Value::String(ip) => Some(ip.clone()),
            Value::Object(_) => host.get("ip").map(scalar_label),
            _ => None,
        })
        .collect()
}

/// Distinct `ip/mask` labels of the state's known networks.
fn network_set(state: Option<&Value>) -> BTreeSet<String> {
    let Some(Value::Array(networks)) = state.and_then(|s| s.get("known_networks")) else {
        return BTreeSet::new();
    };
    networks
        .iter()
        .filter_map(|net| match net {
            Value::String(label) => Some(label.clone()),
            Value::Object(_) => Some(format!(
                "{}/{}",
                net.get("ip").map_or_else(|| "none".to_string(), scalar_label),
                net.get("mask").map_or_else(|| "none".to_string(), scalar_label),
            )),
            _ => None,
        })
        .collect()
}

fn scalar_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render the report as text.
pub fn render_text(report: &CountReport) -> String {
    let mut out = String::new();
    format::banner(&mut out, "EPISODE ANALYSIS SUMMARY");
    let _ = writeln!(out, "Total Episodes: {}", report.total_episodes);
    let _ = writeln!(out, "Total Files: {}", report.files.len());
    for skipped in &report.skipped_files {
        let _ = writeln!(out, "Skipped (unreadable): {skipped}");
    }

    format::section(&mut out, "BY FILE:");
    for stats in &report.files {
        let name = file_name(std::path::Path::new(&stats.path));
        let _ = writeln!(out, "{name}");
        let _ = writeln!(out, "  Episodes: {}", stats.episodes);
        let _ = writeln!(out, "  Total Actions: {}", stats.total_actions);
        let _ = writeln!(out, "  Total States: {}", stats.total_states);
        let _ = writeln!(out, "  Total Reward: {:.2}", stats.total_reward);
        let _ = writeln!(out, "  File Size: {}", format::format_bytes(stats.size_bytes));
        if stats.episodes > 0 {
            let n = stats.episodes as f64;
            let _ = writeln!(out, "  Avg Actions/Episode: {:.1}", stats.total_actions as f64 / n);
            let _ = writeln!(out, "  Avg States/Episode: {:.1}", stats.total_states as f64 / n);
            let _ = writeln!(out, "  Avg Reward/Episode: {:.2}", stats.total_reward / n);
        }
        out.push('\n');
    }

    for (title, tally) in [
        ("BY AGENT:", &report.by_agent),
        ("BY ROLE:", &report.by_role),
        ("BY END REASON:", &report.by_end_reason),
        ("BY OUTCOME:", &report.by_outcome),
    ] {
        if tally.is_empty() {
            continue;
        }
        format::section(&mut out, title);
        for (label, count) in tally.by_label() {
            let _ = writeln!(out, "  {label}: {count} episodes");
        }
    }

    if !report.by_final_action.is_empty() {
        format::section(&mut out, "BY FINAL ACTION (for completed episodes):");
        format::tally_lines(&mut out, &report.by_final_action, "  ", " episodes");
    }

    if !report.episode_details.is_empty() {
        format::banner(&mut out, "EPISODE DETAILS");
        for (i, ep) in report.episode_details.iter().enumerate() {
            let symbol = match ep.outcome {
                Outcome::Win => "✓",
                Outcome::Loss => "✗",
                Outcome::NoAction => "○",
            };
            let _ = writeln!(
                out,
                "Episode {} [{symbol} {}] ({}:L{})",
                i + 1,
                ep.outcome.as_str().to_uppercase(),
                ep.file,
                ep.line_num
            );
            let _ = writeln!(
                out,
                "  Agent: {} ({})",
                format::opt_label(ep.agent_name.as_deref()),
                format::opt_label(ep.agent_role.as_deref())
            );
            let _ = writeln!(
                out,
                "  States: {}, Actions: {}, Rewards: {}",
                ep.num_states, ep.num_actions, ep.num_rewards
            );
            let _ = writeln!(
                out,
                "  Total Reward: {:.2}, Final Reward: {}",
                ep.total_reward,
                format::opt_number(ep.final_reward)
            );
            let _ = writeln!(
                out,
                "  Final Action: {}",
                format::opt_label(ep.final_action.as_deref())
            );
            let _ = writeln!(
                out,
                "  Controlled Hosts: {}, Known Hosts: {}, Known Networks: {}",
                ep.controlled_hosts.len(),
                ep.known_hosts.len(),
                ep.known_networks.len()
            );
            out.push('\n');
        }
    }

    out
}
