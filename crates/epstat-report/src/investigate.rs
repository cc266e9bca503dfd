//! # Episode Investigation
//!
//! Deep dive into individual episodes of one file, working on the raw
//! JSON so that fields outside the episode model stay visible.

use std::fmt::Write;
use std::path::Path;

use serde_json::Value;

use epstat_core::{scan_file, EpstatError};

use crate::format;

/// State members every state is expected to carry. Anything else in the
/// last state is reported as a special field.
pub const STANDARD_STATE_FIELDS: [&str; 6] = [
    "known_networks",
    "known_hosts",
    "controlled_hosts",
    "known_services",
    "known_data",
    "known_blocks",
];

/// Action members whose presence is worth flagging.
const FLAGGED_ACTION_FIELDS: [&str; 3] = ["result", "success", "status"];

/// Which episodes of the file to investigate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EpisodeSelection {
    /// Every episode.
    All,
    /// The given 1-based episode numbers; out-of-range numbers are skipped.
    Numbers(Vec<usize>),
    /// First with positive total reward, first with negative total reward
    /// and first without actions.
    #[default]
    Representative,
}

/// 0-based indices of the selected episodes, in selection order.
pub fn select_episodes(records: &[Value], selection: &EpisodeSelection) -> Vec<usize> {
    match selection {
        EpisodeSelection::All => (0..records.len()).collect(),
        EpisodeSelection::Numbers(numbers) => numbers
            .iter()
            .filter_map(|&n| {
                if (1..=records.len()).contains(&n) {
                    Some(n - 1)
                } else {
                    tracing::warn!(episode = n, total = records.len(), "episode number out of range");
                    None
                }
            })
            .collect(),
        EpisodeSelection::Representative => {
            let first = |pred: &dyn Fn(&Value) -> bool| records.iter().position(pred);
            [
                first(&|r| !rewards(r).is_empty() && rewards(r).iter().sum::<f64>() > 0.0),
                first(&|r| !rewards(r).is_empty() && rewards(r).iter().sum::<f64>() < 0.0),
                first(&|r| array_len(trajectory_field(r, "actions")) == 0),
            ]
            .into_iter()
            .flatten()
            .collect()
        }
    }
}

fn trajectory_field<'a>(record: &'a Value, field: &str) -> Option<&'a Value> {
    record.get("trajectory").and_then(|t| t.get(field))
}

fn rewards(record: &Value) -> Vec<f64> {
    trajectory_field(record, "rewards")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_f64).collect())
        .unwrap_or_default()
}

fn array_len(value: Option<&Value>) -> usize {
    match value {
        Some(Value::Array(items)) => items.len(),
        Some(Value::Object(map)) => map.len(),
        _ => 0,
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn keys_of(value: &Value) -> String {
    let keys: Vec<&str> = value
        .as_object()
        .map(|m| m.keys().map(String::as_str).collect())
        .unwrap_or_default();
    format!("[{}]", keys.join(", "))
}

fn field_line(out: &mut String, key: &str, value: &Value) {
    let _ = match value {
        Value::Array(items) => writeln!(out, "  {key}: [{} items]", items.len()),
        Value::Object(_) => writeln!(out, "  {key}: {{...}} with keys: {}", keys_of(value)),
        other => writeln!(out, "  {key}: {}", plain(other)),
    };
}

fn state_summary(out: &mut String, title: &str, state: &Value) {
    let _ = writeln!(out, "\n{title}:");
    let _ = writeln!(out, "  Known networks: {}", array_len(state.get("known_networks")));
    let _ = writeln!(out, "  Known hosts: {}", array_len(state.get("known_hosts")));
    let _ = writeln!(out, "  Controlled hosts: {}", array_len(state.get("controlled_hosts")));
    let _ = writeln!(out, "  State keys: {}", keys_of(state));
}

/// Render the deep dive of one episode record.
pub fn render_episode(record: &Value, number: usize) -> String {
    let mut out = String::new();
    format::banner(&mut out, &format!("EPISODE {number}"));

    let _ = writeln!(out, "Top-level fields:");
    if let Some(object) = record.as_object() {
        let mut keys: Vec<&String> = object.keys().collect();
        keys.sort();
        for key in keys {
            field_line(&mut out, key, &object[key]);
        }
    }

    let _ = writeln!(out, "\nTrajectory fields:");
    if let Some(trajectory) = record.get("trajectory").and_then(Value::as_object) {
        let mut keys: Vec<&String> = trajectory.keys().collect();
        keys.sort();
        for key in keys {
            field_line(&mut out, key, &trajectory[key]);
        }
    }

    let states = trajectory_field(record, "states")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let actions = trajectory_field(record, "actions")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let rewards = rewards(record);

    let _ = writeln!(
        out,
        "\nEpisode length: {} states, {} actions",
        states.len(),
        actions.len()
    );

    if !rewards.is_empty() {
        let total: f64 = rewards.iter().sum();
        let min = rewards.iter().copied().fold(f64::INFINITY, f64::min);
        let max = rewards.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let _ = writeln!(out, "Total reward: {total}");
        let _ = writeln!(
            out,
            "Reward distribution: min={min}, max={max}, avg={:.2}",
            total / rewards.len() as f64
        );
    }

    if let (Some(first), Some(last)) = (states.first(), states.last()) {
        state_summary(&mut out, "First state", first);
        state_summary(&mut out, "Last state", last);
        if let Some(object) = last.as_object() {
            for (key, value) in object {
                if !STANDARD_STATE_FIELDS.contains(&key.as_str()) {
                    let _ = writeln!(out, "  SPECIAL FIELD: {key} = {value}");
                }
            }
        }
    }

    if !actions.is_empty() {
        let start = actions.len().saturating_sub(3);
        let _ = writeln!(out, "\nLast 3 actions:");
        for (offset, action) in actions[start..].iter().enumerate() {
            let _ = writeln!(
                out,
                "  Action {}: {}",
                start + offset + 1,
                format::opt_label(epstat_core::action_type(action))
            );
            if FLAGGED_ACTION_FIELDS.iter().any(|f| action.get(f).is_some()) {
                let extra: Vec<&str> = action
                    .as_object()
                    .map(|m| {
                        m.keys()
                            .map(String::as_str)
                            .filter(|k| *k != "action_type" && *k != "parameters")
                            .collect()
                    })
                    .unwrap_or_default();
                let _ = writeln!(out, "    Special fields: {}", extra.join(", "));
            }
        }
    }

    if !rewards.is_empty() {
        let tail: Vec<String> = rewards[rewards.len().saturating_sub(5)..]
            .iter()
            .map(f64::to_string)
            .collect();
        let _ = writeln!(out, "\nLast 5 rewards: [{}]", tail.join(", "));
    }

    if let Some(last) = states.last() {
        let _ = writeln!(out, "\nFull last state:");
        let _ = writeln!(out, "{}", serde_json::to_string_pretty(last).unwrap_or_default());
    }
    if let Some(last) = actions.last() {
        let _ = writeln!(out, "\nFull last action:");
        let _ = writeln!(out, "{}", serde_json::to_string_pretty(last).unwrap_or_default());
    }

    out
}

/// Investigate the selected episodes of `path`.
///
/// Lines that fail to parse are warned about and do not count as episodes.
pub fn investigate(path: &Path, selection: &EpisodeSelection) -> Result<String, EpstatError> {
    let records: Vec<Value> = scan_file(path, None)?
        .records
        .into_iter()
        .map(|r| r.value)
        .collect();

    let mut out = String::new();
    let _ = writeln!(out, "Total episodes in file: {}", records.len());
    for idx in select_episodes(&records, selection) {
        out.push_str(&render_episode(&records[idx], idx + 1));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records() -> Vec<Value> {
        vec![
            json!({"trajectory": {"actions": [{"action_type": "A"}], "rewards": [-1]}}),
            json!({"trajectory": {"actions": [], "rewards": []}}),
            json!({"trajectory": {"actions": [{"action_type": "A"}], "rewards": [99]}}),
            json!({"trajectory": {"actions": [{"action_type": "A"}], "rewards": [50]}}),
        ]
    }

    #[test]
    fn representative_selection() {
        assert_eq!(select_episodes(&records(), &EpisodeSelection::Representative), vec![2, 0, 1]);
    }

    #[test]
    fn numbered_selection_skips_out_of_range() {
        let sel = EpisodeSelection::Numbers(vec![4, 0, 9, 1]);
        assert_eq!(select_episodes(&records(), &sel), vec![3, 0]);
        assert_eq!(select_episodes(&records(), &EpisodeSelection::All), vec![0, 1, 2, 3]);
    }

    #[test]
    fn representative_selection_can_be_partial() {
        let only_wins = vec![json!({"trajectory": {"actions": [{}], "rewards": [10]}})];
        assert_eq!(select_episodes(&only_wins, &EpisodeSelection::Representative), vec![0]);
    }

    #[test]
    fn episode_rendering() {
        let record = json!({
            "agent_name": "q",
            "end_reason": "AgentStatus.Fail",
            "trajectory": {
                "states": [
                    {"known_hosts": [1, 2], "controlled_hosts": [1]},
                    {"known_hosts": [1, 2, 3], "controlled_hosts": [1], "goal_reached": false}
                ],
                "actions": [
                    {"action_type": "ScanNetwork"},
                    {"action_type": "FindServices", "status": "ok"}
                ],
                "rewards": [-1, -10]
            }
        });
        let text = render_episode(&record, 7);
        assert!(text.contains("EPISODE 7"));
        assert!(text.contains("  agent_name: q"));
        assert!(text.contains("  trajectory: {...} with keys: [actions, rewards, states]"));
        assert!(text.contains("  actions: [2 items]"));
        assert!(text.contains("Episode length: 2 states, 2 actions"));
        assert!(text.contains("Reward distribution: min=-10, max=-1, avg=-5.50"));
        assert!(text.contains("  SPECIAL FIELD: goal_reached = false"));
        assert!(text.contains("  Action 1: ScanNetwork"));
        assert!(text.contains("  Action 2: FindServices\n    Special fields: status"));
        assert!(text.contains("Last 5 rewards: [-1, -10]"));
        assert!(text.contains("Full last action:"));
    }

    #[test]
    fn file_investigation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("i.jsonl");
        let body: Vec<String> = records().iter().map(Value::to_string).collect();
        std::fs::write(&path, body.join("\n")).unwrap();
        let text = investigate(&path, &EpisodeSelection::Numbers(vec![2])).unwrap();
        assert!(text.starts_with("Total episodes in file: 4\n"));
        assert!(text.contains("EPISODE 2"));
        assert!(!text.contains("EPISODE 1\n"));
    }
}
