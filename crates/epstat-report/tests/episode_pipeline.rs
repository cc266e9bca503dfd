//! # End-to-End Analysis Tests
//!
//! Writes a small JSONL log to disk and runs every analysis over it through
//! the public API, the same path the `epstat` binary takes.
//!
//! The log holds five lines:
//!
//! 1. a 4-step win whose scan action repeats with members in another order
//! 2. a 100-step loss (step limit)
//! 3. a line that is not JSON
//! 4. a 3-step loss that ends early
//! 5. an episode with no actions

use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use epstat_core::{AnalysisConfig, Outcome};
use epstat_report::repeats::{read_repeat_csv, write_repeat_csv};
use epstat_report::{
    analyze_repeats, analyze_schema, count_episodes, early_terminations, load_files, short_losses,
    summarize,
};

fn scan(target: &str, reversed: bool) -> Value {
    if reversed {
        json!({"parameters": {"source_host": "192.168.1.2", "target_network": target}, "action_type": "ScanNetwork"})
    } else {
        json!({"action_type": "ScanNetwork", "parameters": {"target_network": target, "source_host": "192.168.1.2"}})
    }
}

fn episode(actions: Vec<Value>, rewards: Vec<f64>, end_reason: &str) -> String {
    json!({
        "agent_name": "q_agent",
        "agent_role": "Attacker",
        "end_reason": end_reason,
        "trajectory": {
            "states": [{"known_hosts": [], "controlled_hosts": []}, {
                "known_hosts": [{"ip": "192.168.1.2"}, {"ip": "192.168.1.3"}],
                "controlled_hosts": [{"ip": "192.168.1.2"}],
                "known_networks": [{"ip": "192.168.1.0", "mask": 24}],
                "known_data": {}
            }],
            "actions": actions,
            "rewards": rewards
        }
    })
    .to_string()
}

fn write_log(dir: &Path) -> PathBuf {
    let win = episode(
        vec![
            scan("192.168.1.0/24", false),
            scan("192.168.1.0/24", true),
            json!({"action_type": "FindData", "parameters": {"target_host": "192.168.1.3"}}),
            json!({"action_type": "ExfiltrateData", "parameters": {"target_host": "192.168.1.3"}}),
        ],
        vec![-1.0, -1.0, -1.0, 99.0],
        "AgentStatus.Success",
    );
    let long_loss = episode(
        (0..100)
            .map(|i| scan(&format!("10.0.{i}.0/24"), false))
            .collect(),
        vec![-1.0; 100],
        "AgentStatus.TimeoutReached",
    );
    let early_loss = episode(
        vec![
            scan("192.168.1.0/24", false),
            json!({"action_type": "FindServices", "parameters": {"target_host": "10.9.9.9"}}),
            json!({"action_type": "FindServices", "parameters": {"target_host": "10.9.9.9"}}),
        ],
        vec![-1.0, -10.0, -10.0],
        "AgentStatus.Fail",
    );
    let no_action = episode(Vec::new(), Vec::new(), "AgentStatus.Fail");

    let path = dir.join("episodes.jsonl");
    std::fs::write(
        &path,
        [win, long_loss, "{truncated".to_string(), early_loss, no_action].join("\n"),
    )
    .unwrap();
    path
}

#[test]
fn loader_skips_bad_lines_and_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let log = write_log(dir.path());
    let set = load_files(&[log, dir.path().join("absent.jsonl")]);
    assert_eq!(set.episodes().count(), 4);
    assert_eq!(set.error_count(), 1);
    assert_eq!(set.files[0].errors[0].line, 3);
    assert_eq!(set.skipped.len(), 1);
}

#[test]
fn count_classifies_every_episode() {
    let dir = tempfile::tempdir().unwrap();
    let set = load_files(&[write_log(dir.path())]);
    let report = count_episodes(&set, &AnalysisConfig::default());
    assert_eq!(report.total_episodes, 4);
    assert_eq!(report.by_outcome.get("win"), 1);
    assert_eq!(report.by_outcome.get("loss"), 2);
    assert_eq!(report.by_outcome.get("no_action"), 1);
    assert_eq!(report.by_role.get("Attacker"), 4);
    let lines: Vec<_> = report.episode_details.iter().map(|e| e.line_num).collect();
    assert_eq!(lines, vec![1, 2, 4, 5]);
}

#[test]
fn summary_excludes_action_less_episodes() {
    let dir = tempfile::tempdir().unwrap();
    let set = load_files(&[write_log(dir.path())]);
    let report = summarize(&set, &AnalysisConfig::default());
    assert_eq!(report.total_episodes, 3);
    assert_eq!(report.wins, 1);
    assert_eq!(report.losses_step_limit, 1);
    assert_eq!(report.losses_invalid_actions, 1);
}

#[test]
fn repeats_treat_reordered_members_as_one_action() {
    let dir = tempfile::tempdir().unwrap();
    let set = load_files(&[write_log(dir.path())]);
    let report = analyze_repeats(&set, &AnalysisConfig::default());
    assert_eq!(report.summary.total_episodes, 3);

    let win = &report.episode_details[0];
    assert_eq!(win.outcome, Outcome::Win);
    assert_eq!(win.stats.total_actions, 4);
    assert_eq!(win.stats.unique_actions, 3);
    assert_eq!(win.stats.total_repetitions, 1);

    let long_loss = &report.episode_details[1];
    assert_eq!(long_loss.stats.num_repeated_actions, 0);
}

#[test]
fn repeat_csv_round_trip_keeps_episode_outcomes() {
    let dir = tempfile::tempdir().unwrap();
    let set = load_files(&[write_log(dir.path())]);
    let report = analyze_repeats(&set, &AnalysisConfig::default());

    let csv_path = dir.path().join("repeats.csv");
    write_repeat_csv(&csv_path, &report).unwrap();
    let rows = read_repeat_csv(&csv_path).unwrap();

    let pairs: Vec<(usize, Outcome)> = rows.iter().map(|r| (r.episode, r.outcome)).collect();
    assert_eq!(
        pairs,
        vec![(1, Outcome::Win), (2, Outcome::Loss), (3, Outcome::Loss)]
    );
    assert_eq!(rows[0].repeat_percentage, 25.0);
    assert!((rows[2].repeat_percentage - 33.3333).abs() < 1e-9);
}

#[test]
fn win_threshold_is_inclusive_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("edge.jsonl");
    let at = episode(vec![scan("a", false)], vec![50.0], "x");
    let below = episode(vec![scan("a", false)], vec![49.9], "x");
    std::fs::write(&path, format!("{at}\n{below}\n")).unwrap();

    let set = load_files(&[path]);
    let report = summarize(&set, &AnalysisConfig::default());
    assert_eq!(report.wins, 1);
    assert_eq!(report.losses, 1);
}

#[test]
fn termination_reports() {
    let dir = tempfile::tempdir().unwrap();
    let set = load_files(&[write_log(dir.path())]);
    let config = AnalysisConfig::default();

    let early = early_terminations(&set, &config);
    assert_eq!(early.wins, 1);
    assert_eq!(early.normal_losses, 1);
    assert_eq!(early.early.len(), 1);
    assert_eq!(early.early[0].line, 4);

    let short = short_losses(&set, &config, config.short_loss_max_steps);
    assert_eq!(short.len(), 1);
    assert_eq!(short[0].known_hosts, 2);
    assert_eq!(short[0].last_actions.len(), 3);
}

#[test]
fn schema_of_the_log() {
    let dir = tempfile::tempdir().unwrap();
    let report = analyze_schema(&write_log(dir.path()), 100).unwrap();
    assert_eq!(report.total_lines, 5);
    assert_eq!(report.lines_analyzed, 4);
    assert_eq!(report.parse_errors, 1);
    assert!(report.schema["trajectory.rewards"].contains("list[float]"));
    assert!(report.schema["trajectory.rewards"].contains("list[empty]"));
    assert!(report.schema["trajectory.actions.parameters.target_network"].contains("string"));
}
