//! # Repetition Counting
//!
//! Folds the canonical encoder over one episode's action sequence to find
//! actions (including their parameters) executed more than once.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::canonical::CanonicalKey;

/// Occurrence counts of distinct actions within a single episode.
#[derive(Debug, Clone, Default)]
pub struct ActionCounter {
    counts: HashMap<CanonicalKey, usize>,
    total: usize,
}

impl ActionCounter {
    /// Create an empty counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every action in `actions`.
    pub fn from_actions<'a>(actions: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut counter = Self::new();
        for action in actions {
            counter.record(action);
        }
        counter
    }

    /// Record one occurrence of `action`.
    pub fn record(&mut self, action: &Value) {
        *self.counts.entry(CanonicalKey::from_value(action)).or_insert(0) += 1;
        self.total += 1;
    }

    /// Number of distinct actions recorded.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Summarise the counts.
    pub fn stats(&self) -> RepetitionStats {
        let mut num_repeated_actions = 0;
        let mut total_repetitions = 0;
        for &count in self.counts.values() {
            if count > 1 {
                num_repeated_actions += 1;
                total_repetitions += count - 1;
            }
        }
        RepetitionStats {
            total_actions: self.total,
            unique_actions: self.distinct(),
            num_repeated_actions,
            total_repetitions,
            repeat_percentage: percentage(total_repetitions, self.total),
        }
    }

    /// The `n` most repeated actions, most frequent first.
    ///
    /// Only actions seen more than once are returned. Ties are broken by
    /// canonical order so the result is deterministic.
    pub fn most_repeated(&self, n: usize) -> Vec<(&CanonicalKey, usize)> {
        let mut repeated: Vec<(&CanonicalKey, usize)> = self
            .counts
            .iter()
            .filter(|&(_, &count)| count > 1)
            .map(|(key, &count)| (key, count))
            .collect();
        repeated.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        repeated.truncate(n);
        repeated
    }
}

/// Repetition summary for one episode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepetitionStats {
    /// Number of actions in the episode.
    pub total_actions: usize,
    /// Number of distinct actions.
    pub unique_actions: usize,
    /// Distinct actions that occur more than once.
    pub num_repeated_actions: usize,
    /// Sum of extra occurrences over repeated actions.
    pub total_repetitions: usize,
    /// `total_repetitions / total_actions * 100`, 0 for an empty episode.
    pub repeat_percentage: f64,
}

impl RepetitionStats {
    /// Compute stats straight from an action slice.
    pub fn from_actions(actions: &[Value]) -> Self {
        ActionCounter::from_actions(actions).stats()
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reordered_members_count_as_one_action() {
        let actions: Vec<Value> = vec![
            serde_json::from_str(r#"{"a":1,"b":2}"#).unwrap(),
            serde_json::from_str(r#"{"b":2,"a":1}"#).unwrap(),
        ];
        let stats = RepetitionStats::from_actions(&actions);
        assert_eq!(stats.total_actions, 2);
        assert_eq!(stats.unique_actions, 1);
        assert_eq!(stats.num_repeated_actions, 1);
        assert_eq!(stats.total_repetitions, 1);
        assert_eq!(stats.repeat_percentage, 50.0);
    }

    #[test]
    fn no_repeats() {
        let actions = vec![json!({"t": "A"}), json!({"t": "B"}), json!({"t": "C"})];
        let stats = RepetitionStats::from_actions(&actions);
        assert_eq!(stats.unique_actions, 3);
        assert_eq!(stats.num_repeated_actions, 0);
        assert_eq!(stats.total_repetitions, 0);
        assert_eq!(stats.repeat_percentage, 0.0);
    }

    #[test]
    fn extra_occurrences_summed_over_repeated_actions() {
        // A x3, B x2, C x1 -> two repeated actions, 2 + 1 extra occurrences.
        let a = json!({"action_type": "ScanNetwork", "parameters": {"target": "10.0.0.0/24"}});
        let b = json!({"action_type": "FindServices", "parameters": {"target": "10.0.0.5"}});
        let c = json!({"action_type": "ExploitService"});
        let actions = vec![a.clone(), b.clone(), a.clone(), c, b, a];
        let stats = RepetitionStats::from_actions(&actions);
        assert_eq!(stats.total_actions, 6);
        assert_eq!(stats.unique_actions, 3);
        assert_eq!(stats.num_repeated_actions, 2);
        assert_eq!(stats.total_repetitions, 3);
        assert_eq!(stats.repeat_percentage, 50.0);
    }

    #[test]
    fn parameters_distinguish_actions() {
        let actions = vec![
            json!({"action_type": "ScanNetwork", "parameters": {"target": "10.0.0.0/24"}}),
            json!({"action_type": "ScanNetwork", "parameters": {"target": "10.0.1.0/24"}}),
        ];
        let stats = RepetitionStats::from_actions(&actions);
        assert_eq!(stats.unique_actions, 2);
        assert_eq!(stats.total_repetitions, 0);
    }

    #[test]
    fn empty_episode() {
        let stats = RepetitionStats::from_actions(&[]);
        assert_eq!(stats.total_actions, 0);
        assert_eq!(stats.repeat_percentage, 0.0);
    }

    #[test]
    fn most_repeated_orders_by_count() {
        let a = json!("a");
        let b = json!("b");
        let c = json!("c");
        let counter = ActionCounter::from_actions(&[a.clone(), b.clone(), a.clone(), b.clone(), a, c]);
        let top = counter.most_repeated(5);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].0, &CanonicalKey::String("a".into()));
        assert_eq!(top[0].1, 3);
        assert_eq!(top[1].1, 2);
        assert_eq!(counter.most_repeated(1).len(), 1);
    }

    #[test]
    fn reordered_members_and_integral_floats_are_one_action() {
        let reordered: Value = serde_json::from_str(r#"{"y":[1,2],"x":1.0}"#).unwrap();
        let counter = ActionCounter::from_actions(&[
            json!({"x": 1, "y": [1, 2]}),
            reordered,
            json!({"x": 1, "y": [2, 1]}),
        ]);
        assert_eq!(counter.stats().total_actions, 3);
        assert_eq!(counter.distinct(), 2);
        assert_eq!(counter.most_repeated(5)[0].1, 2);
    }
}
