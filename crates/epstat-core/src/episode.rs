//! # Episode Records
//!
//! Typed view of one JSONL line: the trajectory (states, actions, rewards)
//! plus agent metadata. Every field is optional in the input and defaults
//! to empty/absent. A trajectory member of the wrong JSON type rejects the
//! record; metadata fields of any type are kept and rendered as labels.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One recorded episode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    /// Ordered states, actions and rewards.
    #[serde(default)]
    pub trajectory: Trajectory,
    /// Why the environment ended the episode, as recorded.
    #[serde(default)]
    pub end_reason: Option<Value>,
    /// Name of the agent that played the episode.
    #[serde(default)]
    pub agent_name: Option<Value>,
    /// Role of the agent (e.g. attacker, defender).
    #[serde(default)]
    pub agent_role: Option<Value>,
}

/// The ordered sequences of one episode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// Environment observations, one per step plus the initial state.
    #[serde(default)]
    pub states: Vec<Value>,
    /// Actions taken by the agent. Each is expected to carry `action_type`.
    #[serde(default)]
    pub actions: Vec<Value>,
    /// Reward received after each action.
    #[serde(default)]
    pub rewards: Vec<f64>,
}

impl Episode {
    /// Decode an episode from a parsed JSONL line.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Number of actions taken.
    pub fn num_actions(&self) -> usize {
        self.trajectory.actions.len()
    }

    /// Number of recorded states.
    pub fn num_states(&self) -> usize {
        self.trajectory.states.len()
    }

    /// Number of recorded rewards.
    pub fn num_rewards(&self) -> usize {
        self.trajectory.rewards.len()
    }

    /// True when at least one action was taken.
    pub fn has_actions(&self) -> bool {
        !self.trajectory.actions.is_empty()
    }

    /// Last reward, if any.
    pub fn final_reward(&self) -> Option<f64> {
        self.trajectory.rewards.last().copied()
    }

    /// Sum of all rewards, 0 when there are none.
    pub fn total_reward(&self) -> f64 {
        self.trajectory.rewards.iter().sum()
    }

    /// `action_type` of the last action.
    ///
    /// `None` when there are no actions or the last action has no string
    /// `action_type`.
    pub fn final_action_type(&self) -> Option<&str> {
        self.trajectory.actions.last().and_then(action_type)
    }

    /// Last recorded state.
    pub fn final_state(&self) -> Option<&Value> {
        self.trajectory.states.last()
    }

    /// `end_reason` rendered for reports; `"none"` when absent or null.
    pub fn end_reason_label(&self) -> String {
        metadata_label(self.end_reason.as_ref()).unwrap_or_else(|| "none".to_string())
    }

    /// `agent_name` rendered for reports; `None` when absent or null.
    pub fn agent_name_label(&self) -> Option<String> {
        metadata_label(self.agent_name.as_ref())
    }

    /// `agent_role` rendered for reports; `None` when absent or null.
    pub fn agent_role_label(&self) -> Option<String> {
        metadata_label(self.agent_role.as_ref())
    }
}

/// Strings verbatim, other values as compact JSON, null as absent.
fn metadata_label(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// `action_type` of an action value, if present as a string.
pub fn action_type(action: &Value) -> Option<&str> {
    action.get("action_type").and_then(Value::as_str)
}

/// Number of elements of the array at `state[field]`, 0 when absent.
pub fn state_list_len(state: &Value, field: &str) -> usize {
    match state.get(field) {
        Some(Value::Array(items)) => items.len(),
        Some(Value::Object(map)) => map.len(),
        _ => 0,
    }
}
