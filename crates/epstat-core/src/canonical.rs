//! # Canonical Keys: Order-Independent, Hashable JSON
//!
//! This module defines `CanonicalKey`, the form every JSON value takes
//! before it is used as a key in a counting map (duplicate-action
//! detection in particular).
//!
//! ## Invariants
//!
//! - Two values that are structurally equal produce equal keys, no matter
//!   in which order their object members appeared in the source text.
//! - Array element order is significant: `[1, 2]` and `[2, 1]` differ.
//! - The encoder is a pure function of its input.
//!
//! ## Encoding Rules
//!
//! 1. `null`, `bool`, `string`: carried as-is.
//! 2. Integers: compared by value regardless of signed/unsigned storage.
//!    Floats without a fractional part that fit the integer range collapse
//!    onto the integer (`1.0 == 1`); all other floats compare by bit pattern.
//! 3. `object`: becomes a list of `(key, canonical(value))` pairs sorted by
//!    key in ascending code-point order.
//! 4. `array`: becomes a list of `canonical(element)` in source order.
//!
//! A parsed `serde_json::Value` is a closed set of variants, so there is
//! no textual fallback for "unknown" types. Values that cannot be turned
//! into JSON at all are rejected by [`CanonicalKey::new`].

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::error::CanonicalizationError;

/// Hashable, totally ordered canonical form of a JSON value.
///
/// The derived `Ord` is a deterministic total order used for stable
/// tie-breaking in reports. It is not numeric order for `Float`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalKey {
    /// JSON `null`.
    Null,
    /// JSON boolean. Never equal to any number.
    Bool(bool),
    /// Any integral number, including integral floats in range.
    Integer(i128),
    /// A non-integral float, stored as its IEEE-754 bit pattern.
    Float(u64),
    /// JSON string.
    String(String),
    /// JSON array, element order preserved.
    Sequence(Vec<CanonicalKey>),
    /// JSON object as `(key, value)` pairs sorted by key.
    Mapping(Vec<(String, CanonicalKey)>),
}

/// Upper bound (exclusive) of floats that collapse onto `Integer`.
const INTEGRAL_FLOAT_LIMIT: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0; // 2^127

impl CanonicalKey {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::UnsupportedType` if the value has no
    /// JSON representation (for example a map keyed by tuples).
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        Ok(Self::from_value(&value))
    }

    /// Canonicalize a parsed JSON value. Infallible.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => number_key(n),
            Value::String(s) => Self::String(s.clone()),
            Value::Array(items) => Self::Sequence(items.iter().map(Self::from_value).collect()),
            Value::Object(map) => {
                let mut entries: Vec<(String, CanonicalKey)> = map
                    .iter()
                    .map(|(k, v)| (k.clone(), Self::from_value(v)))
                    .collect();
                // Object keys are unique, so ordering by key alone is total.
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                Self::Mapping(entries)
            }
        }
    }

    /// Rebuild a JSON value from the canonical form.
    ///
    /// Integral floats come back as integers.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Integer(i) => integer_value(*i),
            Self::Float(bits) => Number::from_f64(f64::from_bits(*bits))
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::String(s) => Value::String(s.clone()),
            Self::Sequence(items) => Value::Array(items.iter().map(Self::to_value).collect()),
            Self::Mapping(entries) => {
                let map: Map<String, Value> = entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect();
                Value::Object(map)
            }
        }
    }

    /// Render as RFC 8785 (JCS) canonical JSON text.
    pub fn to_canonical_string(&self) -> Result<String, CanonicalizationError> {
        serde_jcs::to_string(&self.to_value())
            .map_err(|e| CanonicalizationError::Rendering(e.to_string()))
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

fn number_key(n: &Number) -> CanonicalKey {
    if let Some(i) = n.as_i64() {
        return CanonicalKey::Integer(i128::from(i));
    }
    if let Some(u) = n.as_u64() {
        return CanonicalKey::Integer(i128::from(u));
    }
    match n.as_f64() {
        Some(f) => float_key(f),
        // Only reachable with serde_json's arbitrary_precision feature.
        None => CanonicalKey::String(n.to_string()),
    }
}

fn float_key(f: f64) -> CanonicalKey {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < INTEGRAL_FLOAT_LIMIT {
        // Exact: integral and strictly inside the i128 range. Also folds -0.0.
        CanonicalKey::Integer(f as i128)
    } else {
        CanonicalKey::Float(f.to_bits())
    }
}

fn integer_value(i: i128) -> Value {
    if let Ok(v) = i64::try_from(i) {
        Value::from(v)
    } else if let Ok(v) = u64::try_from(i) {
        Value::from(v)
    } else {
        Number::from_f64(i as f64)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn json_leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| serde_json::json!(n)),
            (-1.0e6f64..1.0e6f64).prop_map(|f| serde_json::json!(f)),
            "[a-zA-Z0-9_ .]{0,20}".prop_map(Value::String),
        ]
    }

    fn json_value() -> impl Strategy<Value = Value> {
        json_leaf().prop_recursive(4, 64, 8, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,8}", inner, 0..8).prop_map(|m| {
                    let map: Map<String, Value> = m.into_iter().collect();
                    Value::Object(map)
                }),
            ]
        })
    }

    /// Serialize an object with its members written in reverse key order.
    fn reversed_object_text(map: &Map<String, Value>) -> String {
        let members: Vec<String> = map
            .iter()
            .rev()
            .map(|(k, v)| format!("{}:{}", Value::String(k.clone()), v))
            .collect();
        format!("{{{}}}", members.join(","))
    }

    proptest! {
        /// Canonicalization is deterministic.
        #[test]
        fn canonical_key_deterministic(value in json_value()) {
            prop_assert_eq!(CanonicalKey::from_value(&value), CanonicalKey::from_value(&value));
        }

        /// Member order in the source text never affects the key.
        #[test]
        fn member_order_independent(
            map in prop::collection::btree_map("[a-z]{1,8}", json_value(), 1..6)
        ) {
            let map: Map<String, Value> = map.into_iter().collect();
            let forward = serde_json::to_string(&Value::Object(map.clone())).unwrap();
            let reversed = reversed_object_text(&map);
            let a: Value = serde_json::from_str(&forward).unwrap();
            let b: Value = serde_json::from_str(&reversed).unwrap();
            prop_assert_eq!(CanonicalKey::from_value(&a), CanonicalKey::from_value(&b));
        }

        /// Reversing a sequence of distinct elements changes the key.
        #[test]
        fn sequence_order_sensitive(
            items in prop::collection::btree_set(any::<i64>(), 2..8)
        ) {
            let forward: Vec<Value> = items.iter().map(|n| serde_json::json!(n)).collect();
            let mut reversed = forward.clone();
            reversed.reverse();
            prop_assert_ne!(
                CanonicalKey::from_value(&Value::Array(forward)),
                CanonicalKey::from_value(&Value::Array(reversed))
            );
        }

        /// Canonical text is valid JSON and re-canonicalizes to the same key.
        #[test]
        fn canonical_string_is_stable(value in json_value()) {
            let k = CanonicalKey::from_value(&value);
            let text = k.to_canonical_string().unwrap();
            let reparsed: Value = serde_json::from_str(&text).unwrap();
            prop_assert_eq!(CanonicalKey::from_value(&reparsed), k);
        }
    }
}
