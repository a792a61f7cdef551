//! Canonical state tree value model.
//!
//! Every formatter produces a [`StateValue`]: a scalar (integer or string),
//! a sequence, or a mapping keyed by [`StateKey`]. Maps are `BTreeMap`s so
//! two runs over the same output serialize byte-for-byte identically.
//!
//! Numeric-looking device strings are coerced to integers with
//! [`StateValue::coerce`] / [`StateKey::coerce`]; everything else passes
//! through untouched.
//!
//! Nested maps are built with the explicit get-or-insert helpers of
//! [`StateMapExt`] rather than implicitly created on access.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Mapping node of the canonical tree.
pub type StateMap = BTreeMap<StateKey, StateValue>;

/// The full canonical tree: `feature -> sub-feature -> value`.
pub type StateTree = BTreeMap<String, BTreeMap<String, StateValue>>;

/// Parses a device string as an integer when the whole (trimmed) string is
/// a decimal number that fits `i64`.
fn parse_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}

/// Key of a mapping node.
///
/// Integers sort before strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateKey {
    Int(i64),
    Str(String),
}

impl StateKey {
    /// Builds a key, coercing a wholly numeric string (VLAN ID, sequence
    /// number, module number) to an integer.
    pub fn coerce(raw: &str) -> Self {
        match parse_int(raw) {
            Some(n) => StateKey::Int(n),
            None => StateKey::Str(raw.to_string()),
        }
    }

    /// Returns the string form if this is a string key.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            StateKey::Str(s) => Some(s),
            StateKey::Int(_) => None,
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateKey::Int(n) => write!(f, "{}", n),
            StateKey::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for StateKey {
    fn from(s: &str) -> Self {
        StateKey::Str(s.to_string())
    }
}

impl From<String> for StateKey {
    fn from(s: String) -> Self {
        StateKey::Str(s)
    }
}

impl From<i64> for StateKey {
    fn from(n: i64) -> Self {
        StateKey::Int(n)
    }
}

impl From<i32> for StateKey {
    fn from(n: i32) -> Self {
        StateKey::Int(i64::from(n))
    }
}

/// A value in the canonical state tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Int(i64),
    Str(String),
    List(Vec<StateValue>),
    Map(StateMap),
}

impl StateValue {
    /// Builds a scalar, coercing a wholly numeric string to an integer.
    pub fn coerce(raw: &str) -> Self {
        match parse_int(raw) {
            Some(n) => StateValue::Int(n),
            None => StateValue::Str(raw.to_string()),
        }
    }

    /// An empty mapping, the value of a sub-feature with no output.
    pub fn empty_map() -> Self {
        StateValue::Map(StateMap::new())
    }

    /// Returns the map if this is a mapping node.
    pub fn as_map(&self) -> Option<&StateMap> {
        match self {
            StateValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the sequence if this is a sequence node.
    pub fn as_list(&self) -> Option<&[StateValue]> {
        match self {
            StateValue::List(l) => Some(l),
            _ => None,
        }
    }

    /// Returns the integer if this is an integer scalar.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            StateValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            StateValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Looks up a child of a mapping node.
    pub fn get(&self, key: impl Into<StateKey>) -> Option<&StateValue> {
        self.as_map().and_then(|m| m.get(&key.into()))
    }

    /// Returns true for an empty mapping.
    pub fn is_empty_map(&self) -> bool {
        matches!(self, StateValue::Map(m) if m.is_empty())
    }
}

impl From<&str> for StateValue {
    fn from(s: &str) -> Self {
        StateValue::Str(s.to_string())
    }
}

impl From<String> for StateValue {
    fn from(s: String) -> Self {
        StateValue::Str(s)
    }
}

impl From<i64> for StateValue {
    fn from(n: i64) -> Self {
        StateValue::Int(n)
    }
}

impl From<i32> for StateValue {
    fn from(n: i32) -> Self {
        StateValue::Int(i64::from(n))
    }
}

impl From<usize> for StateValue {
    fn from(n: usize) -> Self {
        StateValue::Int(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<StateMap> for StateValue {
    fn from(m: StateMap) -> Self {
        StateValue::Map(m)
    }
}

impl From<Vec<StateValue>> for StateValue {
    fn from(l: Vec<StateValue>) -> Self {
        StateValue::List(l)
    }
}

impl From<StateKey> for StateValue {
    fn from(k: StateKey) -> Self {
        match k {
            StateKey::Int(n) => StateValue::Int(n),
            StateKey::Str(s) => StateValue::Str(s),
        }
    }
}

/// Explicit get-or-insert helpers for building nested maps.
pub trait StateMapExt {
    /// Returns the child map under `key`, inserting an empty one if the key
    /// is absent. A non-map value under `key` is replaced.
    fn child_map(&mut self, key: impl Into<StateKey>) -> &mut StateMap;

    /// Returns the child sequence under `key`, inserting an empty one if
    /// the key is absent. A non-sequence value under `key` is replaced.
    fn child_list(&mut self, key: impl Into<StateKey>) -> &mut Vec<StateValue>;

    /// Inserts `value` under `key`, overwriting any previous value.
    fn put(&mut self, key: impl Into<StateKey>, value: impl Into<StateValue>);
}

impl StateMapExt for StateMap {
    fn child_map(&mut self, key: impl Into<StateKey>) -> &mut StateMap {
        let slot = self.entry(key.into()).or_insert_with(StateValue::empty_map);
        if !matches!(slot, StateValue::Map(_)) {
            *slot = StateValue::empty_map();
        }
        match slot {
            StateValue::Map(m) => m,
            _ => unreachable!("slot holds a map"),
        }
    }

    fn child_list(&mut self, key: impl Into<StateKey>) -> &mut Vec<StateValue> {
        let slot = self
            .entry(key.into())
            .or_insert_with(|| StateValue::List(Vec::new()));
        if !matches!(slot, StateValue::List(_)) {
            *slot = StateValue::List(Vec::new());
        }
        match slot {
            StateValue::List(l) => l,
            _ => unreachable!("slot holds a list"),
        }
    }

    fn put(&mut self, key: impl Into<StateKey>, value: impl Into<StateValue>) {
        self.insert(key.into(), value.into());
    }
}

/// Builds a [`StateMap`] from `key => value` pairs.
#[macro_export]
macro_rules! state_map {
    ($($key:expr => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut map = $crate::value::StateMap::new();
        $(
            map.insert(
                $crate::value::StateKey::from($key),
                $crate::value::StateValue::from($value),
            );
        )*
        map
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_coerce_numeric_strings() {
        assert_eq!(StateValue::coerce("150"), StateValue::Int(150));
        assert_eq!(StateValue::coerce(" 7 "), StateValue::Int(7));
        assert_eq!(StateValue::coerce("-3"), StateValue::Int(-3));
        assert_eq!(StateValue::coerce("1/0/1"), StateValue::from("1/0/1"));
        assert_eq!(StateValue::coerce("+5"), StateValue::from("+5"));
        assert_eq!(StateValue::coerce(""), StateValue::from(""));
        assert_eq!(
            StateValue::coerce("99999999999999999999"),
            StateValue::from("99999999999999999999")
        );
    }

    #[test]
    fn test_key_coercion_and_order() {
        let mut map = StateMap::new();
        map.put(StateKey::coerce("total"), 3);
        map.put(StateKey::coerce("20"), 1);
        map.put(StateKey::coerce("10"), 2);
        let keys: Vec<String> = map.keys().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["10", "20", "total"]);
    }

    #[test]
    fn test_child_map_get_or_insert() {
        let mut root = StateMap::new();
        root.child_map("global").put("10.0.0.0/24", "x");
        root.child_map("global").put("10.0.1.0/24", "y");
        assert_eq!(root.len(), 1);
        assert_eq!(root[&StateKey::from("global")].as_map().map(|m| m.len()), Some(2));
    }

    #[test]
    fn test_child_map_replaces_scalar() {
        let mut root = state_map! { "a" => 1 };
        root.child_map("a").put("b", 2);
        assert_eq!(root, state_map! { "a" => state_map! { "b" => 2 } });
    }

    #[test]
    fn test_child_list_appends() {
        let mut root = StateMap::new();
        root.child_list("members").push("Gi1".into());
        root.child_list("members").push("Gi2".into());
        assert_eq!(
            root.get(&StateKey::from("members")),
            Some(&StateValue::List(vec!["Gi1".into(), "Gi2".into()]))
        );
    }

    #[test]
    fn test_serialize_yaml_integer_keys() {
        let value = StateValue::from(state_map! { 10 => "permit", "name" => "MGMT" });
        let yaml = serde_yaml::to_string(&value).unwrap();
        assert_eq!(yaml, "10: permit\nname: MGMT\n");
    }
}
