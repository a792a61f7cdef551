//! Verification helpers for normalized state
//!
//! The central check is the mode superset relation: everything a
//! validation-mode tree states must hold in the actual-state tree built
//! from the same output.
//!
//! | validation | actual | holds when |
//! |------------|--------|------------|
//! | mapping | mapping | every key is present and its value holds recursively |
//! | list of scalars | mapping | every element is a key of the mapping |
//! | list of mappings | mapping | both have the same number of entries |
//! | list | list | the lists are equal |
//! | scalar | scalar | the values are equal |

use netval_common::{StateKey, StateValue};
use thiserror::Error;

/// Verification error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VerificationError {
    #[error("Key '{key}' missing from actual state at '{path}'")]
    KeyNotFound { path: String, key: String },

    #[error("Value mismatch at '{path}': validation '{expected}', actual '{actual}'")]
    ValueMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("Expected {expected} entries at '{path}', found {actual}")]
    CountMismatch {
        path: String,
        expected: usize,
        actual: usize,
    },
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerificationError>;

fn describe(value: &StateValue) -> String {
    match value {
        StateValue::Int(n) => n.to_string(),
        StateValue::Str(s) => s.clone(),
        StateValue::List(items) => format!("list of {}", items.len()),
        StateValue::Map(map) => format!("mapping of {}", map.len()),
    }
}

fn child_path(path: &str, key: &StateKey) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn scalar_key(value: &StateValue) -> Option<StateKey> {
    match value {
        StateValue::Int(n) => Some(StateKey::Int(*n)),
        StateValue::Str(s) => Some(StateKey::Str(s.clone())),
        _ => None,
    }
}

fn check_at(path: &str, validation: &StateValue, actual: &StateValue) -> VerifyResult<()> {
    match (validation, actual) {
        (StateValue::Map(expected), StateValue::Map(found)) => {
            for (key, value) in expected {
                let child = found.get(key).ok_or_else(|| VerificationError::KeyNotFound {
                    path: path.to_string(),
                    key: key.to_string(),
                })?;
                check_at(&child_path(path, key), value, child)?;
            }
            Ok(())
        }
        (StateValue::List(expected), StateValue::Map(found)) => {
            if expected.iter().any(|v| matches!(v, StateValue::Map(_))) {
                if expected.len() != found.len() {
                    return Err(VerificationError::CountMismatch {
                        path: path.to_string(),
                        expected: expected.len(),
                        actual: found.len(),
                    });
                }
                return Ok(());
            }
            for element in expected {
                let key = scalar_key(element).ok_or_else(|| VerificationError::ValueMismatch {
                    path: path.to_string(),
                    expected: describe(element),
                    actual: describe(actual),
                })?;
                let coerced = StateKey::coerce(&key.to_string());
                if !found.contains_key(&key) && !found.contains_key(&coerced) {
                    return Err(VerificationError::KeyNotFound {
                        path: path.to_string(),
                        key: key.to_string(),
                    });
                }
            }
            Ok(())
        }
        _ if validation == actual => Ok(()),
        _ => Err(VerificationError::ValueMismatch {
            path: path.to_string(),
            expected: describe(validation),
            actual: describe(actual),
        }),
    }
}

/// Verify that `actual` states at least what `validation` states
pub fn check_mode_superset(validation: &StateValue, actual: &StateValue) -> VerifyResult<()> {
    check_at("", validation, actual)
}

/// Panic with the first violation unless `actual` is a superset of
/// `validation`
#[track_caller]
pub fn assert_mode_superset(validation: &StateValue, actual: &StateValue) {
    if let Err(e) = check_mode_superset(validation, actual) {
        panic!("mode superset violated: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netval_common::state_map;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dropped_live_fields_hold() {
        let validation = StateValue::Map(state_map! {
            "Gi0/1" => state_map! { "ip" => "10.0.0.1/24" }
        });
        let actual = StateValue::Map(state_map! {
            "Gi0/1" => state_map! { "ip" => "10.0.0.1/24", "status" => "up/up" }
        });
        assert_mode_superset(&validation, &actual);
    }

    #[test]
    fn test_missing_key_reported_with_path() {
        let validation = StateValue::Map(state_map! {
            "MGMT" => state_map! { 10 => state_map! { "action" => "permit" } }
        });
        let actual = StateValue::Map(state_map! {
            "MGMT" => state_map! { 20 => state_map! { "action" => "permit" } }
        });
        assert_eq!(
            check_mode_superset(&validation, &actual),
            Err(VerificationError::KeyNotFound {
                path: "MGMT".to_string(),
                key: "10".to_string()
            })
        );
    }

    #[test]
    fn test_value_mismatch() {
        let validation = StateValue::Map(state_map! { "asn" => 65001 });
        let actual = StateValue::Map(state_map! { "asn" => 65002 });
        assert_eq!(
            check_mode_superset(&validation, &actual),
            Err(VerificationError::ValueMismatch {
                path: "asn".to_string(),
                expected: "65001".to_string(),
                actual: "65002".to_string()
            })
        );
    }

    #[test]
    fn test_flat_list_against_mapping() {
        let validation = StateValue::List(vec!["192.0.2.11".into(), "192.0.2.12".into()]);
        let actual = StateValue::Map(state_map! {
            "192.0.2.11" => state_map! { "state" => "Up" },
            "192.0.2.12" => state_map! { "state" => "Down" },
        });
        assert_mode_superset(&validation, &actual);

        let extra = StateValue::List(vec!["192.0.2.13".into()]);
        assert!(matches!(
            check_mode_superset(&extra, &actual),
            Err(VerificationError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn test_list_of_mappings_compares_cardinality() {
        let validation = StateValue::List(vec![
            StateValue::Map(state_map! { "permit" => "10.0.0.0/24" }),
            StateValue::Map(state_map! { "deny" => "any" }),
        ]);
        let actual = StateValue::Map(state_map! {
            10 => state_map! { "action" => "permit" },
        });
        assert_eq!(
            check_mode_superset(&validation, &actual),
            Err(VerificationError::CountMismatch {
                path: String::new(),
                expected: 2,
                actual: 1
            })
        );
    }
}
