//! Error types for normalization.
//!
//! Formatters raise the scope-free [`FormatError`]; the engine lifts it into
//! a [`NormalizeError`] that names the dialect, feature and sub-feature it
//! was processing. Normalization is deterministic, so none of these errors
//! is retryable.

use std::fmt;
use thiserror::Error;

/// Result type alias for engine-level operations.
pub type NormalizeResult<T> = Result<T, NormalizeError>;

/// Result type alias for formatter operations.
pub type FormatResult<T> = Result<T, FormatError>;

/// Where in the device output an error occurred.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope {
    /// Dialect identifier as supplied by the caller (not the resolved enum).
    pub dialect: String,
    /// Feature name (e.g. "route_table").
    pub feature: String,
    /// Sub-feature name (e.g. "route").
    pub sub_feature: String,
}

impl Scope {
    /// Creates a new scope.
    pub fn new(
        dialect: impl Into<String>,
        feature: impl Into<String>,
        sub_feature: impl Into<String>,
    ) -> Self {
        Self {
            dialect: dialect.into(),
            feature: feature.into(),
            sub_feature: sub_feature.into(),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} (dialect '{}')",
            self.feature, self.sub_feature, self.dialect
        )
    }
}

/// Errors raised inside a formatter or the output classifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// A record lacks a field the formatter needs.
    #[error("field '{0}' missing from record")]
    MissingField(String),

    /// A field holds a value the formatter cannot interpret.
    #[error("invalid value '{value}' for field '{field}'")]
    InvalidValue {
        /// The field name.
        field: String,
        /// The offending value.
        value: String,
    },

    /// Output mixes raw text lines and structured records.
    #[error("output mixes {lines} text line(s) with {records} record(s)")]
    MixedOutput {
        /// Number of raw lines seen.
        lines: usize,
        /// Number of records seen.
        records: usize,
    },

    /// Output is not in the shape the formatter consumes.
    #[error("unexpected output shape, expected {0}")]
    UnexpectedShape(&'static str),

    /// The formatter has no code path for the sub-feature.
    #[error("sub-feature not supported by formatter")]
    UnsupportedSubFeature,

    /// The formatter has no code path for the dialect.
    #[error("dialect not supported by formatter")]
    UnsupportedDialect,
}

impl FormatError {
    /// Creates a missing-field error.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    /// Creates an invalid-value error.
    pub fn invalid(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Errors surfaced by the normalization engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// Collector result violates the classifier invariant.
    #[error("Malformed output for {scope} from command '{command}': {detail}")]
    MalformedOutput {
        /// Where the error occurred.
        scope: Scope,
        /// The command whose output was rejected.
        command: String,
        /// What was wrong with it.
        detail: String,
    },

    /// No key table (or formatter code path) for the dialect.
    #[error("Unsupported dialect for {scope}")]
    UnsupportedDialect {
        /// Where the error occurred.
        scope: Scope,
    },

    /// The feature's formatter does not know the sub-feature.
    #[error("Unsupported sub-feature '{}' for {scope}", .scope.sub_feature)]
    UnsupportedSubFeature {
        /// Where the error occurred.
        scope: Scope,
    },

    /// No formatter is registered for the feature.
    #[error("No formatter registered for feature '{}' ({scope})", .scope.feature)]
    UnsupportedFeature {
        /// Where the error occurred.
        scope: Scope,
    },

    /// A record lacks a field the formatter needs.
    #[error("Field '{field}' missing from output for {scope}")]
    MissingField {
        /// Where the error occurred.
        scope: Scope,
        /// The missing field.
        field: String,
    },

    /// A field holds a value the formatter cannot interpret.
    #[error("Invalid value '{value}' for field '{field}' in {scope}")]
    InvalidValue {
        /// Where the error occurred.
        scope: Scope,
        /// The field name.
        field: String,
        /// The offending value.
        value: String,
    },
}

impl NormalizeError {
    /// Lifts a formatter error into the engine taxonomy.
    pub fn from_format(scope: Scope, command: &str, err: FormatError) -> Self {
        match err {
            FormatError::MissingField(field) => Self::MissingField { scope, field },
            FormatError::InvalidValue { field, value } => Self::InvalidValue {
                scope,
                field,
                value,
            },
            FormatError::MixedOutput { .. } | FormatError::UnexpectedShape(_) => {
                Self::MalformedOutput {
                    scope,
                    command: command.to_string(),
                    detail: err.to_string(),
                }
            }
            FormatError::UnsupportedSubFeature => Self::UnsupportedSubFeature { scope },
            FormatError::UnsupportedDialect => Self::UnsupportedDialect { scope },
        }
    }

    /// Returns the scope the error occurred in.
    pub fn scope(&self) -> &Scope {
        match self {
            Self::MalformedOutput { scope, .. }
            | Self::UnsupportedDialect { scope }
            | Self::UnsupportedSubFeature { scope }
            | Self::UnsupportedFeature { scope }
            | Self::MissingField { scope, .. }
            | Self::InvalidValue { scope, .. } => scope,
        }
    }

    /// Returns true if the error points at the operator's dialect or
    /// feature-to-sub-feature mapping rather than at the device data.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedDialect { .. }
                | Self::UnsupportedSubFeature { .. }
                | Self::UnsupportedFeature { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scope() -> Scope {
        Scope::new("cisco_ios", "route_table", "route")
    }

    #[test]
    fn test_error_display_names_scope() {
        let err = NormalizeError::UnsupportedSubFeature { scope: scope() };
        assert_eq!(
            err.to_string(),
            "Unsupported sub-feature 'route' for route_table/route (dialect 'cisco_ios')"
        );
    }

    #[test]
    fn test_from_format_mixed_is_malformed() {
        let err = NormalizeError::from_format(
            scope(),
            "show ip route",
            FormatError::MixedOutput {
                lines: 1,
                records: 2,
            },
        );
        match &err {
            NormalizeError::MalformedOutput { command, detail, .. } => {
                assert_eq!(command, "show ip route");
                assert!(detail.contains("1 text line"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(!err.is_configuration_error());
    }

    #[test]
    fn test_from_format_missing_field() {
        let err = NormalizeError::from_format(scope(), "", FormatError::missing("NETWORK"));
        assert_eq!(
            err,
            NormalizeError::MissingField {
                scope: scope(),
                field: "NETWORK".to_string()
            }
        );
        assert_eq!(err.scope().sub_feature, "route");
    }

    #[test]
    fn test_is_configuration_error() {
        assert!(NormalizeError::UnsupportedDialect { scope: scope() }.is_configuration_error());
        assert!(NormalizeError::UnsupportedFeature { scope: scope() }.is_configuration_error());
        assert!(!NormalizeError::MissingField {
            scope: scope(),
            field: "x".into()
        }
        .is_configuration_error());
    }
}
