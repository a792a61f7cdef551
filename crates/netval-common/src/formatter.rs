//! The per-feature formatter plug-in trait.
//!
//! Each feature (interface, route_table, ...) is implemented by one
//! [`FeatureFormatter`] that dispatches internally on the sub-feature name.
//! Formatters are registered with the engine's registry rather than looked
//! up by name at call time, so a new feature only needs an implementation
//! and one `register` call.

use serde::{Deserialize, Serialize};

use crate::dialect::{Dialect, KeyTable};
use crate::error::FormatResult;
use crate::output::Classified;
use crate::value::StateValue;

/// Output mode of a normalization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Authoring an expected-state file: live status fields are omitted.
    Validation,
    /// Live actual state with full-fidelity status fields.
    #[default]
    Actual,
}

impl Mode {
    /// Maps the collector's validation flag onto a mode.
    pub fn from_validation_flag(validation: bool) -> Self {
        if validation {
            Mode::Validation
        } else {
            Mode::Actual
        }
    }

    /// Returns true in validation-authoring mode.
    pub fn is_validation(&self) -> bool {
        matches!(self, Mode::Validation)
    }
}

/// Everything a formatter needs for one sub-feature.
#[derive(Debug, Clone, Copy)]
pub struct FormatInput<'a> {
    /// The resolved dialect.
    pub dialect: Dialect,
    /// The dialect's key table.
    pub keys: &'static KeyTable,
    /// Classified command output (never empty).
    pub output: &'a Classified,
    /// Output mode.
    pub mode: Mode,
}

impl<'a> FormatInput<'a> {
    /// Creates an input for `dialect`, looking up its key table.
    pub fn new(dialect: Dialect, output: &'a Classified, mode: Mode) -> Self {
        Self {
            dialect,
            keys: dialect.keys(),
            output,
            mode,
        }
    }
}

/// Normalizes the output of every sub-feature of one feature.
pub trait FeatureFormatter: Send + Sync {
    /// Feature name as used in the feature-to-sub-feature mapping.
    fn feature(&self) -> &'static str;

    /// Sub-feature names this formatter understands.
    fn sub_features(&self) -> &'static [&'static str];

    /// Produces the canonical value for one sub-feature.
    ///
    /// Implementations return [`FormatError::UnsupportedSubFeature`] for a
    /// name outside [`sub_features`](Self::sub_features) and
    /// [`FormatError::UnsupportedDialect`] for a dialect they have no code
    /// path for.
    ///
    /// [`FormatError::UnsupportedSubFeature`]: crate::FormatError::UnsupportedSubFeature
    /// [`FormatError::UnsupportedDialect`]: crate::FormatError::UnsupportedDialect
    fn format(&self, sub_feature: &str, input: &FormatInput<'_>) -> FormatResult<StateValue>;

    /// Returns true if `sub_feature` is handled by this formatter.
    fn supports(&self, sub_feature: &str) -> bool {
        self.sub_features().contains(&sub_feature)
    }
}
