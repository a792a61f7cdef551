//! Common infrastructure for actual-state normalization.
//!
//! This crate provides what every feature formatter shares:
//!
//! - [`value`]: the canonical state tree ([`StateValue`], [`StateKey`])
//! - [`error`]: the error taxonomy ([`NormalizeError`], [`FormatError`])
//! - [`dialect`]: OS dialect resolution and per-dialect [`KeyTable`]s
//! - [`output`]: raw command output, the classifier and record accessors
//! - [`formatter`]: the [`FeatureFormatter`] plug-in trait
//!
//! # Architecture
//!
//! Normalization of one sub-feature follows this pattern:
//!
//! 1. Skip empty output (the canonical value is an empty mapping)
//! 2. Classify output into raw lines or records, repairing NX-OS singletons
//! 3. Resolve the dialect's key table
//! 4. Hand both to the feature's formatter in validation or actual mode
//!
//! # Example
//!
//! ```ignore
//! use netval_common::{classify, Dialect, FormatInput, Mode, RawOutput};
//!
//! let output = classify(&RawOutput::Text(text))?;
//! let input = FormatInput::new(Dialect::Ios, &output, Mode::Actual);
//! let value = formatter.format("mac_table", &input)?;
//! ```

pub mod dialect;
pub mod error;
pub mod formatter;
pub mod output;
pub mod value;

// Re-export commonly used items at crate root
pub use dialect::{is_supported, Dialect, KeyTable};
pub use error::{FormatError, FormatResult, NormalizeError, NormalizeResult, Scope};
pub use formatter::{FeatureFormatter, FormatInput, Mode};
pub use output::{classify, repair_singletons, Classified, CommandOutput, RawOutput, Record, RecordExt};
pub use value::{StateKey, StateMap, StateMapExt, StateTree, StateValue};
