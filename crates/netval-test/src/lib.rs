//! Test infrastructure for actual-state normalization
//!
//! Provides:
//! - Canned per-dialect command output
//! - A builder for `feature -> sub-feature -> output` collections
//! - The validation/actual mode superset check

pub mod fixtures;
mod verification;

pub use fixtures::*;
pub use netval_common::record;
pub use verification::*;
