//! netval-state - actual-state normalization for network devices
//!
//! Turns collected command output (`feature -> sub-feature -> output`)
//! into the canonical, dialect-independent state tree consumed by the
//! comparison stage, in either actual-state or validation-authoring mode.

pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod formatters;
pub mod registry;

pub use config::{EngineConfig, ErrorPolicy, LoggingConfig, NormalizeConfig};
pub use document::{DeviceDocument, DialectSpec};
pub use engine::{FeatureOutputs, NormalizeReport, Normalizer};
pub use error::{ConfigError, DocumentError};
pub use registry::FormatterRegistry;
