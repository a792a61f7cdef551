//! Error types for configuration and device-document loading.
//!
//! Normalization itself reports [`netval_common::NormalizeError`]; these
//! cover the file-facing surfaces of the crate.

use thiserror::Error;

/// Configuration file errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be parsed or holds invalid settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Device document errors.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The document is not valid YAML/JSON or does not have the expected shape
    #[error("Failed to parse device document {path}: {message}")]
    Parse { path: String, message: String },

    /// No dialect in the document (or on the command line) is recognized
    #[error("Unrecognized dialect '{0}'")]
    UnknownDialect(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type for device document operations
pub type DocumentResult<T> = std::result::Result<T, DocumentError>;
