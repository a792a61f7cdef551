//! Network primitives used while normalizing device command output.
//!
//! - [`IpPrefix`]: IP network prefixes (CIDR notation), buildable from a
//!   network plus either a netmask, a wildcard mask or a bare length
//! - [`mask`]: netmask / wildcard-mask to prefix-length conversion

mod ip;
pub mod mask;

pub use ip::IpPrefix;

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid IP address format: {0}")]
    InvalidIpAddress(String),

    #[error("invalid IP prefix format: {0}")]
    InvalidIpPrefix(String),

    #[error("invalid mask: {0}")]
    InvalidMask(String),
}
