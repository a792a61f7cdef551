//! IP prefixes as devices report them.

use crate::mask;
use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

fn parse_addr(s: &str) -> Result<IpAddr, ParseError> {
    let s = s.trim();
    s.parse()
        .map_err(|_| ParseError::InvalidIpAddress(s.to_string()))
}

const fn max_len(address: &IpAddr) -> u8 {
    match address {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

/// An IP prefix in CIDR notation (e.g., 10.0.0.0/24 or 2001:db8::/32).
///
/// The address is kept exactly as the device reported it; host bits are
/// not masked off, so `10.1.1.1/24` displays as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IpPrefix {
    address: IpAddr,
    prefix_len: u8,
}

impl IpPrefix {
    /// Creates a new IP prefix.
    ///
    /// # Errors
    ///
    /// Fails if the length exceeds 32 for IPv4 or 128 for IPv6.
    pub fn new(address: IpAddr, prefix_len: u8) -> Result<Self, ParseError> {
        if prefix_len > max_len(&address) {
            return Err(ParseError::InvalidIpPrefix(format!(
                "{}/{}",
                address, prefix_len
            )));
        }
        Ok(IpPrefix {
            address,
            prefix_len,
        })
    }

    /// Host route for a single address (/32 or /128).
    pub fn host(address: &str) -> Result<Self, ParseError> {
        let address = parse_addr(address)?;
        Ok(IpPrefix {
            address,
            prefix_len: max_len(&address),
        })
    }

    /// Builds a prefix from a network and a mask column.
    ///
    /// The mask may be a bare length (`24`, `/24`) or a dotted netmask
    /// (`255.255.255.0`). An IPv6 network only accepts a length.
    pub fn from_network_mask(network: &str, mask: &str) -> Result<Self, ParseError> {
        let address = parse_addr(network)?;
        let prefix_len = mask::prefix_len(mask)?;
        IpPrefix::new(address, prefix_len)
    }

    /// Builds a prefix from a network and an ACL wildcard mask
    /// (`0.0.0.255` -> /24).
    pub fn from_network_wildcard(network: &str, wildcard: &str) -> Result<Self, ParseError> {
        let address = parse_addr(network)?;
        let prefix_len = mask::prefix_len_from_wildcard(wildcard)?;
        IpPrefix::new(address, prefix_len)
    }

    pub const fn address(&self) -> &IpAddr {
        &self.address
    }

    pub const fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    pub const fn is_host_route(&self) -> bool {
        self.prefix_len == max_len(&self.address)
    }
}

impl fmt::Display for IpPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

impl FromStr for IpPrefix {
    type Err = ParseError;

    /// Parses `addr/len`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, len) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| ParseError::InvalidIpPrefix(s.to_string()))?;
        let len = len
            .parse()
            .map_err(|_| ParseError::InvalidIpPrefix(s.to_string()))?;
        IpPrefix::new(parse_addr(addr)?, len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_network_mask_variants() {
        let dotted = IpPrefix::from_network_mask("10.1.0.0", "255.255.0.0").unwrap();
        assert_eq!(dotted.to_string(), "10.1.0.0/16");

        let bare = IpPrefix::from_network_mask("10.1.1.0", "24").unwrap();
        assert_eq!(bare.to_string(), "10.1.1.0/24");

        let slashed = IpPrefix::from_network_mask("2001:db8::", "/64").unwrap();
        assert_eq!(slashed.to_string(), "2001:db8::/64");
    }

    #[test]
    fn test_from_network_wildcard() {
        let prefix = IpPrefix::from_network_wildcard("192.168.0.0", "0.0.255.255").unwrap();
        assert_eq!(prefix.to_string(), "192.168.0.0/16");
        assert!(IpPrefix::from_network_wildcard("192.168.0.0", "0.255.0.255").is_err());
    }

    #[test]
    fn test_host_prefix() {
        let host = IpPrefix::host("10.0.0.1").unwrap();
        assert!(host.is_host_route());
        assert_eq!(host.to_string(), "10.0.0.1/32");
        assert_eq!(IpPrefix::host("fe80::1").unwrap().prefix_len(), 128);
        assert_eq!(
            IpPrefix::host("jump-host"),
            Err(ParseError::InvalidIpAddress("jump-host".to_string()))
        );
    }

    #[test]
    fn test_parse_keeps_host_bits() {
        let prefix: IpPrefix = "10.1.1.1/24".parse().unwrap();
        assert_eq!(prefix.to_string(), "10.1.1.1/24");
        assert_eq!(prefix.address().to_string(), "10.1.1.1");
    }

    #[test]
    fn test_invalid_prefix_length() {
        assert!("10.0.0.0/33".parse::<IpPrefix>().is_err());
        assert!("2001:db8::/129".parse::<IpPrefix>().is_err());
        assert!(IpPrefix::from_network_mask("2001:db8::", "255.255.0.0").is_err());
    }
}
