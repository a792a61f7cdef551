//! Netmask and wildcard-mask conversion.
//!
//! Devices report IPv4 masks three ways: a prefix length (`24`), a dotted
//! netmask (`255.255.255.0`) and, in ACLs, an inverted wildcard mask
//! (`0.0.0.255`). Only contiguous masks are accepted.

use crate::ParseError;
use std::net::Ipv4Addr;

/// Converts a dotted netmask into a prefix length.
pub fn prefix_len_from_netmask(netmask: &str) -> Result<u8, ParseError> {
    let bits = parse_v4(netmask)?;
    contiguous_len(bits).ok_or_else(|| ParseError::InvalidMask(netmask.to_string()))
}

/// Converts a dotted wildcard mask into a prefix length.
pub fn prefix_len_from_wildcard(wildcard: &str) -> Result<u8, ParseError> {
    let bits = parse_v4(wildcard)?;
    contiguous_len(!bits).ok_or_else(|| ParseError::InvalidMask(wildcard.to_string()))
}

/// Parses any mask column: a bare or slash-prefixed length, or a netmask.
pub fn prefix_len(mask: &str) -> Result<u8, ParseError> {
    let trimmed = mask.trim().trim_start_matches('/');
    if trimmed.contains('.') {
        return prefix_len_from_netmask(trimmed);
    }
    trimmed
        .parse::<u8>()
        .ok()
        .filter(|len| *len <= 128)
        .ok_or_else(|| ParseError::InvalidMask(mask.to_string()))
}

fn parse_v4(s: &str) -> Result<u32, ParseError> {
    s.trim()
        .parse::<Ipv4Addr>()
        .map(u32::from)
        .map_err(|_| ParseError::InvalidMask(s.to_string()))
}

/// Number of leading one bits, provided no one bit follows a zero bit.
fn contiguous_len(bits: u32) -> Option<u8> {
    let ones = bits.leading_ones();
    if ones == 32 || bits << ones == 0 {
        Some(ones as u8)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_netmask() {
        assert_eq!(prefix_len_from_netmask("255.255.255.0").unwrap(), 24);
        assert_eq!(prefix_len_from_netmask("255.255.255.255").unwrap(), 32);
        assert_eq!(prefix_len_from_netmask("0.0.0.0").unwrap(), 0);
        assert!(prefix_len_from_netmask("255.0.255.0").is_err());
    }

    #[test]
    fn test_wildcard() {
        assert_eq!(prefix_len_from_wildcard("0.0.0.255").unwrap(), 24);
        assert_eq!(prefix_len_from_wildcard("0.0.0.0").unwrap(), 32);
        assert_eq!(prefix_len_from_wildcard("255.255.255.255").unwrap(), 0);
    }

    #[test]
    fn test_mask_column() {
        assert_eq!(prefix_len("/16").unwrap(), 16);
        assert_eq!(prefix_len("8").unwrap(), 8);
        assert_eq!(prefix_len("255.255.252.0").unwrap(), 22);
        assert!(prefix_len("abc").is_err());
        assert!(prefix_len("200").is_err());
    }
}
