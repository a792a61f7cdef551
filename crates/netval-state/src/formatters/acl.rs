//! Access-control list normalization.
//!
//! Entries are grouped by ACL name, administrative placeholders without a
//! sequence number are dropped and remark entries are eliminated with
//! renumbering (see [`eliminate_remarks`]). Addresses are rendered in CIDR
//! form from host, network/mask or "any" columns.
//!
//! ASA management access (`ssh`/`http` config lines) is synthesized into the
//! same entry shape, numbered 10, 20, ... per qualifier.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use netval_common::{
    Dialect, FormatError, FormatInput, FormatResult, Mode, Record, RecordExt, StateKey, StateMap,
    StateMapExt, StateValue,
};
use netval_types::IpPrefix;

use super::{nested_rows, put_non_empty, role};

/// NX-OS `show ip access-lists | json` tables.
const NX_ACL_TABLE: (&str, &str) = ("TABLE_ip_ipv6_mac", "ROW_ip_ipv6_mac");
const NX_SEQ_TABLE: (&str, &str) = ("TABLE_seqno", "ROW_seqno");

/// ASA `show run ssh` / `show run http` access lines.
static MGMT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(ssh|http)\s+(\d{1,3}(?:\.\d{1,3}){3})\s+(\d{1,3}(?:\.\d{1,3}){3})\s+(\S+)\s*$")
        .expect("valid management access regex")
});

/// One access-control entry. Empty strings mean "not present".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Ace {
    pub seq: String,
    pub action: String,
    pub protocol: String,
    pub src: String,
    pub dst: String,
    pub port: String,
    pub intf: String,
}

impl Ace {
    fn is_remark(&self) -> bool {
        self.action.eq_ignore_ascii_case("remark")
    }
}

/// Entries per ACL name, in device order.
pub(crate) type AclGroups = BTreeMap<String, Vec<Ace>>;

/// Normalizes `system/acl`.
pub(crate) fn format_acl(input: &FormatInput<'_>) -> FormatResult<StateValue> {
    let groups = parse_records(input)?;
    Ok(render(groups, input.mode))
}

/// Normalizes `system/mgmt_acl`.
pub(crate) fn format_mgmt_acl(input: &FormatInput<'_>) -> FormatResult<StateValue> {
    let groups = if input.dialect == Dialect::Asa && !input.output.raw_lines.is_empty() {
        parse_mgmt_lines(&input.output.raw_lines)?
    } else {
        parse_records(input)?
    };
    Ok(render(groups, input.mode))
}

fn parse_records(input: &FormatInput<'_>) -> FormatResult<AclGroups> {
    let keys = input.keys;
    let name_field = role(keys.acl_name)?;
    let seq_field = role(keys.acl_seq)?;
    let action_field = role(keys.acl_action)?;

    let records = input.output.records()?.iter().collect();
    let mut groups = AclGroups::new();
    for acl in nested_rows(records, &[NX_ACL_TABLE]) {
        let name = acl.field(name_field)?;
        let entries = if acl.contains_key(NX_SEQ_TABLE.0) {
            acl.rows(NX_SEQ_TABLE.0, NX_SEQ_TABLE.1)
        } else {
            vec![acl]
        };
        for entry in entries {
            let seq = entry.field_or(seq_field, "");
            if seq.trim().is_empty() {
                continue;
            }
            let action = if entry.non_empty(keys.acl_remark).is_some() {
                "remark".to_string()
            } else {
                entry.field(action_field)?
            };
            let ace = Ace {
                seq: seq.trim().to_string(),
                action,
                protocol: entry.non_empty(keys.acl_protocol).unwrap_or_default(),
                src: address(
                    entry,
                    input.dialect,
                    [keys.acl_src_host, keys.acl_src_any, keys.acl_src_network, keys.acl_src_mask],
                )?,
                dst: address(
                    entry,
                    input.dialect,
                    [keys.acl_dst_host, keys.acl_dst_any, keys.acl_dst_network, keys.acl_dst_mask],
                )?,
                port: entry.non_empty(keys.acl_dst_port).unwrap_or_default(),
                intf: String::new(),
            };
            groups.entry(name.clone()).or_default().push(ace);
        }
    }

    for entries in groups.values_mut() {
        eliminate_remarks(entries);
    }
    Ok(groups)
}

fn parse_mgmt_lines(lines: &[String]) -> FormatResult<AclGroups> {
    let mut groups = AclGroups::new();
    for line in lines {
        let Some(caps) = MGMT_LINE.captures(line) else {
            continue;
        };
        let (network, mask) = (&caps[2], &caps[3]);
        let src = IpPrefix::from_network_mask(network, mask)
            .map_err(|_| FormatError::invalid(&caps[1], format!("{} {}", network, mask)))?;
        let entries = groups.entry(caps[1].to_string()).or_default();
        entries.push(Ace {
            seq: ((entries.len() + 1) * 10).to_string(),
            action: "permit".to_string(),
            src: src.to_string(),
            intf: caps[4].to_string(),
            ..Ace::default()
        });
    }
    Ok(groups)
}

/// Resolves one side of an entry: `[host, any, network, mask]` roles.
fn address(record: &Record, dialect: Dialect, roles: [&str; 4]) -> FormatResult<String> {
    let [host, any, network, mask] = roles;
    if let Some(host) = record.non_empty(host) {
        return Ok(match IpPrefix::host(&host) {
            Ok(prefix) => prefix.to_string(),
            Err(_) => host,
        });
    }
    if let Some(network) = record.non_empty(network) {
        let Some(mask_value) = record.non_empty(mask) else {
            return Ok(network);
        };
        let prefix = if dialect.acl_mask_is_wildcard() {
            IpPrefix::from_network_wildcard(&network, &mask_value)
        } else {
            IpPrefix::from_network_mask(&network, &mask_value)
        };
        return prefix
            .map(|p| p.to_string())
            .map_err(|_| FormatError::invalid(mask, mask_value));
    }
    Ok(record
        .non_empty(any)
        .unwrap_or_else(|| dialect.default_acl_address().to_string()))
}

/// Removes remark entries, renumbering the survivors.
///
/// For each remark at position `r`, every later entry takes the sequence
/// number of the entry before it, walking from the end so each number moves
/// exactly one slot. A remark heading the list is dropped without
/// renumbering as nothing precedes it.
pub(crate) fn eliminate_remarks(entries: &mut Vec<Ace>) {
    while let Some(r) = entries.iter().position(Ace::is_remark) {
        if r > 0 {
            for j in (r + 1..entries.len()).rev() {
                entries[j].seq = entries[j - 1].seq.clone();
            }
        }
        entries.remove(r);
    }
}

fn render(groups: AclGroups, mode: Mode) -> StateValue {
    match mode {
        Mode::Actual => actual(groups),
        Mode::Validation => validation(groups),
    }
}

fn actual(groups: AclGroups) -> StateValue {
    let mut root = StateMap::new();
    for (name, entries) in groups {
        let acl = root.child_map(name);
        for ace in entries {
            let entry = acl.child_map(StateKey::coerce(&ace.seq));
            put_non_empty(entry, "action", &ace.action);
            put_non_empty(entry, "protocol", &ace.protocol);
            put_non_empty(entry, "src", &ace.src);
            put_non_empty(entry, "dst", &ace.dst);
            put_non_empty(entry, "port", &ace.port);
            put_non_empty(entry, "intf", &ace.intf);
        }
    }
    root.into()
}

fn validation(groups: AclGroups) -> StateValue {
    let mut root = StateMap::new();
    for (name, entries) in groups {
        let acl = root.child_list(name);
        for ace in entries {
            let mut entry = StateMap::new();
            entry.put(ace.action.as_str(), ace.src.as_str());
            acl.push(entry.into());
        }
    }
    root.into()
}
