//! `route_table` feature: routes and route counts per VRF.
//!
//! Routes come from three shapes:
//!
//! | shape | source |
//! |-------|--------|
//! | flat records | TextFSM-style `show ip route` / ASA `show route` |
//! | NX rows | `show ip route vrf all \| json` (`TABLE_vrf` .. `TABLE_path`) |
//! | raw text | IOS `show ip route`, after the prefix-repair pass |
//!
//! All three reduce to [`RouteEntry`] values which are merged into
//! `vrf -> prefix -> {nh, rtype}`. A repeated `(vrf, prefix)` turns a
//! scalar next hop into a sequence on the first differing hop and appends
//! every later hop unconditionally.

use once_cell::sync::Lazy;
use regex::Regex;

use netval_common::{
    Dialect, FeatureFormatter, FormatError, FormatInput, FormatResult, Record, RecordExt, StateKey,
    StateMap, StateMapExt, StateValue,
};
use netval_types::IpPrefix;

use super::{require_dialect, role};

/// Canonical name of the default routing table.
pub const GLOBAL_VRF: &str = "global";

/// NX-OS `show ip route vrf all | json` nesting and fields.
mod nx_route {
    pub const VRF_TABLE: (&str, &str) = ("TABLE_vrf", "ROW_vrf");
    pub const ADDRF_TABLE: (&str, &str) = ("TABLE_addrf", "ROW_addrf");
    pub const PREFIX_TABLE: (&str, &str) = ("TABLE_prefix", "ROW_prefix");
    pub const PATH_TABLE: (&str, &str) = ("TABLE_path", "ROW_path");
    pub const VRF_NAME: &str = "vrf-name-out";
    pub const PREFIX: &str = "ipprefix";
    pub const NEXT_HOP: &str = "ipnexthop";
    pub const INTERFACE: &str = "ifname";
    pub const CLIENT: &str = "clientname";
}

/// `172.16.0.0/24 is subnetted, 2 subnets`
static SUBNETTED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\S+/(\d+)\s+is subnetted,\s*(\d+)\s+subnets?")
        .expect("valid subnetted header regex")
});

/// First IPv4-looking token of a line, with its optional length.
static FIRST_IPV4: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\s)(\d{1,3}(?:\.\d{1,3}){3})(/\d+)?").expect("valid IPv4 token regex")
});

static VRF_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*Routing Table:\s*(\S+)").expect("valid VRF header regex"));

static ROUTE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?P<code>[A-Za-z][A-Za-z0-9*+%]*(?:\s+[A-Za-z][A-Za-z0-9]*)?)\s+(?P<prefix>\d{1,3}(?:\.\d{1,3}){3}/\d{1,2})\s*(?P<rest>.*)$",
    )
    .expect("valid route line regex")
});

/// `                [110/2] via 10.1.1.3, 00:01:02, Gi0/2`
static CONTINUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\[\d+/\d+\]\s+via\s").expect("valid continuation regex"));

static LOCAL_ROUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(c|l|local|direct|connected|attached)\b").expect("valid local route regex")
});

/// Formatter for the `route_table` feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct RouteTableFormatter;

impl FeatureFormatter for RouteTableFormatter {
    fn feature(&self) -> &'static str {
        "route_table"
    }

    fn sub_features(&self) -> &'static [&'static str] {
        &["route", "route_count"]
    }

    fn format(&self, sub_feature: &str, input: &FormatInput<'_>) -> FormatResult<StateValue> {
        match sub_feature {
            "route" => Ok(build_routes(parse_routes(input)?).into()),
            "route_count" => route_count(input),
            _ => Err(FormatError::UnsupportedSubFeature),
        }
    }
}

/// One route path, before merging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RouteEntry {
    pub vrf: String,
    pub prefix: String,
    pub rtype: String,
    pub nh_ip: String,
    pub nh_intf: String,
}

impl RouteEntry {
    /// Next hop as compared: the interface for local/connected routes or
    /// when no next-hop address is given.
    fn next_hop(&self) -> &str {
        if LOCAL_ROUTE.is_match(&self.rtype) || self.nh_ip.trim().is_empty() {
            &self.nh_intf
        } else {
            &self.nh_ip
        }
    }
}

fn canonical_vrf(raw: &str) -> String {
    let vrf = raw.trim();
    if vrf.is_empty() || vrf.eq_ignore_ascii_case("default") {
        GLOBAL_VRF.to_string()
    } else {
        vrf.to_string()
    }
}

fn parse_routes(input: &FormatInput<'_>) -> FormatResult<Vec<RouteEntry>> {
    if !input.output.raw_lines.is_empty() {
        require_dialect(input.dialect, &[Dialect::Ios])?;
        return Ok(extract_text_routes(&input.output.raw_lines));
    }
    let mut entries = Vec::new();
    for record in input.output.records()? {
        if record.contains_key(nx_route::VRF_TABLE.0) {
            entries.extend(parse_nx_document(record)?);
        } else {
            entries.push(parse_record(input, record)?);
        }
    }
    Ok(entries)
}

fn parse_record(input: &FormatInput<'_>, record: &Record) -> FormatResult<RouteEntry> {
    let keys = input.keys;
    let network = record.field(role(keys.rt_network)?)?;
    let mask = record.field_or(keys.rt_mask, "");
    let prefix = if mask.trim().is_empty() {
        network
    } else {
        IpPrefix::from_network_mask(&network, &mask)
            .map_err(|_| FormatError::invalid(keys.rt_mask, mask.as_str()))?
            .to_string()
    };
    let rtype = [keys.rt_protocol, keys.rt_type]
        .iter()
        .filter_map(|f| record.non_empty(f))
        .map(|v| v.trim().to_string())
        .collect::<Vec<_>>()
        .join(" ");
    Ok(RouteEntry {
        vrf: canonical_vrf(&record.non_empty(keys.rt_vrf).unwrap_or_default()),
        prefix,
        rtype,
        nh_ip: record.field_or(keys.rt_nh_ip, ""),
        nh_intf: record.field_or(keys.rt_nh_intf, ""),
    })
}

fn parse_nx_document(doc: &Record) -> FormatResult<Vec<RouteEntry>> {
    use nx_route::*;
    let mut entries = Vec::new();
    for vrf_row in doc.rows(VRF_TABLE.0, VRF_TABLE.1) {
        let vrf = canonical_vrf(&vrf_row.field_or(VRF_NAME, ""));
        for prefix_row in super::nested_rows(vec![vrf_row], &[ADDRF_TABLE, PREFIX_TABLE]) {
            let prefix = prefix_row.field(PREFIX)?;
            for path in prefix_row.rows(PATH_TABLE.0, PATH_TABLE.1) {
                entries.push(RouteEntry {
                    vrf: vrf.clone(),
                    prefix: prefix.clone(),
                    rtype: path.field_or(CLIENT, ""),
                    nh_ip: path.field_or(NEXT_HOP, ""),
                    nh_intf: path.field_or(INTERFACE, ""),
                });
            }
        }
    }
    Ok(entries)
}

/// Appends the `/len` of a preceding "is subnetted" header to the route
/// token of the detail lines it announces.
///
/// Continuation rows (first token starting with `[`) and blank lines are
/// passed over without counting toward the announced number of subnets.
pub fn repair_prefixes(lines: &[String]) -> Vec<String> {
    let mut repaired = lines.to_vec();
    for i in 0..repaired.len() {
        let Some(caps) = SUBNETTED.captures(&repaired[i]) else {
            continue;
        };
        let len = caps[1].to_string();
        let mut remaining: usize = caps[2].parse().unwrap_or(0);
        let mut j = i + 1;
        while remaining > 0 && j < repaired.len() {
            let first = repaired[j].split_whitespace().next().unwrap_or("");
            if !first.is_empty() && !first.starts_with('[') {
                repaired[j] = append_prefix_len(&repaired[j], &len);
                remaining -= 1;
            }
            j += 1;
        }
    }
    repaired
}

fn append_prefix_len(line: &str, len: &str) -> String {
    match FIRST_IPV4.captures(line) {
        Some(caps) if caps.get(2).is_none() => {
            let Some(addr) = caps.get(1) else {
                return line.to_string();
            };
            format!("{}/{}{}", &line[..addr.end()], len, &line[addr.end()..])
        }
        _ => line.to_string(),
    }
}

/// Splits the text after a route's prefix into next-hop address and
/// interface.
fn parse_next_hop(rest: &str) -> (String, String) {
    let mut parts = rest.split(',').map(str::trim);
    let head = parts.next().unwrap_or("");
    let nh_ip = head
        .split_once("via ")
        .map(|(_, after)| after.trim().to_string())
        .unwrap_or_default();
    let nh_intf = parts
        .filter(|p| p.starts_with(|c: char| c.is_ascii_alphabetic()))
        .last()
        .unwrap_or("")
        .to_string();
    (nh_ip, nh_intf)
}

/// Extracts route entries from IOS `show ip route` text.
pub(crate) fn extract_text_routes(lines: &[String]) -> Vec<RouteEntry> {
    let mut entries = Vec::new();
    let mut vrf = GLOBAL_VRF.to_string();
    let mut last: Option<(String, String)> = None;
    for line in repair_prefixes(lines) {
        if let Some(caps) = VRF_HEADER.captures(&line) {
            vrf = canonical_vrf(&caps[1]);
            last = None;
        } else if let Some(caps) = ROUTE_LINE.captures(&line) {
            let rtype = caps["code"].split_whitespace().collect::<Vec<_>>().join(" ");
            let prefix = caps["prefix"].to_string();
            let (nh_ip, nh_intf) = parse_next_hop(&caps["rest"]);
            // A wrapped line carries its first hop on the next row.
            if !nh_ip.is_empty() || !nh_intf.is_empty() {
                entries.push(RouteEntry {
                    vrf: vrf.clone(),
                    prefix: prefix.clone(),
                    rtype: rtype.clone(),
                    nh_ip,
                    nh_intf,
                });
            }
            last = Some((prefix, rtype));
        } else if CONTINUATION.is_match(&line) {
            if let Some((prefix, rtype)) = &last {
                let (nh_ip, nh_intf) = parse_next_hop(line.trim());
                entries.push(RouteEntry {
                    vrf: vrf.clone(),
                    prefix: prefix.clone(),
                    rtype: rtype.clone(),
                    nh_ip,
                    nh_intf,
                });
            }
        }
    }
    entries
}

/// Adds a next hop to a route entry: a differing hop promotes a scalar to
/// a two-element sequence, and hops are appended to an existing sequence
/// without deduplication.
fn merge_next_hop(route: &mut StateMap, next_hop: &str) {
    match route.get_mut(&StateKey::from("nh")) {
        None => route.put("nh", next_hop),
        Some(StateValue::List(hops)) => hops.push(next_hop.into()),
        Some(existing) => {
            if existing.as_str() != Some(next_hop) {
                let first = existing.clone();
                *existing = StateValue::List(vec![first, next_hop.into()]);
            }
        }
    }
}

/// Merges route entries into `vrf -> prefix -> {nh, rtype}`.
pub(crate) fn build_routes(entries: Vec<RouteEntry>) -> StateMap {
    let mut root = StateMap::new();
    for entry in entries {
        let next_hop = entry.next_hop().to_string();
        let route = root
            .child_map(entry.vrf.as_str())
            .child_map(entry.prefix.as_str());
        if !route.contains_key(&StateKey::from("rtype")) {
            route.put("rtype", entry.rtype.as_str());
        }
        merge_next_hop(route, &next_hop);
    }
    root
}

fn route_count(input: &FormatInput<'_>) -> FormatResult<StateValue> {
    let routes = build_routes(parse_routes(input)?);
    let mut root = StateMap::new();
    for (vrf, prefixes) in routes {
        let count = prefixes.as_map().map_or(0, |m| m.len());
        root.put(vrf, count);
    }
    Ok(root.into())
}
