//! `evpn` feature: NX-OS VXLAN EVPN overlay state.
//!
//! Only NX-OS exposes these tables, all through `| json` output:
//!
//! | sub-feature | command |
//! |-------------|---------|
//! | `nve_vni` | `show nve vni` |
//! | `nve_peer` | `show nve peers` |
//! | `mac_ip` | `show l2route mac-ip all` |

use once_cell::sync::Lazy;
use regex::Regex;

use netval_common::{
    Dialect, FeatureFormatter, FormatError, FormatInput, FormatResult, Mode, Record, RecordExt,
    StateKey, StateMap, StateMapExt, StateValue,
};

use super::{nested_rows, put_non_empty, require_dialect, string_list};

mod nve_fields {
    pub const VNI_TABLE: (&str, &str) = ("TABLE_nve_vni", "ROW_nve_vni");
    pub const VNI: &str = "vni";
    pub const VNI_TYPE: &str = "type";
    pub const VNI_STATE: &str = "vni-state";

    pub const PEER_TABLE: (&str, &str) = ("TABLE_nve_peers", "ROW_nve_peers");
    pub const PEER_IP: &str = "peer-ip";
    pub const PEER_STATE: &str = "peer-state";
    pub const LEARN_TYPE: &str = "learn-type";

    pub const MAC_IP_TABLE: (&str, &str) = ("TABLE_l2route_mac_ip_all", "ROW_l2route_mac_ip_all");
    pub const TOPO: &str = "topo-id";
    pub const MAC: &str = "mac-addr";
    pub const HOST_IP: &str = "host-ip";
    pub const NEXT_HOP: &str = "next-hop1";
}

/// `L2 [100]` or `L3 [tenant-a]`.
static VNI_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\S+)\s*\[\s*([^\]]*?)\s*\]").expect("valid VNI type regex")
});

/// Formatter for the `evpn` feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct EvpnFormatter;

impl FeatureFormatter for EvpnFormatter {
    fn feature(&self) -> &'static str {
        "evpn"
    }

    fn sub_features(&self) -> &'static [&'static str] {
        &["nve_vni", "nve_peer", "mac_ip"]
    }

    fn format(&self, sub_feature: &str, input: &FormatInput<'_>) -> FormatResult<StateValue> {
        if !self.supports(sub_feature) {
            return Err(FormatError::UnsupportedSubFeature);
        }
        require_dialect(input.dialect, &[Dialect::Nxos])?;
        match sub_feature {
            "nve_vni" => nve_vni(input),
            "nve_peer" => nve_peer(input),
            _ => mac_ip(input),
        }
    }
}

fn rows<'a>(input: &FormatInput<'a>, table: (&str, &str)) -> FormatResult<Vec<&'a Record>> {
    Ok(nested_rows(input.output.records()?.iter().collect(), &[table]))
}

/// Splits the VNI type column into the layer and its bridge domain or VRF.
fn split_vni_type(raw: &str) -> (String, String) {
    match VNI_TYPE.captures(raw) {
        Some(caps) => (caps[1].to_string(), caps[2].to_string()),
        None => (raw.trim().to_string(), String::new()),
    }
}

fn nve_vni(input: &FormatInput<'_>) -> FormatResult<StateValue> {
    use nve_fields::*;
    let mut root = StateMap::new();
    for record in rows(input, VNI_TABLE)? {
        let (layer, bd_vrf) = split_vni_type(&record.field(VNI_TYPE)?);
        let entry = root.child_map(StateKey::coerce(&record.field(VNI)?));
        put_non_empty(entry, "type", &layer);
        put_non_empty(entry, "bd_vrf", &bd_vrf);
        if input.mode == Mode::Actual {
            put_non_empty(entry, "state", &record.field_or(VNI_STATE, ""));
        }
    }
    Ok(root.into())
}

fn nve_peer(input: &FormatInput<'_>) -> FormatResult<StateValue> {
    use nve_fields::*;
    let peers = rows(input, PEER_TABLE)?;
    match input.mode {
        Mode::Validation => {
            let ips = peers
                .iter()
                .map(|r| r.field(PEER_IP))
                .collect::<FormatResult<Vec<_>>>()?;
            Ok(string_list(ips))
        }
        Mode::Actual => {
            let mut root = StateMap::new();
            for record in peers {
                let entry = root.child_map(record.field(PEER_IP)?);
                put_non_empty(entry, "state", &record.field_or(PEER_STATE, ""));
                put_non_empty(entry, "learn_type", &record.field_or(LEARN_TYPE, ""));
            }
            Ok(root.into())
        }
    }
}

fn mac_ip(input: &FormatInput<'_>) -> FormatResult<StateValue> {
    use nve_fields::*;
    let mut root = StateMap::new();
    for record in rows(input, MAC_IP_TABLE)? {
        let topo = StateKey::coerce(&record.field(TOPO)?);
        let host_ip = record.field(HOST_IP)?;
        match input.mode {
            Mode::Validation => root.child_list(topo).push(host_ip.into()),
            Mode::Actual => {
                let entry = root.child_map(topo).child_map(host_ip);
                put_non_empty(entry, "mac", &record.field_or(MAC, ""));
                put_non_empty(entry, "next_hop", &record.field_or(NEXT_HOP, ""));
            }
        }
    }
    Ok(root.into())
}
