//! `route_protocol` feature: BGP peers and OSPF adjacencies.

use netval_common::{
    FeatureFormatter, FormatError, FormatInput, FormatResult, Mode, Record, RecordExt, StateKey,
    StateMap, StateMapExt, StateValue,
};

use super::{nested_rows, put_non_empty, role};

/// NX-OS `show ip bgp summary vrf all | json`.
const NX_BGP_PATH: [(&str, &str); 4] = [
    ("TABLE_vrf", "ROW_vrf"),
    ("TABLE_af", "ROW_af"),
    ("TABLE_saf", "ROW_saf"),
    ("TABLE_neighbor", "ROW_neighbor"),
];
/// NX-OS `show ip ospf neighbors detail vrf all | json`.
const NX_OSPF_NBR_PATH: [(&str, &str); 2] = [("TABLE_ctx", "ROW_ctx"), ("TABLE_nbr", "ROW_nbr")];
/// NX-OS `show ip ospf interface brief vrf all | json`.
const NX_OSPF_INTF_PATH: [(&str, &str); 2] = [("TABLE_ctx", "ROW_ctx"), ("TABLE_intf", "ROW_intf")];

const BGP_ESTABLISHED: &str = "Established";

/// Formatter for the `route_protocol` feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct RouteProtocolFormatter;

impl FeatureFormatter for RouteProtocolFormatter {
    fn feature(&self) -> &'static str {
        "route_protocol"
    }

    fn sub_features(&self) -> &'static [&'static str] {
        &["bgp_peer", "ospf_nbr", "ospf_intf"]
    }

    fn format(&self, sub_feature: &str, input: &FormatInput<'_>) -> FormatResult<StateValue> {
        match sub_feature {
            "bgp_peer" => bgp_peer(input),
            "ospf_nbr" => ospf_nbr(input),
            "ospf_intf" => ospf_intf(input),
            _ => Err(FormatError::UnsupportedSubFeature),
        }
    }
}

fn rows<'a>(input: &FormatInput<'a>, path: &[(&str, &str)]) -> FormatResult<Vec<&'a Record>> {
    Ok(nested_rows(input.output.records()?.iter().collect(), path))
}

/// Received prefixes of an established session, otherwise the session
/// state. Dialects with a combined state/prefix column report it as is.
fn received_prefixes(input: &FormatInput<'_>, record: &Record) -> FormatResult<StateValue> {
    let keys = input.keys;
    if keys.bgp_state.is_empty() {
        return Ok(StateValue::coerce(&record.field(role(keys.bgp_pfx_rcv)?)?));
    }
    let state = record.field(keys.bgp_state)?;
    if state.trim().eq_ignore_ascii_case(BGP_ESTABLISHED) {
        Ok(StateValue::coerce(&record.field(role(keys.bgp_pfx_rcv)?)?))
    } else {
        Ok(StateValue::from(state.trim()))
    }
}

fn bgp_peer(input: &FormatInput<'_>) -> FormatResult<StateValue> {
    let keys = input.keys;
    let (peer, asn) = (role(keys.bgp_peer)?, role(keys.bgp_peer_as)?);
    let mut root = StateMap::new();
    for record in rows(input, &NX_BGP_PATH)? {
        let entry = root.child_map(record.field(peer)?);
        entry.put("asn", StateValue::coerce(&record.field(asn)?));
        if input.mode == Mode::Actual {
            entry.put("rcv_pfx", received_prefixes(input, record)?);
        }
    }
    Ok(root.into())
}

/// Adjacency state without the DR/BDR role suffix (`FULL/DR` -> `FULL`).
fn adjacency_state(raw: &str) -> &str {
    raw.split('/').next().unwrap_or(raw).trim()
}

fn ospf_nbr(input: &FormatInput<'_>) -> FormatResult<StateValue> {
    let keys = input.keys;
    let (id, intf) = (role(keys.ospf_nbr_id)?, role(keys.ospf_nbr_intf)?);
    let mut root = StateMap::new();
    for record in rows(input, &NX_OSPF_NBR_PATH)? {
        let entry = root.child_map(StateKey::from(record.field(id)?));
        entry.put("intf", record.field(intf)?);
        if input.mode == Mode::Actual {
            let state = record.field_or(keys.ospf_nbr_state, "");
            put_non_empty(entry, "state", adjacency_state(&state));
        }
    }
    Ok(root.into())
}

fn ospf_intf(input: &FormatInput<'_>) -> FormatResult<StateValue> {
    let keys = input.keys;
    let intf = role(keys.ospf_intf)?;
    let mut root = StateMap::new();
    for record in rows(input, &NX_OSPF_INTF_PATH)? {
        let entry = root.child_map(record.field(intf)?);
        put_non_empty(entry, "area", &record.field_or(keys.ospf_area, ""));
        put_non_empty(entry, "cost", &record.field_or(keys.ospf_cost, ""));
        if input.mode == Mode::Actual {
            // IOS reports full/configured neighbours as "F/C"
            let count = record.field_or(keys.ospf_nbr_count, "");
            put_non_empty(entry, "nbr_count", count.split('/').next().unwrap_or(""));
        }
    }
    Ok(root.into())
}
