//! Built-in feature formatters.
//!
//! | feature | sub-features | module |
//! |---------|--------------|--------|
//! | `system` | image, module, acl, mgmt_acl | [`system`], [`acl`] |
//! | `interface` | intf, switchport, ip_brief | [`interface`] |
//! | `layer2` | vlan, mac_table | [`layer2`] |
//! | `redundancy` | hsrp, switch | [`redundancy`] |
//! | `intf_bonded` | port_channel, vpc | [`intf_bonded`] |
//! | `route_table` | route, route_count | [`route_table`] |
//! | `route_protocol` | bgp_peer, ospf_nbr, ospf_intf | [`route_protocol`] |
//! | `neighbor` | cdp, lldp | [`neighbor`] |
//! | `evpn` | nve_vni, nve_peer, mac_ip | [`evpn`] |
//! | `vpn` | sts_peer, ac_user | [`vpn`] |
//! | `wifi` | wlan, ap, client_count | [`wifi`] |
//! | `sdwan` | control, bfd | [`sdwan`] |
//! | `sla` | ip_sla, tracker | [`sla`] |
//!
//! Every formatter parses its output into small typed entries first and
//! then renders them through separate `actual` and `validation` paths.

pub mod acl;
pub mod counters;
pub mod evpn;
pub mod interface;
pub mod intf_bonded;
pub mod layer2;
pub mod neighbor;
pub mod redundancy;
pub mod route_protocol;
pub mod route_table;
pub mod sdwan;
pub mod sla;
pub mod system;
pub mod vpn;
pub mod wifi;

use std::sync::Arc;

use netval_common::{
    is_supported, Dialect, FeatureFormatter, FormatError, FormatResult, Record, RecordExt,
    StateMap, StateMapExt, StateValue,
};

/// Returns one instance of every built-in formatter.
pub fn builtin() -> Vec<Arc<dyn FeatureFormatter>> {
    vec![
        Arc::new(system::SystemFormatter),
        Arc::new(interface::InterfaceFormatter),
        Arc::new(layer2::Layer2Formatter),
        Arc::new(redundancy::RedundancyFormatter),
        Arc::new(intf_bonded::IntfBondedFormatter),
        Arc::new(route_table::RouteTableFormatter),
        Arc::new(route_protocol::RouteProtocolFormatter),
        Arc::new(neighbor::NeighborFormatter),
        Arc::new(evpn::EvpnFormatter),
        Arc::new(vpn::VpnFormatter),
        Arc::new(wifi::WifiFormatter),
        Arc::new(sdwan::SdwanFormatter),
        Arc::new(sla::SlaFormatter),
    ]
}

/// Returns the field name for a role, failing if the dialect has none.
pub(crate) fn role(name: &'static str) -> FormatResult<&'static str> {
    if is_supported(name) {
        Ok(name)
    } else {
        Err(FormatError::UnsupportedDialect)
    }
}

/// Fails unless the active dialect is one of `allowed`.
pub(crate) fn require_dialect(dialect: Dialect, allowed: &[Dialect]) -> FormatResult<()> {
    if allowed.contains(&dialect) {
        Ok(())
    } else {
        Err(FormatError::UnsupportedDialect)
    }
}

/// Walks a chain of nested `TABLE_x`/`ROW_x` pairs.
///
/// At each level a record holding the table contributes its rows and a
/// record without it is kept as is, so flat records pass straight through.
pub(crate) fn nested_rows<'a>(
    records: Vec<&'a Record>,
    path: &[(&str, &str)],
) -> Vec<&'a Record> {
    path.iter().fold(records, |level, (table, row)| {
        level
            .into_iter()
            .flat_map(|record| {
                if record.contains_key(*table) {
                    record.rows(table, row)
                } else {
                    vec![record]
                }
            })
            .collect()
    })
}

/// Inserts the coerced field value under `key` if the field is present and
/// non-empty.
pub(crate) fn put_present(map: &mut StateMap, key: &str, record: &Record, field: &str) {
    if let Some(value) = record.non_empty(field) {
        map.put(key, StateValue::coerce(&value));
    }
}

/// Inserts `value` coerced under `key` unless it is empty.
pub(crate) fn put_non_empty(map: &mut StateMap, key: &str, value: &str) {
    if !value.trim().is_empty() {
        map.put(key, StateValue::coerce(value));
    }
}

/// Builds a list value from strings.
pub(crate) fn string_list<I, S>(items: I) -> StateValue
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    StateValue::List(
        items
            .into_iter()
            .map(|s| StateValue::coerce(s.as_ref()))
            .collect(),
    )
}
