//! `interface` feature: port status, switchport mode and L3 addressing.

use netval_common::{
    FeatureFormatter, FormatError, FormatInput, FormatResult, Mode, Record, RecordExt, StateMap,
    StateMapExt, StateValue,
};
use netval_types::IpPrefix;

use super::{nested_rows, put_non_empty, put_present, role, string_list};

/// NX-OS `show interface status | json` and `show interface switchport | json`.
const NX_INTF_TABLE: (&str, &str) = ("TABLE_interface", "ROW_interface");
/// NX-OS `show ip interface brief vrf all | json`.
const NX_IP_TABLE: (&str, &str) = ("TABLE_intf", "ROW_intf");

/// Formatter for the `interface` feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct InterfaceFormatter;

impl FeatureFormatter for InterfaceFormatter {
    fn feature(&self) -> &'static str {
        "interface"
    }

    fn sub_features(&self) -> &'static [&'static str] {
        &["intf", "switchport", "ip_brief"]
    }

    fn format(&self, sub_feature: &str, input: &FormatInput<'_>) -> FormatResult<StateValue> {
        match sub_feature {
            "intf" => intf(input),
            "switchport" => switchport(input),
            "ip_brief" => ip_brief(input),
            _ => Err(FormatError::UnsupportedSubFeature),
        }
    }
}

fn rows<'a>(input: &FormatInput<'a>, table: (&str, &str)) -> FormatResult<Vec<&'a Record>> {
    Ok(nested_rows(input.output.records()?.iter().collect(), &[table]))
}

fn intf(input: &FormatInput<'_>) -> FormatResult<StateValue> {
    let keys = input.keys;
    let name = role(keys.intf_name)?;
    let mut root = StateMap::new();
    for record in rows(input, NX_INTF_TABLE)? {
        let entry = root.child_map(record.field(name)?);
        put_present(entry, "description", record, keys.intf_desc);
        put_present(entry, "vlan", record, keys.intf_vlan);
        put_present(entry, "duplex", record, keys.intf_duplex);
        put_present(entry, "speed", record, keys.intf_speed);
        put_present(entry, "type", record, keys.intf_type);
        if input.mode == Mode::Actual {
            put_present(entry, "status", record, keys.intf_status);
        }
    }
    Ok(root.into())
}

/// Canonical switchport mode.
fn port_mode(raw: &str) -> String {
    let lowered = raw.trim().to_ascii_lowercase();
    if lowered.contains("trunk") {
        "trunk".to_string()
    } else if lowered.contains("access") {
        "access".to_string()
    } else {
        lowered
    }
}

fn switchport(input: &FormatInput<'_>) -> FormatResult<StateValue> {
    let keys = input.keys;
    let name = role(keys.swp_intf)?;
    let mode_field = role(keys.swp_mode)?;
    let mut root = StateMap::new();
    for record in rows(input, NX_INTF_TABLE)? {
        let mode = port_mode(&record.field(mode_field)?);
        let vlan = match mode.as_str() {
            "trunk" => record.field_or(keys.swp_trunk_vlans, ""),
            _ => record.field_or(keys.swp_access_vlan, ""),
        };
        let entry = root.child_map(record.field(name)?);
        entry.put("mode", mode);
        put_non_empty(entry, "vlan", &vlan);
    }
    Ok(root.into())
}

struct IpInterface {
    name: String,
    addresses: Vec<String>,
    status: String,
}

fn parse_ip(input: &FormatInput<'_>) -> FormatResult<Vec<IpInterface>> {
    let keys = input.keys;
    let (name, addr, mask) = (role(keys.ip_intf)?, role(keys.ip_addr)?, role(keys.ip_mask)?);
    let mut parsed = Vec::new();
    for record in rows(input, NX_IP_TABLE)? {
        let addrs = record.list(addr).unwrap_or_default();
        let masks = record.list(mask).unwrap_or_default();
        let mut addresses = Vec::with_capacity(addrs.len());
        for (i, a) in addrs.iter().enumerate() {
            let rendered = match masks.get(i) {
                Some(m) => IpPrefix::from_network_mask(a, m)
                    .map_err(|_| FormatError::invalid(mask, m.as_str()))?
                    .to_string(),
                None => a.clone(),
            };
            addresses.push(rendered);
        }
        let status = [keys.ip_link, keys.ip_proto]
            .iter()
            .filter_map(|f| record.non_empty(f))
            .collect::<Vec<_>>()
            .join("/");
        parsed.push(IpInterface {
            name: record.field(name)?,
            addresses,
            status,
        });
    }
    Ok(parsed)
}

fn ip_brief(input: &FormatInput<'_>) -> FormatResult<StateValue> {
    let mut root = StateMap::new();
    for intf in parse_ip(input)? {
        let Some((primary, secondary)) = intf.addresses.split_first() else {
            continue;
        };
        let entry = root.child_map(intf.name);
        entry.put("ip", primary.as_str());
        if !secondary.is_empty() {
            entry.put("secondary", string_list(secondary));
        }
        if input.mode == Mode::Actual {
            put_non_empty(entry, "status", &intf.status);
        }
    }
    Ok(root.into())
}
