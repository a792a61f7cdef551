//! `intf_bonded` feature: port-channels and the NX-OS vPC peering.

use netval_common::{
    Dialect, FeatureFormatter, FormatError, FormatInput, FormatResult, Mode, Record, RecordExt,
    StateKey, StateMap, StateMapExt, StateValue,
};

use super::{nested_rows, put_non_empty, require_dialect, role, string_list};

/// NX-OS `show port-channel summary | json`.
const NX_CHANNEL_TABLE: (&str, &str) = ("TABLE_channel", "ROW_channel");
const NX_MEMBER_TABLE: (&str, &str) = ("TABLE_member", "ROW_member");

/// NX-OS `show vpc | json` fields.
mod vpc_fields {
    pub const DOMAIN: &str = "vpc-domain-id";
    pub const ROLE: &str = "vpc-role";
    pub const PEER_STATUS: &str = "vpc-peer-status";
    pub const KEEPALIVE: &str = "vpc-peer-keepalive-status";
    pub const CONSISTENCY: &str = "vpc-peer-consistency";
    pub const PEERLINK_TABLE: (&str, &str) = ("TABLE_peerlink", "ROW_peerlink");
    pub const PEERLINK_PO: &str = "peerlink-ifindex";
    pub const VPC_TABLE: (&str, &str) = ("TABLE_vpc", "ROW_vpc");
    pub const VPC_ID: &str = "vpc-id";
    pub const VPC_PO: &str = "vpc-ifindex";
    pub const VPC_PORT_STATE: &str = "vpc-port-state";
    pub const VPC_CONSISTENCY: &str = "vpc-consistency-status";
    pub const VPC_VLANS: &str = "up-vlan-bitset";
}

/// Formatter for the `intf_bonded` feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct IntfBondedFormatter;

impl FeatureFormatter for IntfBondedFormatter {
    fn feature(&self) -> &'static str {
        "intf_bonded"
    }

    fn sub_features(&self) -> &'static [&'static str] {
        &["port_channel", "vpc"]
    }

    fn format(&self, sub_feature: &str, input: &FormatInput<'_>) -> FormatResult<StateValue> {
        match sub_feature {
            "port_channel" => port_channel(input),
            "vpc" => vpc(input),
            _ => Err(FormatError::UnsupportedSubFeature),
        }
    }
}

struct Bundle {
    name: String,
    protocol: String,
    status: String,
    members: Vec<(String, String)>,
}

/// Router dialects report a bundled member as `bndl`; the canonical code is
/// the switch convention `P`.
fn member_status(raw: &str) -> String {
    if raw.trim().eq_ignore_ascii_case("bndl") {
        "P".to_string()
    } else {
        raw.trim().to_string()
    }
}

fn parse_bundles(input: &FormatInput<'_>) -> FormatResult<Vec<Bundle>> {
    let keys = input.keys;
    let name = role(keys.po_name)?;
    let (member_field, status_field) = (role(keys.po_members)?, keys.po_member_status);
    let records = input.output.records()?.iter().collect();
    let mut bundles = Vec::new();
    for record in nested_rows(records, &[NX_CHANNEL_TABLE]) {
        let members = if record.contains_key(NX_MEMBER_TABLE.0) {
            record
                .rows(NX_MEMBER_TABLE.0, NX_MEMBER_TABLE.1)
                .into_iter()
                .map(|m| -> FormatResult<(String, String)> {
                    Ok((m.field(member_field)?, m.field_or(status_field, "")))
                })
                .collect::<FormatResult<Vec<_>>>()?
        } else {
            let intfs = record.list(member_field).unwrap_or_default();
            let statuses = record.list(status_field).unwrap_or_default();
            intfs
                .into_iter()
                .enumerate()
                .map(|(i, intf)| (intf, statuses.get(i).cloned().unwrap_or_default()))
                .collect()
        };
        bundles.push(Bundle {
            name: record.field(name)?,
            protocol: record.field_or(keys.po_protocol, ""),
            status: record.field_or(keys.po_status, ""),
            members,
        });
    }
    Ok(bundles)
}

fn port_channel(input: &FormatInput<'_>) -> FormatResult<StateValue> {
    let bundles = parse_bundles(input)?;
    let mut root = StateMap::new();
    for bundle in bundles {
        let entry = root.child_map(bundle.name);
        put_non_empty(entry, "protocol", &bundle.protocol);
        match input.mode {
            Mode::Actual => {
                put_non_empty(entry, "status", &bundle.status);
                let members = entry.child_map("members");
                for (intf, status) in bundle.members {
                    members
                        .child_map(intf)
                        .put("mbr_status", member_status(&status));
                }
            }
            Mode::Validation => {
                let names = bundle.members.into_iter().map(|(intf, _)| intf);
                entry.put("members", string_list(names));
            }
        }
    }
    Ok(root.into())
}

struct Vpc {
    id: StateKey,
    po: String,
    vlans: String,
    port_state: String,
    consistency: String,
}

fn parse_vpcs(record: &Record) -> FormatResult<Vec<Vpc>> {
    use vpc_fields::*;
    record
        .rows(VPC_TABLE.0, VPC_TABLE.1)
        .into_iter()
        .map(|row| -> FormatResult<Vpc> {
            Ok(Vpc {
                id: StateKey::coerce(&row.field(VPC_ID)?),
                po: row.field(VPC_PO)?,
                vlans: row.field_or(VPC_VLANS, ""),
                port_state: row.field_or(VPC_PORT_STATE, ""),
                consistency: row.field_or(VPC_CONSISTENCY, ""),
            })
        })
        .collect()
}

/// Normalizes `show vpc`. The vPC table only appears once secondary
/// peering links exist, so its absence yields no `vpc` key.
fn vpc(input: &FormatInput<'_>) -> FormatResult<StateValue> {
    use vpc_fields::*;
    require_dialect(input.dialect, &[Dialect::Nxos])?;
    let record = input
        .output
        .records()?
        .first()
        .ok_or(FormatError::UnexpectedShape("a vpc record"))?;

    let peer_link = record
        .rows(PEERLINK_TABLE.0, PEERLINK_TABLE.1)
        .first()
        .map(|row| row.field_or(PEERLINK_PO, ""))
        .unwrap_or_default();
    let vpcs = if record.contains_key(VPC_TABLE.0) {
        Some(parse_vpcs(record)?)
    } else {
        None
    };

    let mut root = StateMap::new();
    put_non_empty(&mut root, "domain", &record.field_or(DOMAIN, ""));
    put_non_empty(&mut root, "role", &record.field(ROLE)?);
    put_non_empty(&mut root, "peer_link", &peer_link);
    if input.mode == Mode::Actual {
        put_non_empty(&mut root, "peer_status", &record.field_or(PEER_STATUS, ""));
        put_non_empty(&mut root, "keepalive", &record.field_or(KEEPALIVE, ""));
        put_non_empty(&mut root, "consistency", &record.field_or(CONSISTENCY, ""));
    }
    if let Some(vpcs) = vpcs {
        let table = root.child_map("vpc");
        for v in vpcs {
            let entry = table.child_map(v.id);
            entry.put("po", v.po);
            put_non_empty(entry, "vlans", &v.vlans);
            if input.mode == Mode::Actual {
                put_non_empty(entry, "port_state", &v.port_state);
                put_non_empty(entry, "consistency_status", &v.consistency);
            }
        }
    }
    Ok(root.into())
}
