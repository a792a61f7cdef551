//! `neighbor` feature: CDP and LLDP adjacency tables.

use netval_common::{
    FeatureFormatter, FormatError, FormatInput, FormatResult, RecordExt, StateMap, StateMapExt,
    StateValue,
};

use super::{nested_rows, put_non_empty, role};

/// NX-OS `show cdp neighbors | json`.
const NX_CDP_TABLE: (&str, &str) = ("TABLE_cdp_neighbor_brief_info", "ROW_cdp_neighbor_brief_info");
/// NX-OS `show lldp neighbors | json`.
const NX_LLDP_TABLE: (&str, &str) = ("TABLE_nbor", "ROW_nbor");

/// Formatter for the `neighbor` feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeighborFormatter;

impl FeatureFormatter for NeighborFormatter {
    fn feature(&self) -> &'static str {
        "neighbor"
    }

    fn sub_features(&self) -> &'static [&'static str] {
        &["cdp", "lldp"]
    }

    fn format(&self, sub_feature: &str, input: &FormatInput<'_>) -> FormatResult<StateValue> {
        let keys = input.keys;
        let fields = match sub_feature {
            "cdp" => Fields {
                table: NX_CDP_TABLE,
                local: keys.cdp_local_intf,
                host: keys.cdp_remote_host,
                port: keys.cdp_remote_port,
            },
            "lldp" => Fields {
                table: NX_LLDP_TABLE,
                local: keys.lldp_local_intf,
                host: keys.lldp_remote_host,
                port: keys.lldp_remote_port,
            },
            _ => return Err(FormatError::UnsupportedSubFeature),
        };
        neighbors(input, &fields)
    }
}

struct Fields {
    table: (&'static str, &'static str),
    local: &'static str,
    host: &'static str,
    port: &'static str,
}

/// Device IDs learned over CDP may carry the chassis serial, as in
/// `leaf01(FDO2130A0BC)`.
fn host_name(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed.find('(') {
        Some(idx) if trimmed.ends_with(')') && idx > 0 => &trimmed[..idx],
        _ => trimmed,
    }
}

fn neighbors(input: &FormatInput<'_>, fields: &Fields) -> FormatResult<StateValue> {
    let (local, host) = (role(fields.local)?, role(fields.host)?);
    let records = input.output.records()?.iter().collect();
    let mut root = StateMap::new();
    for record in nested_rows(records, &[fields.table]) {
        let entry = root.child_map(record.field(local)?);
        put_non_empty(entry, "remote_host", host_name(&record.field(host)?));
        put_non_empty(entry, "remote_port", &record.field_or(fields.port, ""));
    }
    Ok(root.into())
}
