//! `layer2` feature: VLAN database and MAC address-table counters.

use once_cell::sync::Lazy;
use regex::Regex;

use netval_common::{
    Dialect, FeatureFormatter, FormatError, FormatInput, FormatResult, Mode, RecordExt, StateKey,
    StateMap, StateMapExt, StateValue,
};

use super::counters::CounterScan;
use super::{nested_rows, require_dialect, role, string_list};

/// NX-OS `show vlan brief | json`.
const NX_VLAN_TABLE: (&str, &str) = ("TABLE_vlanbrief", "ROW_vlanbrief");

static MAC_VLAN_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*mac entries for vlan\s+(\d+)").expect("valid MAC label regex")
});

static MAC_TOTAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*total mac addresses\b").expect("valid MAC total regex")
});

/// Formatter for the `layer2` feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct Layer2Formatter;

impl FeatureFormatter for Layer2Formatter {
    fn feature(&self) -> &'static str {
        "layer2"
    }

    fn sub_features(&self) -> &'static [&'static str] {
        &["vlan", "mac_table"]
    }

    fn format(&self, sub_feature: &str, input: &FormatInput<'_>) -> FormatResult<StateValue> {
        match sub_feature {
            "vlan" => vlan(input),
            "mac_table" => mac_table(input),
            _ => Err(FormatError::UnsupportedSubFeature),
        }
    }
}

fn vlan(input: &FormatInput<'_>) -> FormatResult<StateValue> {
    let keys = input.keys;
    let (id, name) = (role(keys.vlan_id)?, role(keys.vlan_name)?);
    let records = input.output.records()?.iter().collect();
    let mut root = StateMap::new();
    for record in nested_rows(records, &[NX_VLAN_TABLE]) {
        let entry = root.child_map(StateKey::coerce(&record.field(id)?));
        entry.put("name", record.field(name)?);
        if input.mode == Mode::Actual {
            let ports = record.list(keys.vlan_intf).unwrap_or_default();
            entry.put("intf", string_list(ports));
        }
    }
    Ok(root.into())
}

/// Parses `show mac address-table count`.
///
/// Each VLAN block's total sits a dialect-specific number of lines below
/// its label. The overall total is whatever total line remains after the
/// VLAN blocks are consumed, or the sum of the VLAN counts.
fn mac_table(input: &FormatInput<'_>) -> FormatResult<StateValue> {
    require_dialect(input.dialect, &[Dialect::Ios, Dialect::Nxos])?;
    let mut scan = CounterScan::new(input.output.lines()?);
    let groups = scan.take_grouped(&MAC_VLAN_LABEL, input.dialect.mac_count_offset())?;
    let total = scan
        .take_total(&MAC_TOTAL)
        .unwrap_or_else(|| groups.iter().map(|(_, n)| n).sum());

    let mut root = StateMap::new();
    for (vlan, count) in groups {
        root.put(StateKey::coerce(&vlan), count);
    }
    root.put("total", total);
    Ok(root.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use netval_common::{classify, record, state_map, RawOutput};
    use pretty_assertions::assert_eq;

    const IOS_MAC_COUNT: &str = "\
Mac Entries for Vlan 10:
---------------------------
Dynamic Address Count  : 7
Static  Address Count  : 0
Total Mac Addresses    : 7

Mac Entries for Vlan 20:
---------------------------
Dynamic Address Count  : 3
Static  Address Count  : 1
Total Mac Addresses    : 4

Total Mac Addresses for this criterion: 11

Total Mac Address Space Available: 7988
";

    #[test]
    fn test_mac_table_ios() {
        let output = classify(&RawOutput::Text(IOS_MAC_COUNT.to_string())).unwrap();
        let value = Layer2Formatter
            .format("mac_table", &FormatInput::new(Dialect::Ios, &output, Mode::Actual))
            .unwrap();
        assert_eq!(
            value,
            StateValue::Map(state_map! { 10 => 7, 20 => 4, "total" => 11 })
        );
    }

    #[test]
    fn test_mac_table_nxos_all_vlans() {
        let text = "\
MAC Entries for all vlans :
Dynamic Address Count:                 12
Static Address (User-defined) Count:   0
Secure Address Count:                  0
Total MAC Addresses in Use:            12
";
        let output = classify(&RawOutput::Text(text.to_string())).unwrap();
        let value = Layer2Formatter
            .format("mac_table", &FormatInput::new(Dialect::Nxos, &output, Mode::Actual))
            .unwrap();
        assert_eq!(value, StateValue::Map(state_map! { "total" => 12 }));
    }

    #[test]
    fn test_mac_table_rejects_records() {
        let output = classify(&RawOutput::Record(record! { "vlan" => 10 })).unwrap();
        let result =
            Layer2Formatter.format("mac_table", &FormatInput::new(Dialect::Ios, &output, Mode::Actual));
        assert!(matches!(result, Err(FormatError::UnexpectedShape(_))));
    }

    #[test]
    fn test_vlan_nxos_modes() {
        let output = classify(&RawOutput::Record(record! {
            "TABLE_vlanbrief" => {"ROW_vlanbrief": [
                {"vlanshowbr-vlanid": 1, "vlanshowbr-vlanname": "default", "vlanshowplist-ifidx": "Ethernet1/3,Ethernet1/4"},
                {"vlanshowbr-vlanid": 10, "vlanshowbr-vlanname": "users"}
            ]}
        }))
        .unwrap();
        let actual = Layer2Formatter
            .format("vlan", &FormatInput::new(Dialect::Nxos, &output, Mode::Actual))
            .unwrap();
        let validation = Layer2Formatter
            .format("vlan", &FormatInput::new(Dialect::Nxos, &output, Mode::Validation))
            .unwrap();
        assert_eq!(
            actual,
            StateValue::Map(state_map! {
                1 => state_map! {
                    "name" => "default",
                    "intf" => vec![StateValue::from("Ethernet1/3"), StateValue::from("Ethernet1/4")],
                },
                10 => state_map! { "name" => "users", "intf" => Vec::<StateValue>::new() },
            })
        );
        assert_eq!(
            validation,
            StateValue::Map(state_map! {
                1 => state_map! { "name" => "default" },
                10 => state_map! { "name" => "users" },
            })
        );
    }
}
