//! `wifi` feature: wireless LAN controller WLANs, access points and
//! per-WLAN client counters.

use once_cell::sync::Lazy;
use regex::Regex;

use netval_common::{
    Dialect, FeatureFormatter, FormatError, FormatInput, FormatResult, Mode, RecordExt, StateKey,
    StateMap, StateMapExt, StateValue,
};

use super::counters::CounterScan;
use super::{put_non_empty, require_dialect};

mod wlc_fields {
    pub const WLAN_ID: &str = "WLAN_ID";
    pub const SSID: &str = "SSID";
    pub const WLAN_INTF: &str = "INTERFACE_NAME";
    pub const WLAN_STATUS: &str = "STATUS";

    pub const AP_NAME: &str = "AP_NAME";
    pub const AP_MODEL: &str = "AP_MODEL";
    pub const AP_IP: &str = "IP";
    pub const AP_CLIENTS: &str = "CLIENTS";
}

/// `WLAN Identifier.................................. 1`
static WLAN_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*WLAN\s+(?:ID|Identifier)\b[.\s:]*(\d+)").expect("valid WLAN label regex")
});

static CLIENT_TOTAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*Number of Clients\b").expect("valid client total regex")
});

/// Lines between a WLAN label and its client count.
const CLIENT_COUNT_OFFSET: usize = 1;

/// Formatter for the `wifi` feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct WifiFormatter;

impl FeatureFormatter for WifiFormatter {
    fn feature(&self) -> &'static str {
        "wifi"
    }

    fn sub_features(&self) -> &'static [&'static str] {
        &["wlan", "ap", "client_count"]
    }

    fn format(&self, sub_feature: &str, input: &FormatInput<'_>) -> FormatResult<StateValue> {
        if !self.supports(sub_feature) {
            return Err(FormatError::UnsupportedSubFeature);
        }
        require_dialect(input.dialect, &[Dialect::Wlc])?;
        match sub_feature {
            "wlan" => wlan(input),
            "ap" => ap(input),
            _ => client_count(input),
        }
    }
}

fn wlan(input: &FormatInput<'_>) -> FormatResult<StateValue> {
    use wlc_fields::*;
    let mut root = StateMap::new();
    for record in input.output.records()? {
        let entry = root.child_map(StateKey::coerce(&record.field(WLAN_ID)?));
        put_non_empty(entry, "ssid", &record.field(SSID)?);
        put_non_empty(entry, "intf", &record.field_or(WLAN_INTF, ""));
        put_non_empty(entry, "status", &record.field_or(WLAN_STATUS, ""));
    }
    Ok(root.into())
}

fn ap(input: &FormatInput<'_>) -> FormatResult<StateValue> {
    use wlc_fields::*;
    let mut root = StateMap::new();
    for record in input.output.records()? {
        let entry = root.child_map(record.field(AP_NAME)?);
        put_non_empty(entry, "model", &record.field_or(AP_MODEL, ""));
        put_non_empty(entry, "ip", &record.field_or(AP_IP, ""));
        if input.mode == Mode::Actual {
            put_non_empty(entry, "clients", &record.field_or(AP_CLIENTS, ""));
        }
    }
    Ok(root.into())
}

fn client_count(input: &FormatInput<'_>) -> FormatResult<StateValue> {
    let mut scan = CounterScan::new(input.output.lines()?);
    let groups = scan.take_grouped(&WLAN_LABEL, CLIENT_COUNT_OFFSET)?;
    let total = scan
        .take_total(&CLIENT_TOTAL)
        .unwrap_or_else(|| groups.iter().map(|(_, n)| n).sum());

    let mut root = StateMap::new();
    for (wlan_id, count) in groups {
        root.put(StateKey::coerce(&wlan_id), count);
    }
    root.put("total", total);
    Ok(root.into())
}
