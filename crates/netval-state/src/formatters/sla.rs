//! `sla` feature: IOS IP SLA probes and Viptela interface trackers.
//!
//! Viptela reports all trackers of an interface on one line, with the
//! tracker name, status and round-trip time columns comma-joined. Such a
//! record is split pairwise into one probe per tracker before formatting.

use netval_common::{
    Dialect, FeatureFormatter, FormatError, FormatInput, FormatResult, Mode, Record, RecordExt,
    StateKey, StateMap, StateMapExt, StateValue,
};

use super::{put_non_empty, require_dialect};

/// IOS `show ip sla summary` fields.
mod ip_sla_fields {
    pub const ID: &str = "ID";
    pub const TYPE: &str = "TYPE";
    pub const DESTINATION: &str = "DESTINATION";
    pub const STATE: &str = "STATE";
    pub const RTT: &str = "RTT";
}

/// Viptela `show interface tracker` / `show endpoint-tracker` fields.
mod tracker_fields {
    pub const INTERFACE: &str = "INTERFACE";
    pub const NAME: &str = "TRACKER_NAME";
    pub const STATUS: &str = "STATUS";
    pub const RTT: &str = "RTT";
}

/// Formatter for the `sla` feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct SlaFormatter;

impl FeatureFormatter for SlaFormatter {
    fn feature(&self) -> &'static str {
        "sla"
    }

    fn sub_features(&self) -> &'static [&'static str] {
        &["ip_sla", "tracker"]
    }

    fn format(&self, sub_feature: &str, input: &FormatInput<'_>) -> FormatResult<StateValue> {
        match sub_feature {
            "ip_sla" => ip_sla(input),
            "tracker" => tracker(input),
            _ => Err(FormatError::UnsupportedSubFeature),
        }
    }
}

/// Round-trip time in whole milliseconds, rounded half away from zero.
/// Anything that is not a number (`-`, `N/A`, `Timeout`) is kept as given.
pub fn round_rtt(raw: &str) -> StateValue {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(ms) if ms.is_finite() => StateValue::Int(ms.round() as i64),
        _ => StateValue::coerce(trimmed),
    }
}

struct Probe {
    id: StateKey,
    kind: String,
    destination: String,
    status: String,
    rtt: String,
}

fn ip_sla(input: &FormatInput<'_>) -> FormatResult<StateValue> {
    use ip_sla_fields::*;
    require_dialect(input.dialect, &[Dialect::Ios])?;
    let mut probes = Vec::new();
    for record in input.output.records()? {
        // Active probes are starred in the ID column
        let id = record.field(ID)?;
        probes.push(Probe {
            id: StateKey::coerce(id.trim().trim_start_matches('*')),
            kind: record.field_or(TYPE, ""),
            destination: record.field_or(DESTINATION, ""),
            status: record.field_or(STATE, ""),
            rtt: record.field_or(RTT, ""),
        });
    }

    let mut root = StateMap::new();
    for probe in probes {
        let entry = root.child_map(probe.id);
        put_non_empty(entry, "type", &probe.kind);
        put_non_empty(entry, "dst", &probe.destination);
        if input.mode == Mode::Actual {
            put_non_empty(entry, "status", &probe.status);
            if !probe.rtt.trim().is_empty() {
                entry.put("rtt", round_rtt(&probe.rtt));
            }
        }
    }
    Ok(root.into())
}

struct Tracker {
    name: String,
    intf: String,
    status: String,
    rtt: String,
}

fn split_column(record: &Record, field: &str) -> FormatResult<Vec<String>> {
    Ok(record
        .field(field)?
        .split(',')
        .map(|s| s.trim().to_string())
        .collect())
}

/// Splits one combined tracker record into one entry per tracker.
fn split_trackers(record: &Record) -> FormatResult<Vec<Tracker>> {
    use tracker_fields::*;
    let intf = record.field(INTERFACE)?;
    let names = split_column(record, NAME)?;
    let statuses = split_column(record, STATUS)?;
    let rtts = split_column(record, RTT)?;
    if statuses.len() != names.len() {
        return Err(FormatError::invalid(STATUS, record.field_or(STATUS, "")));
    }
    if rtts.len() != names.len() {
        return Err(FormatError::invalid(RTT, record.field_or(RTT, "")));
    }
    Ok(names
        .into_iter()
        .zip(statuses)
        .zip(rtts)
        .map(|((name, status), rtt)| Tracker {
            name,
            intf: intf.trim().to_string(),
            status,
            rtt,
        })
        .collect())
}

fn tracker(input: &FormatInput<'_>) -> FormatResult<StateValue> {
    require_dialect(input.dialect, &[Dialect::Viptela])?;
    let mut trackers = Vec::new();
    for record in input.output.records()? {
        trackers.extend(split_trackers(record)?);
    }

    let mut root = StateMap::new();
    for t in trackers {
        let entry = root.child_map(t.name);
        put_non_empty(entry, "intf", &t.intf);
        if input.mode == Mode::Actual {
            put_non_empty(entry, "status", &t.status);
            if !t.rtt.is_empty() {
                entry.put("rtt", round_rtt(&t.rtt));
            }
        }
    }
    Ok(root.into())
}
