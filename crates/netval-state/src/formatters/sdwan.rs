//! `sdwan` feature: Viptela control connections and BFD sessions.

use netval_common::{
    Dialect, FeatureFormatter, FormatError, FormatInput, FormatResult, Mode, RecordExt, StateMap,
    StateMapExt, StateValue,
};

use super::{put_non_empty, require_dialect};

mod viptela_fields {
    pub const PEER_TYPE: &str = "PEER_TYPE";
    pub const PEER_SYSTEM_IP: &str = "PEER_SYSTEM_IP";
    pub const SITE_ID: &str = "SITE_ID";
    pub const STATE: &str = "STATE";

    pub const SYSTEM_IP: &str = "SYSTEM_IP";
    pub const LOCAL_COLOR: &str = "SOURCE_TLOC_COLOR";
    pub const REMOTE_COLOR: &str = "REMOTE_TLOC_COLOR";
}

/// Formatter for the `sdwan` feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct SdwanFormatter;

impl FeatureFormatter for SdwanFormatter {
    fn feature(&self) -> &'static str {
        "sdwan"
    }

    fn sub_features(&self) -> &'static [&'static str] {
        &["control", "bfd"]
    }

    fn format(&self, sub_feature: &str, input: &FormatInput<'_>) -> FormatResult<StateValue> {
        if !self.supports(sub_feature) {
            return Err(FormatError::UnsupportedSubFeature);
        }
        require_dialect(input.dialect, &[Dialect::Viptela])?;
        match sub_feature {
            "control" => control(input),
            _ => bfd(input),
        }
    }
}

fn control(input: &FormatInput<'_>) -> FormatResult<StateValue> {
    use viptela_fields::*;
    let mut root = StateMap::new();
    for record in input.output.records()? {
        let entry = root.child_map(record.field(PEER_SYSTEM_IP)?);
        put_non_empty(entry, "peer_type", &record.field(PEER_TYPE)?);
        put_non_empty(entry, "site_id", &record.field_or(SITE_ID, ""));
        if input.mode == Mode::Actual {
            put_non_empty(entry, "state", &record.field_or(STATE, ""));
        }
    }
    Ok(root.into())
}

/// Sessions to one remote system are keyed by TLOC color pair,
/// `local->remote`.
fn bfd(input: &FormatInput<'_>) -> FormatResult<StateValue> {
    use viptela_fields::*;
    let mut root = StateMap::new();
    for record in input.output.records()? {
        let entry = root.child_map(record.field(SYSTEM_IP)?);
        put_non_empty(entry, "site_id", &record.field_or(SITE_ID, ""));
        if input.mode == Mode::Actual {
            let colors = format!(
                "{}->{}",
                record.field(LOCAL_COLOR)?.trim(),
                record.field(REMOTE_COLOR)?.trim()
            );
            entry
                .child_map("colors")
                .put(colors, record.field_or(STATE, "").trim());
        }
    }
    Ok(root.into())
}
