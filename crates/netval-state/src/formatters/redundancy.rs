//! `redundancy` feature: first-hop redundancy groups and switch stacks.

use netval_common::{
    Dialect, FeatureFormatter, FormatError, FormatInput, FormatResult, Mode, RecordExt, StateKey,
    StateMap, StateMapExt, StateValue,
};

use super::{nested_rows, put_non_empty, require_dialect, role};

/// NX-OS `show hsrp detail | json`.
const NX_HSRP_TABLE: (&str, &str) = ("TABLE_grp_detail", "ROW_grp_detail");

/// IOS `show switch` fields.
mod stack_fields {
    pub const SWITCH: &str = "SWITCH";
    pub const ROLE: &str = "ROLE";
    pub const PRIORITY: &str = "PRIORITY";
    pub const STATE: &str = "STATE";
}

/// Formatter for the `redundancy` feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct RedundancyFormatter;

impl FeatureFormatter for RedundancyFormatter {
    fn feature(&self) -> &'static str {
        "redundancy"
    }

    fn sub_features(&self) -> &'static [&'static str] {
        &["hsrp", "switch"]
    }

    fn format(&self, sub_feature: &str, input: &FormatInput<'_>) -> FormatResult<StateValue> {
        match sub_feature {
            "hsrp" => hsrp(input),
            "switch" => switch(input),
            _ => Err(FormatError::UnsupportedSubFeature),
        }
    }
}

struct HsrpGroup {
    intf: String,
    group: StateKey,
    priority: String,
    vip: String,
    state: String,
}

fn hsrp(input: &FormatInput<'_>) -> FormatResult<StateValue> {
    let keys = input.keys;
    let (intf, group) = (role(keys.hsrp_intf)?, role(keys.hsrp_group)?);
    let records = input.output.records()?.iter().collect();
    let mut groups = Vec::new();
    for record in nested_rows(records, &[NX_HSRP_TABLE]) {
        groups.push(HsrpGroup {
            intf: record.field(intf)?,
            group: StateKey::coerce(&record.field(group)?),
            priority: record.field_or(keys.hsrp_priority, ""),
            vip: record.field_or(keys.hsrp_vip, ""),
            state: record.field_or(keys.hsrp_state, ""),
        });
    }

    let mut root = StateMap::new();
    for g in groups {
        let entry = root.child_map(g.intf).child_map(g.group);
        put_non_empty(entry, "priority", &g.priority);
        put_non_empty(entry, "vip", &g.vip);
        if input.mode == Mode::Actual {
            put_non_empty(entry, "state", &g.state);
        }
    }
    Ok(root.into())
}

fn switch(input: &FormatInput<'_>) -> FormatResult<StateValue> {
    require_dialect(input.dialect, &[Dialect::Ios])?;
    let mut root = StateMap::new();
    for record in input.output.records()? {
        // Active switch is starred in the number column
        let num = record.field(stack_fields::SWITCH)?;
        let entry = root.child_map(StateKey::coerce(num.trim_start_matches('*')));
        put_non_empty(entry, "role", &record.field(stack_fields::ROLE)?);
        put_non_empty(entry, "priority", &record.field_or(stack_fields::PRIORITY, ""));
        if input.mode == Mode::Actual {
            put_non_empty(entry, "state", &record.field_or(stack_fields::STATE, ""));
        }
    }
    Ok(root.into())
}
