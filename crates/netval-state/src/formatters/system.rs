//! `system` feature: software image, hardware modules and ACLs.

use netval_common::{
    FeatureFormatter, FormatError, FormatInput, FormatResult, Mode, RecordExt, StateKey, StateMap,
    StateMapExt, StateValue,
};

use super::{acl, nested_rows, role};

/// NX-OS `show module | json` table.
const NX_MODULE_TABLE: (&str, &str) = ("TABLE_modinfo", "ROW_modinfo");

/// Formatter for the `system` feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemFormatter;

impl FeatureFormatter for SystemFormatter {
    fn feature(&self) -> &'static str {
        "system"
    }

    fn sub_features(&self) -> &'static [&'static str] {
        &["image", "module", "acl", "mgmt_acl"]
    }

    fn format(&self, sub_feature: &str, input: &FormatInput<'_>) -> FormatResult<StateValue> {
        match sub_feature {
            "image" => image(input),
            "module" => module(input),
            "acl" => acl::format_acl(input),
            "mgmt_acl" => acl::format_mgmt_acl(input),
            _ => Err(FormatError::UnsupportedSubFeature),
        }
    }
}

fn image(input: &FormatInput<'_>) -> FormatResult<StateValue> {
    let field = role(input.keys.image)?;
    let record = input
        .output
        .records()?
        .first()
        .ok_or(FormatError::UnexpectedShape("a version record"))?;
    let mut map = StateMap::new();
    map.put("image", StateValue::coerce(&record.field(field)?));
    Ok(map.into())
}

struct Module {
    num: StateKey,
    model: String,
    status: String,
}

fn module(input: &FormatInput<'_>) -> FormatResult<StateValue> {
    let keys = input.keys;
    let (num, model, status) = (role(keys.mod_num)?, role(keys.mod_model)?, role(keys.mod_status)?);
    let records = input.output.records()?.iter().collect();
    let modules = nested_rows(records, &[NX_MODULE_TABLE])
        .into_iter()
        .map(|r| -> FormatResult<Module> {
            Ok(Module {
                num: StateKey::coerce(&r.field(num)?),
                model: r.field(model)?,
                status: r.field_or(status, ""),
            })
        })
        .collect::<FormatResult<Vec<_>>>()?;

    let mut root = StateMap::new();
    for m in modules {
        let entry = root.child_map(m.num);
        entry.put("model", m.model.trim());
        if input.mode == Mode::Actual {
            super::put_non_empty(entry, "status", &m.status);
        }
    }
    Ok(root.into())
}
