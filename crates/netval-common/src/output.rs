//! Raw command output and the output classifier.
//!
//! A collector hands over each sub-feature's output either as a text block,
//! as a sequence of items (text lines or structured records), or as a
//! single decoded JSON document. [`classify`] splits it into raw lines and
//! records and rejects sequences that mix the two.
//!
//! Classification also applies the singleton repair: NX-OS `| json` output
//! collapses a one-element `ROW_*` sequence into a bare object, so every
//! `ROW_*` object found anywhere in a record is re-wrapped into a
//! one-element array before any formatter iterates it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FormatError, FormatResult};

/// One structured item of command output.
pub type Record = serde_json::Map<String, Value>;

/// Output of one command as delivered by the collector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawOutput {
    /// No output was collected (`null` or a missing `output` key).
    #[default]
    Absent,
    /// Unparsed text block.
    Text(String),
    /// Sequence of text lines or records.
    Items(Vec<Value>),
    /// A single decoded JSON document.
    Record(Record),
}

impl RawOutput {
    /// Returns true if there is nothing to normalize.
    pub fn is_empty(&self) -> bool {
        match self {
            RawOutput::Absent => true,
            RawOutput::Text(text) => text.trim().is_empty(),
            RawOutput::Items(items) => items.is_empty(),
            RawOutput::Record(record) => record.is_empty(),
        }
    }
}

/// A sub-feature's output together with the command that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOutput {
    /// The command, used in diagnostics.
    #[serde(default)]
    pub command: String,
    /// The collected output.
    #[serde(default)]
    pub output: RawOutput,
}

impl CommandOutput {
    /// Creates a command output.
    pub fn new(command: impl Into<String>, output: RawOutput) -> Self {
        Self {
            command: command.into(),
            output,
        }
    }

    /// Output given as one text block.
    pub fn text(command: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(command, RawOutput::Text(text.into()))
    }

    /// Output given as structured records.
    pub fn records(command: impl Into<String>, records: Vec<Record>) -> Self {
        let items = records.into_iter().map(Value::Object).collect();
        Self::new(command, RawOutput::Items(items))
    }

    /// Returns true if there is nothing to normalize.
    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }
}

/// Output split into its two disjoint shapes. At most one is non-empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classified {
    /// Unstructured text lines.
    pub raw_lines: Vec<String>,
    /// Structured records.
    pub records: Vec<Record>,
}

impl Classified {
    /// Returns true if neither lines nor records are present.
    pub fn is_empty(&self) -> bool {
        self.raw_lines.is_empty() && self.records.is_empty()
    }

    /// Returns the raw lines, failing if the output was structured.
    pub fn lines(&self) -> FormatResult<&[String]> {
        if self.raw_lines.is_empty() && !self.records.is_empty() {
            return Err(FormatError::UnexpectedShape("raw text lines"));
        }
        Ok(&self.raw_lines)
    }

    /// Returns the records, failing if the output was raw text.
    pub fn records(&self) -> FormatResult<&[Record]> {
        if self.records.is_empty() && !self.raw_lines.is_empty() {
            return Err(FormatError::UnexpectedShape("structured records"));
        }
        Ok(&self.records)
    }

    /// Flattens the rows of an NX-OS style table.
    ///
    /// A record holding `table` contributes the rows under `table.row`; a
    /// record without it is taken to already be a row. This lets one code
    /// path serve both flat TextFSM-style records and `| json` documents.
    pub fn rows(&self, table: &str, row: &str) -> FormatResult<Vec<&Record>> {
        let mut rows = Vec::new();
        for record in self.records()? {
            if record.contains_key(table) {
                rows.extend(record.rows(table, row));
            } else {
                rows.push(record);
            }
        }
        Ok(rows)
    }
}

/// Splits raw output into lines and records.
///
/// # Errors
///
/// [`FormatError::MixedOutput`] if lines and records are mixed, and
/// [`FormatError::UnexpectedShape`] for items that are neither.
pub fn classify(output: &RawOutput) -> FormatResult<Classified> {
    let mut classified = Classified::default();
    match output {
        RawOutput::Absent => {}
        RawOutput::Text(text) => {
            classified.raw_lines = text.lines().map(str::to_string).collect();
        }
        RawOutput::Record(record) => {
            let mut record = record.clone();
            repair_record(&mut record);
            classified.records.push(record);
        }
        RawOutput::Items(items) => {
            for item in items {
                match item {
                    Value::String(line) => classified.raw_lines.push(line.clone()),
                    Value::Object(record) => {
                        let mut record = record.clone();
                        repair_record(&mut record);
                        classified.records.push(record);
                    }
                    _ => return Err(FormatError::UnexpectedShape("text lines or records")),
                }
            }
            if !classified.raw_lines.is_empty() && !classified.records.is_empty() {
                return Err(FormatError::MixedOutput {
                    lines: classified.raw_lines.len(),
                    records: classified.records.len(),
                });
            }
        }
    }
    Ok(classified)
}

/// Re-wraps every bare `ROW_*` object in `value` into a one-element array.
pub fn repair_singletons(value: &mut Value) {
    match value {
        Value::Object(map) => repair_record(map),
        Value::Array(items) => items.iter_mut().for_each(repair_singletons),
        _ => {}
    }
}

fn repair_record(record: &mut Record) {
    for (key, child) in record.iter_mut() {
        if key.starts_with("ROW_") && child.is_object() {
            let single = child.take();
            *child = Value::Array(vec![single]);
        }
        repair_singletons(child);
    }
}

/// Accessors for structured records.
pub trait RecordExt {
    /// Returns a field as text. Numbers and booleans are rendered, null is
    /// empty, and a list is joined with commas.
    ///
    /// # Errors
    ///
    /// [`FormatError::MissingField`] if the field is absent.
    fn field(&self, name: &str) -> FormatResult<String>;

    /// Returns a field as text, or `default` if it is absent.
    fn field_or(&self, name: &str, default: &str) -> String;

    /// Returns a field only if it is present and non-empty. An empty role
    /// name always yields `None`.
    fn non_empty(&self, name: &str) -> Option<String>;

    /// Returns a list field. A string is split on commas; an empty string
    /// is an empty list.
    fn list(&self, name: &str) -> FormatResult<Vec<String>>;

    /// Returns the rows of a nested `table.row`, accepting a bare object
    /// where a sequence is expected.
    fn rows(&self, table: &str, row: &str) -> Vec<&Record>;
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(render).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

impl RecordExt for Record {
    fn field(&self, name: &str) -> FormatResult<String> {
        self.get(name)
            .map(render)
            .ok_or_else(|| FormatError::missing(name))
    }

    fn field_or(&self, name: &str, default: &str) -> String {
        self.get(name)
            .map(render)
            .unwrap_or_else(|| default.to_string())
    }

    fn non_empty(&self, name: &str) -> Option<String> {
        if name.is_empty() {
            return None;
        }
        self.get(name).map(render).filter(|v| !v.trim().is_empty())
    }

    fn list(&self, name: &str) -> FormatResult<Vec<String>> {
        match self.get(name) {
            None => Err(FormatError::missing(name)),
            Some(Value::Array(items)) => Ok(items.iter().map(render).collect()),
            Some(other) => Ok(render(other)
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()),
        }
    }

    fn rows(&self, table: &str, row: &str) -> Vec<&Record> {
        match self.get(table).and_then(|t| t.get(row)) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_object).collect(),
            Some(Value::Object(single)) => vec![single],
            _ => Vec::new(),
        }
    }
}

/// Builds a [`Record`] from `field => value` pairs.
#[macro_export]
macro_rules! record {
    ($($field:expr => $value:tt),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut record = $crate::output::Record::new();
        $(
            record.insert($field.to_string(), ::serde_json::json!($value));
        )*
        record
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_classify_text_block() {
        let out = RawOutput::Text("line one\nline two\n".to_string());
        let classified = classify(&out).unwrap();
        assert_eq!(classified.raw_lines, vec!["line one", "line two"]);
        assert!(classified.records.is_empty());
    }

    #[test]
    fn test_classify_records() {
        let out = RawOutput::Items(vec![json!({"VERSION": "17.3.4"})]);
        let classified = classify(&out).unwrap();
        assert_eq!(classified.records.len(), 1);
        assert!(classified.lines().is_err());
    }

    #[test]
    fn test_absent_output_from_null() {
        let out: CommandOutput =
            serde_json::from_value(json!({"command": "show clock", "output": null})).unwrap();
        assert_eq!(out.output, RawOutput::Absent);
        assert!(out.is_empty());
        assert_eq!(classify(&out.output), Ok(Classified::default()));
    }

    #[test]
    fn test_classify_rejects_mixed_items() {
        let out = RawOutput::Items(vec![json!("text"), json!({"a": "b"})]);
        assert_eq!(
            classify(&out),
            Err(FormatError::MixedOutput {
                lines: 1,
                records: 1
            })
        );
    }

    #[test]
    fn test_classify_rejects_scalars() {
        let out = RawOutput::Items(vec![json!(5)]);
        assert!(matches!(
            classify(&out),
            Err(FormatError::UnexpectedShape(_))
        ));
    }

    #[test]
    fn test_singleton_repair_nested() {
        let mut doc = json!({
            "TABLE_vrf": {"ROW_vrf": {
                "vrf-name-out": "default",
                "TABLE_neighbor": {"ROW_neighbor": {"neighborid": "10.0.0.1"}}
            }}
        });
        repair_singletons(&mut doc);
        assert!(doc["TABLE_vrf"]["ROW_vrf"].is_array());
        assert!(doc["TABLE_vrf"]["ROW_vrf"][0]["TABLE_neighbor"]["ROW_neighbor"].is_array());
    }

    #[test]
    fn test_rows_flatten_tables_and_flat_records() {
        let out = RawOutput::Record(record! {
            "TABLE_intf" => {"ROW_intf": {"intf-name": "Vlan10"}}
        });
        let classified = classify(&out).unwrap();
        let rows = classified.rows("TABLE_intf", "ROW_intf").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].field("intf-name").unwrap(), "Vlan10");

        let flat = classify(&RawOutput::Items(vec![json!({"INTERFACE": "Gi1"})])).unwrap();
        assert_eq!(flat.rows("TABLE_intf", "ROW_intf").unwrap().len(), 1);
    }

    #[test]
    fn test_record_field_rendering() {
        let rec = record! {
            "vpc-id" => 10,
            "name" => "",
            "members" => ["Gi1", "Gi2"],
            "vlans" => "10, 20",
        };
        assert_eq!(rec.field("vpc-id").unwrap(), "10");
        assert_eq!(rec.non_empty("name"), None);
        assert_eq!(rec.non_empty(""), None);
        assert_eq!(rec.list("members").unwrap(), vec!["Gi1", "Gi2"]);
        assert_eq!(rec.list("vlans").unwrap(), vec!["10", "20"]);
        assert_eq!(rec.field("absent"), Err(FormatError::missing("absent")));
        assert_eq!(rec.field_or("absent", "x"), "x");
    }
}
