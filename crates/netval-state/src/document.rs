//! Device documents: the collected output of one device.
//!
//! ```yaml
//! dialect: nxos_ssh          # or a list of connection-handler identifiers
//! features:
//!   route_table:
//!     route:
//!       command: show ip route vrf all
//!       output: [{VRF: default, NETWORK: 10.0.0.0, MASK: "24"}]
//! ```
//!
//! `output` is a text block, a list of lines, a list of records or a single
//! decoded `| json` document. A null or missing `output` counts as empty. JSON documents are read by the same parser,
//! YAML being a superset of JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use netval_common::Dialect;

use crate::engine::FeatureOutputs;
use crate::error::{DocumentError, DocumentResult};

/// Dialect identifier as supplied by the collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DialectSpec {
    One(String),
    Many(Vec<String>),
}

impl DialectSpec {
    /// The identifier as one string, list entries joined with commas.
    pub fn identifier(&self) -> String {
        match self {
            DialectSpec::One(id) => id.clone(),
            DialectSpec::Many(ids) => ids.join(","),
        }
    }

    /// Resolves the dialect by substring matching over the identifier.
    pub fn resolve(&self) -> Option<Dialect> {
        match self {
            DialectSpec::One(id) => Dialect::resolve(id),
            DialectSpec::Many(ids) => Dialect::from_handlers(ids),
        }
    }
}

/// Collected output of one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDocument {
    pub dialect: DialectSpec,

    #[serde(default)]
    pub features: FeatureOutputs,
}

impl DeviceDocument {
    /// Parses a YAML or JSON document.
    pub fn from_str_named(content: &str, name: &str) -> DocumentResult<Self> {
        serde_yaml::from_str(content).map_err(|e| DocumentError::Parse {
            path: name.to_string(),
            message: e.to_string(),
        })
    }

    /// Reads and parses a document file.
    pub fn load(path: impl AsRef<Path>) -> DocumentResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Self::from_str_named(&content, &path.display().to_string())
    }

    /// Replaces the document's dialect, failing if it is not recognized.
    pub fn override_dialect(&mut self, identifier: &str) -> DocumentResult<()> {
        if Dialect::resolve(identifier).is_none() {
            return Err(DocumentError::UnknownDialect(identifier.to_string()));
        }
        self.dialect = DialectSpec::One(identifier.to_string());
        Ok(())
    }

    /// Number of sub-feature outputs in the document.
    pub fn sub_feature_count(&self) -> usize {
        self.features.values().map(|subs| subs.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netval_common::RawOutput;
    use pretty_assertions::assert_eq;

    const DOC: &str = r#"
dialect: [cisco_ios, nxos_ssh]
features:
  system:
    image:
      command: show version
      output: [{VERSION: "9.3(8)"}]
  layer2:
    mac_table:
      command: show mac address-table count
      output: |
        MAC Entries for all vlans :
        Total MAC Addresses in Use:            12
"#;

    #[test]
    fn test_parse_yaml_document() {
        let doc = DeviceDocument::from_str_named(DOC, "sw1.yaml").unwrap();
        assert_eq!(doc.dialect.resolve(), Some(Dialect::Nxos));
        assert_eq!(doc.dialect.identifier(), "cisco_ios,nxos_ssh");
        assert_eq!(doc.sub_feature_count(), 2);
        let mac = &doc.features["layer2"]["mac_table"];
        assert_eq!(mac.command, "show mac address-table count");
        assert!(matches!(mac.output, RawOutput::Text(_)));
        assert!(matches!(
            doc.features["system"]["image"].output,
            RawOutput::Items(_)
        ));
    }

    #[test]
    fn test_parse_json_document() {
        let json = r#"{"dialect": "cisco_asa", "features": {"vpn": {"ac_user": {"output": []}}}}"#;
        let doc = DeviceDocument::from_str_named(json, "fw.json").unwrap();
        assert_eq!(doc.dialect.resolve(), Some(Dialect::Asa));
        assert!(doc.features["vpn"]["ac_user"].is_empty());
    }

    #[test]
    fn test_null_or_missing_output_is_empty() {
        let yaml = r#"
dialect: cisco_ios
features:
  system:
    image:
      command: show version
      output:
    acl:
      command: show ip access-lists
"#;
        let doc = DeviceDocument::from_str_named(yaml, "rtr2.yaml").unwrap();
        assert_eq!(doc.features["system"]["image"].output, RawOutput::Absent);
        assert_eq!(doc.features["system"]["acl"].output, RawOutput::Absent);
        assert!(doc.features["system"]["acl"].is_empty());
    }

    #[test]
    fn test_missing_dialect_is_parse_error() {
        let err = DeviceDocument::from_str_named("features: {}", "bad.yaml").unwrap_err();
        assert!(matches!(err, DocumentError::Parse { .. }));
    }

    #[test]
    fn test_override_dialect() {
        let mut doc = DeviceDocument::from_str_named(DOC, "sw1.yaml").unwrap();
        doc.override_dialect("cisco_wlc").unwrap();
        assert_eq!(doc.dialect.resolve(), Some(Dialect::Wlc));
        assert!(matches!(
            doc.override_dialect("junos"),
            Err(DocumentError::UnknownDialect(_))
        ));
    }
}
