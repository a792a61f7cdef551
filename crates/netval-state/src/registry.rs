//! Formatter registration table.
//!
//! Formatters are looked up by feature name. The built-in set is assembled
//! once per process on first use; callers needing extra features build
//! their own registry and [`register`](FormatterRegistry::register) them.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::{info, warn};

use netval_common::FeatureFormatter;

use crate::formatters;

static BUILTIN: Lazy<FormatterRegistry> = Lazy::new(FormatterRegistry::with_builtin);

/// Maps feature names to their formatter.
#[derive(Clone, Default)]
pub struct FormatterRegistry {
    formatters: BTreeMap<&'static str, Arc<dyn FeatureFormatter>>,
}

impl FormatterRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in formatter.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for formatter in formatters::builtin() {
            registry.register(formatter);
        }
        registry
    }

    /// The process-wide built-in registry.
    pub fn builtin() -> &'static FormatterRegistry {
        &BUILTIN
    }

    /// Registers a formatter under its feature name, returning the one it
    /// replaces.
    pub fn register(
        &mut self,
        formatter: Arc<dyn FeatureFormatter>,
    ) -> Option<Arc<dyn FeatureFormatter>> {
        let feature = formatter.feature();
        info!(
            feature,
            sub_features = formatter.sub_features().len(),
            "Registering formatter"
        );
        let previous = self.formatters.insert(feature, formatter);
        if previous.is_some() {
            warn!(feature, "Replaced previously registered formatter");
        }
        previous
    }

    /// Returns the formatter for `feature`.
    pub fn get(&self, feature: &str) -> Option<&Arc<dyn FeatureFormatter>> {
        self.formatters.get(feature)
    }

    /// Registered feature names, in order.
    pub fn features(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.formatters.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.formatters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formatters.is_empty()
    }
}

impl fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatterRegistry")
            .field("features", &self.formatters.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netval_common::{FormatInput, FormatResult, StateValue};
    use pretty_assertions::assert_eq;

    struct StubFormatter(&'static str);

    impl FeatureFormatter for StubFormatter {
        fn feature(&self) -> &'static str {
            "system"
        }

        fn sub_features(&self) -> &'static [&'static str] {
            &["image"]
        }

        fn format(&self, _sub_feature: &str, _input: &FormatInput<'_>) -> FormatResult<StateValue> {
            Ok(StateValue::from(self.0))
        }
    }

    #[test]
    fn test_builtin_has_every_feature() {
        let features: Vec<&str> = FormatterRegistry::builtin().features().collect();
        assert_eq!(
            features,
            vec![
                "evpn",
                "interface",
                "intf_bonded",
                "layer2",
                "neighbor",
                "redundancy",
                "route_protocol",
                "route_table",
                "sdwan",
                "sla",
                "system",
                "vpn",
                "wifi",
            ]
        );
    }

    #[test]
    fn test_register_replaces_by_feature() {
        let mut registry = FormatterRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.register(Arc::new(StubFormatter("a"))).is_none());
        let previous = registry.register(Arc::new(StubFormatter("b")));
        assert!(previous.is_some());
        assert_eq!(registry.len(), 1);
        assert!(registry.get("system").is_some());
        assert!(registry.get("wifi").is_none());
    }
}
