//! The normalization engine.
//!
//! [`Normalizer`] walks `feature -> sub-feature -> output` and assembles
//! the canonical tree `feature -> sub-feature -> value`. For each
//! sub-feature it:
//!
//! 1. returns an empty mapping for empty or absent output
//! 2. classifies the output (`MalformedOutput` on mixed shapes)
//! 3. checks the dialect resolved at construction (`UnsupportedDialect`)
//! 4. looks up the feature's formatter (`UnsupportedFeature`) and checks
//!    it handles the sub-feature (`UnsupportedSubFeature`)
//! 5. formats, lifting formatter errors into [`NormalizeError`] with the
//!    dialect, feature and sub-feature attached
//!
//! Under [`ErrorPolicy::Halt`] the first failure ends the run; under
//! [`ErrorPolicy::Skip`] failing sub-features are logged, collected and
//! left out of the tree.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use netval_common::{
    classify, CommandOutput, Dialect, FormatInput, Mode, NormalizeError, NormalizeResult, Scope,
    StateTree, StateValue,
};

use crate::config::ErrorPolicy;
use crate::registry::FormatterRegistry;

/// Collected output: `feature -> sub-feature -> command output`.
pub type FeatureOutputs = BTreeMap<String, BTreeMap<String, CommandOutput>>;

/// Result of a full run: whatever was normalized plus every error met.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeReport {
    pub tree: StateTree,
    pub errors: Vec<NormalizeError>,
}

impl NormalizeReport {
    /// Returns true if no sub-feature failed.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Normalizes one device's output for one dialect and mode.
#[derive(Debug, Clone)]
pub struct Normalizer<'r> {
    registry: &'r FormatterRegistry,
    dialect_id: String,
    dialect: Option<Dialect>,
    mode: Mode,
    policy: ErrorPolicy,
}

impl Normalizer<'static> {
    /// Creates a normalizer over the built-in formatters.
    pub fn with_builtin(dialect_id: impl Into<String>, mode: Mode) -> Self {
        Self::new(FormatterRegistry::builtin(), dialect_id, mode)
    }
}

impl<'r> Normalizer<'r> {
    /// Creates a normalizer, resolving the dialect identifier once.
    ///
    /// An unrecognized identifier is not an error here; every sub-feature
    /// with output then fails with `UnsupportedDialect`.
    pub fn new(registry: &'r FormatterRegistry, dialect_id: impl Into<String>, mode: Mode) -> Self {
        let dialect_id = dialect_id.into();
        let dialect = Dialect::resolve(&dialect_id);
        if dialect.is_none() {
            warn!(dialect = %dialect_id, "No key table matches dialect identifier");
        }
        Self {
            registry,
            dialect_id,
            dialect,
            mode,
            policy: ErrorPolicy::default(),
        }
    }

    /// Sets the sub-feature error policy.
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The resolved dialect, if any.
    pub fn dialect(&self) -> Option<Dialect> {
        self.dialect
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn error_policy(&self) -> ErrorPolicy {
        self.policy
    }

    fn scope(&self, feature: &str, sub_feature: &str) -> Scope {
        Scope::new(self.dialect_id.as_str(), feature, sub_feature)
    }

    /// Normalizes one sub-feature's output.
    ///
    /// # Errors
    ///
    /// Any [`NormalizeError`]; all carry the dialect, feature and
    /// sub-feature.
    pub fn normalize_sub_feature(
        &self,
        feature: &str,
        sub_feature: &str,
        output: Option<&CommandOutput>,
    ) -> NormalizeResult<StateValue> {
        let output = match output {
            Some(output) if !output.is_empty() => output,
            _ => {
                debug!(feature, sub_feature, "No output, empty mapping");
                return Ok(StateValue::empty_map());
            }
        };
        let scope = self.scope(feature, sub_feature);

        let classified = classify(&output.output)
            .map_err(|e| NormalizeError::from_format(scope.clone(), &output.command, e))?;
        let dialect = self
            .dialect
            .ok_or_else(|| NormalizeError::UnsupportedDialect {
                scope: scope.clone(),
            })?;
        let formatter = self
            .registry
            .get(feature)
            .ok_or_else(|| NormalizeError::UnsupportedFeature {
                scope: scope.clone(),
            })?;
        if !formatter.supports(sub_feature) {
            return Err(NormalizeError::UnsupportedSubFeature { scope });
        }

        debug!(
            feature,
            sub_feature,
            dialect = %dialect,
            lines = classified.raw_lines.len(),
            records = classified.records.len(),
            "Normalizing sub-feature"
        );
        let input = FormatInput::new(dialect, &classified, self.mode);
        formatter
            .format(sub_feature, &input)
            .map_err(|e| NormalizeError::from_format(scope, &output.command, e))
    }

    /// Normalizes every sub-feature, applying the error policy.
    ///
    /// Under `skip` this never fails; consult
    /// [`normalize_report`](Self::normalize_report) to see what was left out.
    pub fn normalize(&self, features: &FeatureOutputs) -> NormalizeResult<StateTree> {
        let report = self.normalize_report(features);
        match (self.policy, report.errors.into_iter().next()) {
            (ErrorPolicy::Halt, Some(err)) => Err(err),
            _ => Ok(report.tree),
        }
    }

    /// Normalizes every sub-feature, returning the tree together with the
    /// errors met. Under `halt` at most one error is returned and the tree
    /// holds what was normalized before it.
    pub fn normalize_report(&self, features: &FeatureOutputs) -> NormalizeReport {
        let mut report = NormalizeReport::default();
        for (feature, subs) in features {
            for (sub_feature, output) in subs {
                match self.normalize_sub_feature(feature, sub_feature, Some(output)) {
                    Ok(value) => {
                        report
                            .tree
                            .entry(feature.clone())
                            .or_default()
                            .insert(sub_feature.clone(), value);
                    }
                    Err(err) => {
                        if self.policy == ErrorPolicy::Halt {
                            report.errors.push(err);
                            return report;
                        }
                        warn!(
                            feature = %feature,
                            sub_feature = %sub_feature,
                            configuration = err.is_configuration_error(),
                            "Skipping sub-feature: {}",
                            err
                        );
                        report.errors.push(err);
                    }
                }
            }
        }
        debug!(
            features = report.tree.len(),
            errors = report.errors.len(),
            "Normalization finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netval_common::{state_map, RawOutput, Record};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn outputs(entries: &[(&str, &str, CommandOutput)]) -> FeatureOutputs {
        let mut features = FeatureOutputs::new();
        for (feature, sub, output) in entries {
            features
                .entry(feature.to_string())
                .or_default()
                .insert(sub.to_string(), output.clone());
        }
        features
    }

    fn image(version: &str) -> CommandOutput {
        let mut record = Record::new();
        record.insert("VERSION".to_string(), json!(version));
        CommandOutput::records("show version", vec![record])
    }

    #[test]
    fn test_absent_and_empty_output_is_empty_map() {
        let normalizer = Normalizer::with_builtin("cisco_ios", Mode::Actual);
        assert_eq!(
            normalizer.normalize_sub_feature("layer2", "vlan", None),
            Ok(StateValue::empty_map())
        );
        let empty = CommandOutput::new("show vlan", RawOutput::Items(vec![]));
        assert_eq!(
            normalizer.normalize_sub_feature("layer2", "vlan", Some(&empty)),
            Ok(StateValue::empty_map())
        );
    }

    #[test]
    fn test_unknown_sub_feature_names_scope() {
        let normalizer = Normalizer::with_builtin("cisco_ios", Mode::Actual);
        let err = normalizer
            .normalize_sub_feature("system", "firmware", Some(&image("17.3.4")))
            .unwrap_err();
        assert_eq!(
            err,
            NormalizeError::UnsupportedSubFeature {
                scope: Scope::new("cisco_ios", "system", "firmware")
            }
        );
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_unknown_feature_and_dialect() {
        let normalizer = Normalizer::with_builtin("cisco_ios", Mode::Actual);
        assert!(matches!(
            normalizer.normalize_sub_feature("multicast", "pim", Some(&image("x"))),
            Err(NormalizeError::UnsupportedFeature { .. })
        ));

        let junos = Normalizer::with_builtin("juniper_junos", Mode::Actual);
        assert_eq!(junos.dialect(), None);
        assert_eq!(
            junos.normalize_sub_feature("system", "image", Some(&image("x"))),
            Err(NormalizeError::UnsupportedDialect {
                scope: Scope::new("juniper_junos", "system", "image")
            })
        );
    }

    #[test]
    fn test_mixed_output_is_malformed() {
        let mixed = CommandOutput::new(
            "show ip route",
            RawOutput::Items(vec![json!("C 10.0.0.0/24"), json!({"NETWORK": "10.0.0.0"})]),
        );
        let normalizer = Normalizer::with_builtin("cisco_ios", Mode::Actual);
        match normalizer.normalize_sub_feature("route_table", "route", Some(&mixed)) {
            Err(NormalizeError::MalformedOutput { scope, command, .. }) => {
                assert_eq!(scope, Scope::new("cisco_ios", "route_table", "route"));
                assert_eq!(command, "show ip route");
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_halt_stops_at_first_error() {
        let features = outputs(&[
            ("system", "firmware", image("1")),
            ("system", "image", image("17.3.4")),
        ]);
        let normalizer = Normalizer::with_builtin("cisco_ios", Mode::Actual);
        assert!(normalizer.normalize(&features).is_err());
        let report = normalizer.normalize_report(&features);
        assert_eq!(report.errors.len(), 1);
        assert!(report.tree.is_empty());
    }

    #[test]
    fn test_skip_leaves_failing_sub_feature_out() {
        let features = outputs(&[
            ("system", "firmware", image("1")),
            ("system", "image", image("17.3.4")),
        ]);
        let normalizer = Normalizer::with_builtin("cisco_ios", Mode::Actual)
            .with_error_policy(ErrorPolicy::Skip);
        let report = normalizer.normalize_report(&features);
        assert_eq!(report.errors.len(), 1);
        assert!(!report.is_clean());
        let tree = normalizer.normalize(&features).unwrap();
        assert_eq!(
            tree["system"]["image"],
            StateValue::Map(state_map! { "image" => "17.3.4" })
        );
        assert!(!tree["system"].contains_key("firmware"));
    }
}
