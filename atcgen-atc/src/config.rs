//! Configuration for test-unit construction

use serde::{Deserialize, Serialize};

/// What to do with a call-sequence entry that has no spec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedCallPolicy {
    /// Fail the build
    #[default]
    Error,
    /// Log a warning and leave the entry out
    Skip,
}

/// Builder configuration, the `[atc]` section of `atcgen.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtcConfig {
    /// Package of the generated container
    pub namespace: String,
    /// Name of the generated container
    pub unit_name: String,
    /// Class hosting the functions under test
    pub target_class: String,
    /// Imports added to every unit
    pub imports: Vec<String>,
    pub unmatched_calls: UnmatchedCallPolicy,
    /// Print each input value before the call
    pub echo_inputs: bool,
}

impl Default for AtcConfig {
    fn default() -> Self {
        Self {
            namespace: "atcgen.generated".to_string(),
            unit_name: "GeneratedATCs".to_string(),
            target_class: "Helper".to_string(),
            imports: vec!["org.junit.Test".to_string(), "java.util.*".to_string()],
            unmatched_calls: UnmatchedCallPolicy::default(),
            echo_inputs: false,
        }
    }
}

impl AtcConfig {
    pub fn with_unit_name(mut self, name: impl Into<String>) -> Self {
        self.unit_name = name.into();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_unmatched_calls(mut self, policy: UnmatchedCallPolicy) -> Self {
        self.unmatched_calls = policy;
        self
    }

    pub fn with_echo_inputs(mut self, echo: bool) -> Self {
        self.echo_inputs = echo;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AtcConfig::default();
        assert_eq!(config.target_class, "Helper");
        assert_eq!(config.unmatched_calls, UnmatchedCallPolicy::Error);
        assert!(!config.echo_inputs);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AtcConfig = toml::from_str(
            r#"
            unit_name = "BankATCs"
            unmatched_calls = "skip"
            "#,
        )
        .unwrap();
        assert_eq!(config.unit_name, "BankATCs");
        assert_eq!(config.unmatched_calls, UnmatchedCallPolicy::Skip);
        assert_eq!(config.namespace, "atcgen.generated");
        assert_eq!(config.imports.len(), 2);
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        assert!(toml::from_str::<AtcConfig>("unmatched_calls = \"ignore\"\n").is_err());
    }

    #[test]
    fn test_setters_override_loaded_values() {
        let config: AtcConfig = toml::from_str("unit_name = \"FromFile\"\n").unwrap();
        let config = config
            .with_unit_name("FromFlag")
            .with_namespace("bank")
            .with_echo_inputs(true);
        assert_eq!(config.unit_name, "FromFlag");
        assert_eq!(config.namespace, "bank");
        assert!(config.echo_inputs);
    }
}
