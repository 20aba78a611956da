//! Runtime configuration.
//!
//! The member names and the optional-parameter prefix are a contract with
//! the code generator; the defaults match what generated code emits.

use crate::runtime::arity::DEFAULT_OPTIONAL_PREFIX;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse runtime config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid runtime config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Formals whose name starts with this prefix may be omitted.
    pub optional_param_prefix: String,
    pub members: MemberNames,
    /// Emit a trace event for every dynamic dispatch.
    pub trace_dispatch: bool,
}

/// Member names consulted by the dispatch protocol.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MemberNames {
    /// Fallback looked up on non-function values that are invoked.
    pub call: String,
    pub index_get: String,
    pub index_set: String,
    pub equality: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            optional_param_prefix: DEFAULT_OPTIONAL_PREFIX.to_string(),
            members: MemberNames::default(),
            trace_dispatch: false,
        }
    }
}

impl Default for MemberNames {
    fn default() -> Self {
        Self {
            call: "call".to_string(),
            index_get: "get".to_string(),
            index_set: "set".to_string(),
            equality: "==".to_string(),
        }
    }
}

impl RuntimeConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.optional_param_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "optional_param_prefix must not be empty".to_string(),
            ));
        }
        let members = [
            ("members.call", &self.members.call),
            ("members.index_get", &self.members.index_get),
            ("members.index_set", &self.members.index_set),
            ("members.equality", &self.members.equality),
        ];
        for (key, value) in members {
            if value.is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", key)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = RuntimeConfig::from_toml_str("").unwrap();
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.optional_param_prefix, "opt$");
        assert_eq!(config.members.equality, "==");
    }

    #[test]
    fn test_partial_override() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            optional_param_prefix = "_"
            trace_dispatch = true

            [members]
            index_get = "at"
            "#,
        )
        .unwrap();
        assert_eq!(config.optional_param_prefix, "_");
        assert!(config.trace_dispatch);
        assert_eq!(config.members.index_get, "at");
        assert_eq!(config.members.index_set, "set");
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(matches!(
            RuntimeConfig::from_toml_str("stack_traces = true"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_empty_prefix_rejected() {
        assert!(matches!(
            RuntimeConfig::from_toml_str("optional_param_prefix = \"\""),
            Err(ConfigError::Invalid(_))
        ));
    }
}
