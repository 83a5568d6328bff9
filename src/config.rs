//! Configuration handling for codecop
//!
//! ```toml
//! [rules]
//! disabled = ["CCS0004"]
//!
//! [rules.severity]
//! CCS0001 = "error"
//!
//! [dead_binding]
//! unused_prefix = "_"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dead_binding::DEFAULT_UNUSED_PREFIX;
use crate::diagnostics::Severity;
use crate::rules::BUILTIN_RULE_IDS;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown rule id '{rule_id}'")]
    UnknownRule { rule_id: String },

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

/// codecop configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Rule selection and severities
    #[serde(default)]
    pub rules: RulesConfig,

    /// Dead-binding detector settings
    #[serde(default)]
    pub dead_binding: DeadBindingConfig,
}

/// Rule selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RulesConfig {
    /// Rule ids to turn off
    #[serde(default)]
    pub disabled: Vec<String>,

    /// Per-rule severity overrides
    #[serde(default)]
    pub severity: BTreeMap<String, Severity>,
}

/// Dead-binding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeadBindingConfig {
    /// Names starting with this prefix are never reported
    #[serde(default = "default_unused_prefix")]
    pub unused_prefix: String,
}

impl Default for DeadBindingConfig {
    fn default() -> Self {
        Self {
            unused_prefix: default_unused_prefix(),
        }
    }
}

fn default_unused_prefix() -> String {
    DEFAULT_UNUSED_PREFIX.to_string()
}

impl Config {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parse and validate configuration text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject unknown rule ids and an empty unused prefix.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ids = self
            .rules
            .disabled
            .iter()
            .chain(self.rules.severity.keys());
        for id in ids {
            if !BUILTIN_RULE_IDS.contains(&id.as_str()) {
                return Err(ConfigError::UnknownRule {
                    rule_id: id.clone(),
                });
            }
        }
        if self.dead_binding.unused_prefix.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "dead_binding.unused_prefix",
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn is_disabled(&self, rule_id: &str) -> bool {
        self.rules.disabled.iter().any(|id| id == rule_id)
    }
}
