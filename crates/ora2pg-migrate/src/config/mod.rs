//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{MigrateError, Result};
use crate::typemap::{DataTypeMappingRule, RuleSet, TypeResolver};

/// Session file name used when `session.path` is not set.
pub const DEFAULT_SESSION_FILE: &str = "ora2pg-session.json";

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    ///
    /// `ORA2PG_API_URL`, when set and non-empty, replaces `api.base_url`
    /// before validation.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut config: Config = serde_yaml::from_str(yaml)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Compute a SHA256 hash of the configuration.
    pub fn hash(&self) -> String {
        let yaml = serde_yaml::to_string(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(yaml.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Serialize to YAML, as written by `init`.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            let url = url.trim();
            if !url.is_empty() {
                debug!("Using {} from {}", url, API_URL_ENV);
                self.api.base_url = url.to_string();
            }
        }
    }

    /// Session file location; relative paths resolve against `config_dir`.
    pub fn session_path(&self, config_dir: &Path) -> PathBuf {
        match &self.session.path {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => config_dir.join(p),
            None => config_dir.join(DEFAULT_SESSION_FILE),
        }
    }

    /// Build the type resolver from the mapping section, loading custom
    /// rules from `custom_rules_file` when set.
    pub fn type_resolver(&self) -> Result<TypeResolver> {
        let rules = match &self.mapping.custom_rules_file {
            Some(path) => RuleSet::new().with_custom(load_rules_file(path)?)?,
            None => RuleSet::new(),
        };
        Ok(TypeResolver::new(rules, self.mapping.unmapped_type_policy))
    }
}

/// Read a JSON array of mapping rules.
pub fn load_rules_file(path: &Path) -> Result<Vec<DataTypeMappingRule>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        MigrateError::Config(format!("Cannot read rules file {}: {}", path.display(), e))
    })?;
    let rules: Vec<DataTypeMappingRule> = serde_json::from_str(&content)?;
    debug!("Loaded {} custom rules from {}", rules.len(), path.display());
    Ok(rules)
}
