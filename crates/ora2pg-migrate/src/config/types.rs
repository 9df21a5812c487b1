//! Configuration type definitions.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ddl::ExportOptions;
use crate::naming::NamingStrategy;
use crate::typemap::UnmappedTypePolicy;

/// Environment variable that overrides `api.base_url`.
pub const API_URL_ENV: &str = "ORA2PG_API_URL";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Migration server connection.
    #[serde(default)]
    pub api: ApiConfig,

    /// Where the login session is persisted.
    #[serde(default)]
    pub session: SessionConfig,

    /// Auto-mapping behavior.
    #[serde(default)]
    pub mapping: MappingConfig,

    /// Which object kinds go into exported DDL scripts.
    #[serde(default)]
    pub export: ExportOptions,
}

/// Migration server connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL including the `/api` prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Session persistence settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session file. Defaults to `ora2pg-session.json` next to the config.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Auto-mapping settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingConfig {
    /// Target schema used when a mapping request leaves it blank.
    #[serde(default = "default_target_schema")]
    pub default_target_schema: String,

    /// How target column names are derived.
    #[serde(default)]
    pub naming_strategy: NamingStrategy,

    /// What to do with Oracle types no rule covers.
    #[serde(default)]
    pub unmapped_type_policy: UnmappedTypePolicy,

    /// JSON file with custom type mapping rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_rules_file: Option<PathBuf>,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            default_target_schema: default_target_schema(),
            naming_strategy: NamingStrategy::default(),
            unmapped_type_policy: UnmappedTypePolicy::default(),
            custom_rules_file: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8090/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_target_schema() -> String {
    "public".to_string()
}
