//! Configuration validation.

use super::Config;
use crate::core::validate_identifier;
use crate::error::{MigrateError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // API validation
    let base_url = config.api.base_url.trim();
    if base_url.is_empty() {
        return Err(MigrateError::Config("api.base_url is required".into()));
    }
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(MigrateError::Config(format!(
            "api.base_url must start with http:// or https://, got '{}'",
            base_url
        )));
    }
    if config.api.timeout_secs == 0 {
        return Err(MigrateError::Config(
            "api.timeout_secs must be at least 1".into(),
        ));
    }

    // Mapping validation
    validate_identifier(&config.mapping.default_target_schema).map_err(|e| match e {
        MigrateError::Config(msg) => {
            MigrateError::Config(format!("mapping.default_target_schema: {}", msg))
        }
        other => other,
    })?;

    if let Some(path) = &config.session.path {
        if path.as_os_str().is_empty() {
            return Err(MigrateError::Config("session.path must not be empty".into()));
        }
    }

    Ok(())
}
