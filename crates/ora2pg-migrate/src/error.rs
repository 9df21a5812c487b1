//! Error types for the mapping library and API client.

use thiserror::Error;

/// Exit code for configuration errors.
pub const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code for API and transport errors.
pub const EXIT_API_ERROR: u8 = 2;
/// Exit code when the server rejected our credentials.
pub const EXIT_AUTH_ERROR: u8 = 3;
/// Exit code for mapping, type, and rule errors.
pub const EXIT_MAPPING_ERROR: u8 = 4;
/// Exit code for file system errors.
pub const EXIT_IO_ERROR: u8 = 7;
/// Exit code after SIGINT/SIGTERM.
pub const EXIT_CANCELLED: u8 = 130;

/// Main error type for mapping and migration-control operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// An Oracle type had no mapping and the resolver is set to reject it.
    #[error("No PostgreSQL mapping for Oracle type '{0}'")]
    UnmappedType(String),

    /// A type string could not be parsed.
    #[error("Invalid data type '{0}'")]
    InvalidType(String),

    /// Data type mapping rule could not be created, updated, or deleted.
    #[error("Mapping rule error: {0}")]
    Rule(String),

    /// A table, column, or rule id was not found.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// A table mapping breaks one of its invariants.
    #[error("Invalid mapping for table {table}: {message}")]
    InvalidMapping { table: String, message: String },

    /// The server answered 401; the local session has been cleared.
    #[error("Authentication required")]
    Unauthorized,

    /// The server answered with a non-success status.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level HTTP failure (connect, timeout, body decode).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Operation was cancelled (SIGINT, etc.)
    #[error("Operation cancelled")]
    Cancelled,
}

impl MigrateError {
    /// Create a NotFound error.
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        MigrateError::NotFound { kind, id: id.into() }
    }

    /// Create an InvalidMapping error.
    pub fn invalid_mapping(table: impl Into<String>, message: impl Into<String>) -> Self {
        MigrateError::InvalidMapping {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            MigrateError::Config(_) | MigrateError::Yaml(_) => EXIT_CONFIG_ERROR,
            MigrateError::Api { .. } | MigrateError::Http(_) | MigrateError::Json(_) => {
                EXIT_API_ERROR
            }
            MigrateError::Unauthorized => EXIT_AUTH_ERROR,
            MigrateError::UnmappedType(_)
            | MigrateError::InvalidType(_)
            | MigrateError::Rule(_)
            | MigrateError::NotFound { .. }
            | MigrateError::InvalidMapping { .. } => EXIT_MAPPING_ERROR,
            MigrateError::Io(_) => EXIT_IO_ERROR,
            MigrateError::Cancelled => EXIT_CANCELLED,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(MigrateError::Config("x".into()).exit_code(), EXIT_CONFIG_ERROR);
        assert_eq!(MigrateError::Unauthorized.exit_code(), EXIT_AUTH_ERROR);
        assert_eq!(
            MigrateError::not_found("table", "HR.EMP").exit_code(),
            EXIT_MAPPING_ERROR
        );
        assert_eq!(MigrateError::Cancelled.exit_code(), EXIT_CANCELLED);
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert_eq!(MigrateError::from(io).exit_code(), EXIT_IO_ERROR);
    }

    #[test]
    fn test_format_detailed_includes_message() {
        let err = MigrateError::Api {
            status: 500,
            message: "boom".into(),
        };
        let text = err.format_detailed();
        assert!(text.starts_with("Error: API error (HTTP 500): boom"));
    }

    #[test]
    fn test_not_found_display() {
        let err = MigrateError::not_found("column", "EMP.EMAIL");
        assert_eq!(err.to_string(), "column not found: EMP.EMAIL");
    }
}
