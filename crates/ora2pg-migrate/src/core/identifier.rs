//! PostgreSQL identifier quoting for generated DDL.
//!
//! Oracle catalog names are upper-case and may arrive already quoted. Embedded
//! double quotes are stripped rather than escaped, so a name quoted by the
//! catalog and the same name unquoted render identically.

use crate::error::{MigrateError, Result};

/// PostgreSQL truncates identifiers beyond this many bytes.
pub const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Quote a PostgreSQL identifier.
///
/// ```ignore
/// assert_eq!(quote_pg("EMPLOYEES"), "\"EMPLOYEES\"");
/// assert_eq!(quote_pg("\"EMP\""), "\"EMP\"");
/// assert_eq!(quote_pg(""), "\"\"");
/// ```
pub fn quote_pg(name: &str) -> String {
    format!("\"{}\"", name.replace('"', ""))
}

/// `schema."name"`, the qualification used for objects in generated DDL.
///
/// The schema is written as configured so that an unquoted target schema
/// folds to lower case the way PostgreSQL users expect.
pub fn qualify_pg(schema: &str, name: &str) -> String {
    format!("{}.{}", schema, quote_pg(name))
}

/// Quote and comma-join a column list.
pub fn quote_list<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|n| quote_pg(n.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Reject identifiers PostgreSQL would silently mangle.
///
/// Used on user-entered target names before they reach the server.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(MigrateError::Config("Identifier cannot be empty".to_string()));
    }

    if name.contains('\0') {
        return Err(MigrateError::Config(format!(
            "Identifier contains null byte: {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(MigrateError::Config(format!(
            "Identifier exceeds PostgreSQL limit of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(())
}
