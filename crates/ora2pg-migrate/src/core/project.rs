//! Projects and database connection settings as stored by the server.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::schema::TableMapping;

/// Which side of the migration a connection describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    Oracle,
    Postgresql,
}

impl DatabaseType {
    pub fn default_port(&self) -> u16 {
        match self {
            DatabaseType::Oracle => 1521,
            DatabaseType::Postgresql => 5432,
        }
    }

    /// Path segment used by the save-connection endpoint.
    pub fn side(&self) -> &'static str {
        match self {
            DatabaseType::Oracle => "source",
            DatabaseType::Postgresql => "target",
        }
    }
}

/// Connection settings for one database.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    #[serde(rename = "type")]
    pub db_type: DatabaseType,
    pub host: String,
    pub port: u16,
    pub database: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_connected: Option<bool>,
}

impl ConnectionConfig {
    pub fn new(
        db_type: DatabaseType,
        host: impl Into<String>,
        database: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            db_type,
            host: host.into(),
            port: db_type.default_port(),
            database: database.into(),
            schema: None,
            username: username.into(),
            password: None,
            connection_string: None,
            is_connected: None,
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("db_type", &self.db_type)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("connection_string", &self.connection_string)
            .field("is_connected", &self.is_connected)
            .finish()
    }
}

/// Project lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Draft,
    Configured,
    Running,
    Completed,
    Error,
}

/// A migration project: two connections plus the table mappings between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_connection: Option<ConnectionConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_connection: Option<ConnectionConfig>,
    #[serde(default)]
    pub table_mappings: Vec<TableMapping>,
    #[serde(default)]
    pub status: ProjectStatus,
}

impl Project {
    /// Oracle schema configured on the source connection.
    pub fn source_schema(&self) -> Option<&str> {
        self.source_connection
            .as_ref()
            .and_then(|c| c.schema.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// Target schema, `public` when the target connection names none.
    pub fn target_schema(&self) -> &str {
        self.target_connection
            .as_ref()
            .and_then(|c| c.schema.as_deref())
            .filter(|s| !s.is_empty())
            .unwrap_or("public")
    }
}

/// Body for project create/update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDraft {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
