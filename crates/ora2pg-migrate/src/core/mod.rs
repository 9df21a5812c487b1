//! Core mapping types.
//!
//! - [`schema`]: table and column mappings plus the discovered source tables
//! - [`project`]: projects and connection settings
//! - [`identifier`]: PostgreSQL identifier quoting for generated DDL

pub mod identifier;
pub mod project;
pub mod schema;

pub use identifier::{qualify_pg, quote_list, quote_pg, validate_identifier};
pub use project::{ConnectionConfig, DatabaseType, Project, ProjectDraft, ProjectStatus};
pub use schema::{
    ColumnMapping, ColumnPatch, MappingStatus, SourceColumn, SourceTable, TableMapping,
};
