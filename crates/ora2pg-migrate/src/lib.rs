//! # ora2pg-migrate
//!
//! Client-side core of an Oracle to PostgreSQL migration console.
//!
//! This library provides:
//!
//! - **Type mapping** from Oracle column types to PostgreSQL, with custom rules
//! - **Mapping grid** editing with optimistic persistence and rollback
//! - **DDL generation** for tables, indexes, constraints, sequences and views
//! - **REST client** for the migration server, with a persisted session
//! - **Progress polling** for running migrations
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ora2pg_migrate::{ApiClient, Config, MappingGrid, Session};
//!
//! #[tokio::main]
//! async fn main() -> ora2pg_migrate::Result<()> {
//!     let config = Config::load("ora2pg.yaml")?;
//!     let session = Arc::new(Session::hydrate("ora2pg-session.json"));
//!     let api = Arc::new(ApiClient::new(&config.api, session)?);
//!
//!     let project = api.get_project("p-1").await?;
//!     let mut grid = MappingGrid::new(
//!         project.id.clone(),
//!         project.target_schema().to_string(),
//!         project.table_mappings.clone(),
//!         api,
//!     );
//!     grid.set_all_enabled().await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod core;
pub mod ddl;
pub mod error;
pub mod grid;
pub mod naming;
pub mod progress;
pub mod session;
pub mod typemap;

// Re-exports for convenient access
pub use api::{ApiClient, MigrationProgress, MigrationStatus};
pub use config::{ApiConfig, Config, MappingConfig, SessionConfig};
pub use core::{ColumnMapping, ColumnPatch, Project, SourceTable, TableMapping};
pub use ddl::{assemble_export, ExportOptions, SchemaObject, SchemaObjectKind};
pub use error::{MigrateError, Result};
pub use grid::{MappingBackend, MappingGrid, MemoryBackend, SyncState};
pub use naming::NamingStrategy;
pub use progress::{poll_progress, ProgressSource};
pub use session::{Session, User};
pub use typemap::{map_data_type, TypeResolver};
