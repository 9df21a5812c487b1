//! Mapping grid controller.
//!
//! [`MappingGrid`] owns the table mappings of one project and applies user
//! edits to them. Every mutation follows the same cycle:
//!
//! 1. snapshot the rows being changed
//! 2. apply the edit locally and enter [`SyncState::Pending`]
//! 3. persist the full list through the [`MappingBackend`]
//! 4. on success adopt the server's response ([`SyncState::Confirmed`]); on
//!    failure restore the snapshot ([`SyncState::Rejected`]) and return the
//!    error
//!
//! Mutations take `&mut self`, so at most one save is in flight per grid.

mod automap;
mod backend;
mod memory;
mod search;

pub use automap::{all_pending, auto_map_tables, mappings_from_discovery};
pub use backend::MappingBackend;
pub use memory::{like_matches, MemoryBackend};
pub use search::{filter_mappings, page, total_pages, DEFAULT_PER_PAGE};

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::core::{
    validate_identifier, ColumnPatch, ConnectionConfig, MappingStatus, SourceTable, TableMapping,
};
use crate::error::{MigrateError, Result};

/// Outcome of the most recent persistence attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    /// Nothing has been saved yet.
    #[default]
    Idle,
    /// A local edit is applied and waiting for the backend.
    Pending,
    /// The backend accepted the last edit.
    Confirmed,
    /// The backend rejected the last edit and it was rolled back.
    Rejected,
}

/// Editable list of table mappings for one project.
pub struct MappingGrid {
    project_id: String,
    target_schema: String,
    tables: Vec<TableMapping>,
    backend: Arc<dyn MappingBackend>,
    sync: SyncState,
}

impl MappingGrid {
    /// Create a grid over `tables`, persisting through `backend`.
    pub fn new(
        project_id: impl Into<String>,
        target_schema: impl Into<String>,
        tables: Vec<TableMapping>,
        backend: Arc<dyn MappingBackend>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            target_schema: target_schema.into(),
            tables,
            backend,
            sync: SyncState::Idle,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn target_schema(&self) -> &str {
        &self.target_schema
    }

    pub fn tables(&self) -> &[TableMapping] {
        &self.tables
    }

    pub fn table(&self, table_id: &str) -> Option<&TableMapping> {
        self.tables.iter().find(|t| t.id == table_id)
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync
    }

    /// Ids of enabled tables.
    pub fn selected(&self) -> Vec<&str> {
        self.tables
            .iter()
            .filter(|t| t.enabled)
            .map(|t| t.id.as_str())
            .collect()
    }

    pub fn all_enabled(&self) -> bool {
        !self.tables.is_empty() && self.tables.iter().all(|t| t.enabled)
    }

    /// Tables matching `search`; see [`filter_mappings`].
    pub fn filter(&self, search: &str) -> Vec<&TableMapping> {
        filter_mappings(&self.tables, search)
    }

    /// One 1-based page of the tables matching `search`.
    pub fn page(&self, search: &str, page_no: usize, per_page: usize) -> Vec<&TableMapping> {
        let filtered = self.filter(search);
        page(&filtered, page_no, per_page).to_vec()
    }

    /// Page count for the tables matching `search`.
    pub fn total_pages(&self, search: &str, per_page: usize) -> usize {
        total_pages(self.filter(search).len(), per_page)
    }

    /// Flip a table's `enabled` flag.
    pub async fn toggle_table(&mut self, table_id: &str) -> Result<()> {
        self.mutate_table(table_id, |t| {
            t.enabled = !t.enabled;
            Ok(())
        })
        .await
    }

    /// Select-all checkbox: disable everything when all tables are enabled,
    /// otherwise enable everything.
    pub async fn set_all_enabled(&mut self) -> Result<()> {
        let enable = !self.all_enabled();
        let snapshot = self.tables.clone();
        for table in &mut self.tables {
            table.enabled = enable;
        }
        self.persist(snapshot).await
    }

    /// Rename a table's target. The row becomes `mapped`.
    pub async fn update_target_table(
        &mut self,
        table_id: &str,
        new_name: &str,
        new_schema: &str,
    ) -> Result<()> {
        validate_identifier(new_name)?;
        validate_identifier(new_schema)?;
        self.mutate_table(table_id, |t| {
            t.target_table = new_name.to_string();
            t.target_schema = new_schema.to_string();
            t.status = MappingStatus::Mapped;
            Ok(())
        })
        .await
    }

    /// Merge a partial column update. The row becomes `mapped`.
    pub async fn update_column_mapping(
        &mut self,
        table_id: &str,
        column_id: &str,
        patch: &ColumnPatch,
    ) -> Result<()> {
        if let Some(name) = &patch.target_column {
            validate_identifier(name)?;
        }
        self.mutate_table(table_id, |t| {
            let column = t
                .column_mut(column_id)
                .ok_or_else(|| MigrateError::not_found("column", column_id))?;
            column.apply(patch);
            t.status = MappingStatus::Mapped;
            Ok(())
        })
        .await
    }

    /// Change a column's target type from its editable parts.
    ///
    /// The type string and the length/precision/scale fields are updated
    /// together so they cannot drift apart.
    pub async fn update_column_type(
        &mut self,
        table_id: &str,
        column_id: &str,
        base_type: &str,
        length: Option<u32>,
        precision: Option<u32>,
        scale: Option<u32>,
    ) -> Result<()> {
        self.mutate_table(table_id, |t| {
            let column = t
                .column_mut(column_id)
                .ok_or_else(|| MigrateError::not_found("column", column_id))?;
            column.set_target_type(base_type, length, precision, scale);
            t.status = MappingStatus::Mapped;
            Ok(())
        })
        .await
    }

    /// Setting drop-before-insert clears truncate-before-insert.
    pub async fn set_drop_before_insert(&mut self, table_id: &str, value: bool) -> Result<()> {
        self.mutate_table(table_id, |t| {
            t.drop_before_insert = Some(value);
            if value {
                t.truncate_before_insert = Some(false);
            }
            Ok(())
        })
        .await
    }

    /// Setting truncate-before-insert clears drop-before-insert.
    pub async fn set_truncate_before_insert(&mut self, table_id: &str, value: bool) -> Result<()> {
        self.mutate_table(table_id, |t| {
            t.truncate_before_insert = Some(value);
            if value {
                t.drop_before_insert = Some(false);
            }
            Ok(())
        })
        .await
    }

    /// Set or clear the WHERE clause applied to the source rows.
    pub async fn set_filter_condition(
        &mut self,
        table_id: &str,
        condition: Option<String>,
    ) -> Result<()> {
        let condition = condition.filter(|c| !c.trim().is_empty());
        self.mutate_table(table_id, |t| {
            t.filter_condition = condition;
            Ok(())
        })
        .await
    }

    /// Discover the tables of an Oracle schema and replace the grid with
    /// pending mappings for them.
    pub async fn discover_tables(
        &mut self,
        connection: &ConnectionConfig,
        schema: &str,
        name_filter: Option<&str>,
    ) -> Result<usize> {
        if schema.trim().is_empty() {
            return Err(MigrateError::Config(
                "Source connection has no schema to discover".into(),
            ));
        }
        let discovered = self
            .backend
            .discover_tables(connection, schema, name_filter)
            .await?;
        info!("Discovered {} table(s) in {}", discovered.len(), schema);

        let snapshot = std::mem::replace(
            &mut self.tables,
            mappings_from_discovery(&discovered, &self.target_schema),
        );
        self.persist(snapshot).await?;
        Ok(self.tables.len())
    }

    /// Ask the backend for default mappings of the current source tables and
    /// replace the grid with them.
    pub async fn auto_map(&mut self, target_schema: &str) -> Result<usize> {
        let sources: Vec<SourceTable> = self.tables.iter().map(SourceTable::from).collect();
        if sources.is_empty() {
            return Err(MigrateError::Config(
                "No source tables to map; discover tables first".into(),
            ));
        }
        let mapped = self.backend.auto_map(&sources, target_schema).await?;
        info!("Auto-mapped {} table(s) into {}", mapped.len(), target_schema);

        let snapshot = std::mem::replace(&mut self.tables, mapped);
        self.persist(snapshot).await?;
        Ok(self.tables.len())
    }

    async fn mutate_table<F>(&mut self, table_id: &str, edit: F) -> Result<()>
    where
        F: FnOnce(&mut TableMapping) -> Result<()>,
    {
        let index = self
            .tables
            .iter()
            .position(|t| t.id == table_id)
            .ok_or_else(|| MigrateError::not_found("table", table_id))?;

        let snapshot = self.tables.clone();
        edit(&mut self.tables[index])?;
        if let Err(e) = self.tables[index].validate() {
            self.tables = snapshot;
            return Err(e);
        }
        self.persist(snapshot).await
    }

    async fn persist(&mut self, snapshot: Vec<TableMapping>) -> Result<()> {
        self.sync = SyncState::Pending;
        debug!(
            "Saving {} mapping(s) for project {} via {} backend",
            self.tables.len(),
            self.project_id,
            self.backend.backend_type()
        );

        match self
            .backend
            .save_table_mappings(&self.project_id, &self.tables)
            .await
        {
            Ok(saved) => {
                self.tables = saved;
                self.sync = SyncState::Confirmed;
                Ok(())
            }
            Err(e) => {
                warn!("Failed to save table mappings, reverting: {}", e);
                self.tables = snapshot;
                self.sync = SyncState::Rejected;
                Err(e)
            }
        }
    }
}
