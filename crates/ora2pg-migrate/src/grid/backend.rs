//! Persistence seam for the mapping grid.
//!
//! The grid never talks HTTP directly. It works with `Arc<dyn MappingBackend>`;
//! [`crate::api::ApiClient`] is the production implementation and
//! [`super::MemoryBackend`] keeps everything in process.

use async_trait::async_trait;

use crate::core::{ConnectionConfig, SourceTable, TableMapping};
use crate::error::Result;

/// Where table mappings are persisted and source tables come from.
///
/// Implementations must be `Send + Sync` so one backend can serve several
/// grids.
#[async_trait]
pub trait MappingBackend: Send + Sync {
    /// Persist the full mapping list of a project.
    ///
    /// Returns the mappings as stored. The grid adopts this response as the
    /// new local state.
    async fn save_table_mappings(
        &self,
        project_id: &str,
        mappings: &[TableMapping],
    ) -> Result<Vec<TableMapping>>;

    /// List the tables of an Oracle schema.
    ///
    /// `name_filter` is an SQL `LIKE` pattern such as `TRADE_%`.
    async fn discover_tables(
        &self,
        connection: &ConnectionConfig,
        schema: &str,
        name_filter: Option<&str>,
    ) -> Result<Vec<SourceTable>>;

    /// Produce default mappings for the given source tables.
    async fn auto_map(
        &self,
        source_tables: &[SourceTable],
        target_schema: &str,
    ) -> Result<Vec<TableMapping>>;

    /// Backend name for logs.
    fn backend_type(&self) -> &'static str;
}
