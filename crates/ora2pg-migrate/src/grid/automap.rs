//! Building table mappings from discovered Oracle tables.

use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::{ColumnMapping, MappingStatus, SourceColumn, SourceTable, TableMapping};
use crate::error::{MigrateError, Result};
use crate::naming::NamingStrategy;
use crate::typemap::{map_data_type, TypeResolver};

/// Reshape discovery results into pending mappings.
///
/// Ids are deterministic (`SCHEMA.TABLE` for tables, `TABLE.COLUMN` for
/// columns) so rediscovering a schema yields the same rows. Target names are
/// the lower-cased source names and types come from [`map_data_type`].
pub fn mappings_from_discovery(tables: &[SourceTable], target_schema: &str) -> Vec<TableMapping> {
    tables
        .iter()
        .map(|table| {
            let mut mapping = TableMapping::new(
                format!("{}.{}", table.schema, table.table_name),
                &table.schema,
                &table.table_name,
                target_schema,
                table.table_name.to_lowercase(),
            );
            mapping.column_mappings = table
                .columns
                .iter()
                .map(|col| {
                    let target_type = map_data_type(
                        col.data_type_or_default(),
                        positive(col.data_length),
                        positive(col.data_precision),
                        positive(col.data_scale),
                    );
                    column_mapping(
                        format!("{}.{}", table.table_name, col.column_name),
                        col,
                        col.column_name.to_lowercase(),
                        target_type,
                    )
                })
                .collect();
            mapping
        })
        .collect()
}

/// Map source tables locally with a rule-aware resolver and a naming strategy.
///
/// Produces the same shape the server's auto-map returns: fresh UUID ids,
/// lower-cased target table names, and target type parameters extracted from
/// the resolved type string.
pub fn auto_map_tables(
    tables: &[SourceTable],
    target_schema: &str,
    resolver: &TypeResolver,
    naming: NamingStrategy,
) -> Result<Vec<TableMapping>> {
    let target_schema = if target_schema.trim().is_empty() {
        "public"
    } else {
        target_schema
    };

    let mut mappings = Vec::with_capacity(tables.len());
    for table in tables {
        let mut mapping = TableMapping::new(
            Uuid::new_v4().to_string(),
            &table.schema,
            &table.table_name,
            target_schema,
            table.table_name.to_lowercase(),
        );

        for col in &table.columns {
            let resolved = resolver
                .resolve(
                    col.data_type_or_default(),
                    positive(col.data_length),
                    positive(col.data_precision),
                    positive(col.data_scale),
                )
                .map_err(|e| match e {
                    MigrateError::UnmappedType(oracle_type) => MigrateError::invalid_mapping(
                        mapping.source_full_name(),
                        format!(
                            "column {} has unmapped Oracle type '{}'",
                            col.column_name, oracle_type
                        ),
                    ),
                    other => other,
                })?;
            if let Some(warning) = &resolved.warning {
                warn!("{}.{}: {}", table.table_name, col.column_name, warning);
            }
            mapping.column_mappings.push(column_mapping(
                Uuid::new_v4().to_string(),
                col,
                naming.apply(&col.column_name),
                resolved.target_type,
            ));
        }

        debug!(
            "Auto-mapped {} -> {} ({} columns)",
            mapping.source_full_name(),
            mapping.target_full_name(),
            mapping.column_mappings.len()
        );
        mappings.push(mapping);
    }
    Ok(mappings)
}

fn column_mapping(
    id: String,
    col: &SourceColumn,
    target_column: String,
    target_type: String,
) -> ColumnMapping {
    let mut column = ColumnMapping {
        id,
        source_column: col.column_name.clone(),
        source_data_type: col.data_type_or_default().to_string(),
        source_data_length: positive(col.data_length),
        source_data_precision: positive(col.data_precision),
        source_data_scale: positive(col.data_scale),
        target_column,
        target_data_type: target_type,
        target_data_length: None,
        target_data_precision: None,
        target_data_scale: None,
        nullable: col.nullable != Some(false),
        is_primary_key: col.is_primary_key.unwrap_or(false),
        is_foreign_key: col.is_foreign_key.unwrap_or(false),
        transformation: None,
    };
    column.sync_target_params();
    column
}

// The catalog reports 0 for "not applicable".
fn positive(n: Option<u32>) -> Option<u32> {
    n.filter(|&v| v > 0)
}

/// True when every mapping is still in its initial state.
pub fn all_pending(mappings: &[TableMapping]) -> bool {
    mappings.iter().all(|m| m.status == MappingStatus::Pending)
}
