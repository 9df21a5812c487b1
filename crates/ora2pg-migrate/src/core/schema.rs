//! Table and column mapping types shared by the grid, the DDL generator, and
//! the REST client.
//!
//! Field names serialize in camelCase to match the migration server's JSON.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{MigrateError, Result};
use crate::typemap::{format_data_type, parse_data_type};

/// Lifecycle status of a table mapping.
///
/// Any local edit of a table or its columns sets `mapped`, whatever the prior
/// status. `migrated` and `error` are only ever set by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingStatus {
    #[default]
    Pending,
    Mapped,
    Migrated,
    Error,
}

impl MappingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MappingStatus::Pending => "pending",
            MappingStatus::Mapped => "mapped",
            MappingStatus::Migrated => "migrated",
            MappingStatus::Error => "error",
        }
    }
}

/// One Oracle table mapped to one PostgreSQL table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMapping {
    pub id: String,
    pub source_schema: String,
    pub source_table: String,
    pub target_schema: String,
    pub target_table: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub status: MappingStatus,
    #[serde(default)]
    pub column_mappings: Vec<ColumnMapping>,

    /// WHERE clause applied to the source rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_condition: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop_before_insert: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncate_before_insert: Option<bool>,
}

fn default_true() -> bool {
    true
}

impl TableMapping {
    /// Create an enabled, pending mapping with no columns.
    pub fn new(
        id: impl Into<String>,
        source_schema: impl Into<String>,
        source_table: impl Into<String>,
        target_schema: impl Into<String>,
        target_table: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_schema: source_schema.into(),
            source_table: source_table.into(),
            target_schema: target_schema.into(),
            target_table: target_table.into(),
            enabled: true,
            status: MappingStatus::Pending,
            column_mappings: Vec::new(),
            filter_condition: None,
            drop_before_insert: None,
            truncate_before_insert: None,
        }
    }

    /// `SCHEMA.TABLE` on the Oracle side.
    pub fn source_full_name(&self) -> String {
        format!("{}.{}", self.source_schema, self.source_table)
    }

    /// `schema.table` on the PostgreSQL side.
    pub fn target_full_name(&self) -> String {
        format!("{}.{}", self.target_schema, self.target_table)
    }

    pub fn drops_before_insert(&self) -> bool {
        self.drop_before_insert.unwrap_or(false)
    }

    pub fn truncates_before_insert(&self) -> bool {
        self.truncate_before_insert.unwrap_or(false)
    }

    pub fn column(&self, column_id: &str) -> Option<&ColumnMapping> {
        self.column_mappings.iter().find(|c| c.id == column_id)
    }

    pub fn column_mut(&mut self, column_id: &str) -> Option<&mut ColumnMapping> {
        self.column_mappings.iter_mut().find(|c| c.id == column_id)
    }

    /// Primary key columns in column order.
    pub fn primary_key(&self) -> impl Iterator<Item = &ColumnMapping> {
        self.column_mappings.iter().filter(|c| c.is_primary_key)
    }

    /// Check the invariants a mapping must hold before it is persisted.
    pub fn validate(&self) -> Result<()> {
        if self.drops_before_insert() && self.truncates_before_insert() {
            return Err(MigrateError::invalid_mapping(
                &self.id,
                "dropBeforeInsert and truncateBeforeInsert are mutually exclusive",
            ));
        }
        if self.target_table.trim().is_empty() {
            return Err(MigrateError::invalid_mapping(&self.id, "target table is empty"));
        }
        for column in &self.column_mappings {
            if column.target_column.trim().is_empty() {
                return Err(MigrateError::invalid_mapping(
                    &self.id,
                    format!("column {} has an empty target name", column.source_column),
                ));
            }
        }
        Ok(())
    }
}

/// One Oracle column mapped to one PostgreSQL column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    pub id: String,
    pub source_column: String,
    pub source_data_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_data_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_data_precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_data_scale: Option<u32>,
    pub target_column: String,
    pub target_data_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_data_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_data_precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_data_scale: Option<u32>,
    #[serde(default = "default_true")]
    pub nullable: bool,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub is_foreign_key: bool,
    /// SQL expression applied to the source value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformation: Option<String>,
}

impl ColumnMapping {
    /// Set the target type from its editable parts.
    ///
    /// The type string is re-rendered so it always agrees with the four
    /// target fields.
    pub fn set_target_type(
        &mut self,
        base_type: &str,
        length: Option<u32>,
        precision: Option<u32>,
        scale: Option<u32>,
    ) {
        self.target_data_type = format_data_type(base_type, length, precision, scale);
        self.sync_target_params();
    }

    /// Re-derive length/precision/scale from the target type string.
    pub fn sync_target_params(&mut self) {
        let parsed = parse_data_type(&self.target_data_type);
        let (length, precision, scale) = match parsed.base_type.as_str() {
            "VARCHAR" | "CHAR" | "TIMESTAMP" => (parsed.length, None, None),
            "NUMERIC" => (None, parsed.precision, parsed.scale),
            _ => (None, None, None),
        };
        self.target_data_length = length;
        self.target_data_precision = precision;
        self.target_data_scale = scale;
    }

    /// Apply a partial update.
    pub fn apply(&mut self, patch: &ColumnPatch) {
        if let Some(v) = &patch.target_column {
            self.target_column = v.clone();
        }
        if let Some(v) = &patch.target_data_type {
            self.target_data_type = v.clone();
        }
        if let Some(v) = patch.target_data_length {
            self.target_data_length = v;
        }
        if let Some(v) = patch.target_data_precision {
            self.target_data_precision = v;
        }
        if let Some(v) = patch.target_data_scale {
            self.target_data_scale = v;
        }
        if let Some(v) = patch.nullable {
            self.nullable = v;
        }
        if let Some(v) = &patch.transformation {
            self.transformation = v.clone();
        }
    }
}

/// Partial column update. `None` leaves the field untouched; for optional
/// fields `Some(None)` clears the value.
///
/// In JSON a missing field is `None` and an explicit `null` is `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_data_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_data_length: Option<Option<u32>>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_data_precision: Option<Option<u32>>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_data_scale: Option<Option<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub transformation: Option<Option<String>>,
}

/// Only called for fields present in the input, so `null` becomes `Some(None)`.
fn present<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ColumnPatch {
    pub fn target_column(name: impl Into<String>) -> Self {
        Self {
            target_column: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// A table as reported by the server's Oracle discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceTable {
    pub table_name: String,
    pub schema: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<i64>,
    #[serde(default)]
    pub columns: Vec<SourceColumn>,
}

/// A column as reported by the server's Oracle discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceColumn {
    pub column_name: String,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_scale: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_primary_key: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_foreign_key: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl SourceColumn {
    /// Oracle type, `VARCHAR` when the catalog did not report one.
    pub fn data_type_or_default(&self) -> &str {
        self.data_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or("VARCHAR")
    }
}

impl From<&TableMapping> for SourceTable {
    /// Rebuild the source description a mapping was created from.
    fn from(mapping: &TableMapping) -> Self {
        Self {
            table_name: mapping.source_table.clone(),
            schema: mapping.source_schema.clone(),
            row_count: None,
            columns: mapping
                .column_mappings
                .iter()
                .map(|c| SourceColumn {
                    column_name: c.source_column.clone(),
                    data_type: Some(c.source_data_type.clone()),
                    data_length: c.source_data_length,
                    data_precision: c.source_data_precision,
                    data_scale: c.source_data_scale,
                    nullable: Some(c.nullable),
                    is_primary_key: Some(c.is_primary_key),
                    is_foreign_key: Some(c.is_foreign_key),
                    default_value: None,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, target_type: &str) -> ColumnMapping {
        ColumnMapping {
            id: format!("EMP.{}", name),
            source_column: name.to_string(),
            source_data_type: "VARCHAR2".into(),
            source_data_length: Some(20),
            source_data_precision: None,
            source_data_scale: None,
            target_column: name.to_lowercase(),
            target_data_type: target_type.to_string(),
            target_data_length: None,
            target_data_precision: None,
            target_data_scale: None,
            nullable: true,
            is_primary_key: false,
            is_foreign_key: false,
            transformation: None,
        }
    }

    #[test]
    fn test_patch_null_clears_missing_keeps() {
        let patch: ColumnPatch = serde_json::from_str(
            r#"{"targetDataType": "NUMERIC(12)", "targetDataLength": null, "targetDataPrecision": 12}"#,
        )
        .unwrap();
        assert_eq!(patch.target_data_length, Some(None));
        assert_eq!(patch.target_data_precision, Some(Some(12)));
        assert_eq!(patch.target_data_scale, None);
        assert_eq!(patch.transformation, None);

        let mut col = column("SAL", "VARCHAR(40)");
        col.target_data_length = Some(40);
        col.target_data_scale = Some(2);
        col.apply(&patch);
        assert_eq!(col.target_data_type, "NUMERIC(12)");
        assert_eq!(col.target_data_length, None);
        assert_eq!(col.target_data_precision, Some(12));
        assert_eq!(col.target_data_scale, Some(2));

        let json = serde_json::to_value(&patch).unwrap();
        assert!(json["targetDataLength"].is_null());
        assert!(json.get("targetDataScale").is_none());
    }

    #[test]
    fn test_source_column_without_type_defaults_to_varchar() {
        let col: SourceColumn = serde_json::from_str(r#"{"columnName": "NOTES"}"#).unwrap();
        assert_eq!(col.data_type_or_default(), "VARCHAR");
        let col: SourceColumn =
            serde_json::from_str(r#"{"columnName": "NOTES", "dataType": ""}"#).unwrap();
        assert_eq!(col.data_type_or_default(), "VARCHAR");
    }

    #[test]
    fn test_validate_drop_truncate_exclusive() {
        let mut mapping = TableMapping::new("HR.EMP", "HR", "EMP", "public", "emp");
        assert!(mapping.validate().is_ok());

        mapping.drop_before_insert = Some(true);
        mapping.truncate_before_insert = Some(true);
        let err = mapping.validate().unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"));

        mapping.truncate_before_insert = Some(false);
        assert!(mapping.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_target_names() {
        let mut mapping = TableMapping::new("HR.EMP", "HR", "EMP", "public", " ");
        assert!(mapping.validate().is_err());

        mapping.target_table = "emp".into();
        let mut col = column("NAME", "TEXT");
        col.target_column = String::new();
        mapping.column_mappings.push(col);
        assert!(mapping.validate().is_err());
    }

    #[test]
    fn test_set_target_type_keeps_fields_in_sync() {
        let mut col = column("SALARY", "TEXT");
        col.set_target_type("NUMERIC", None, Some(12), Some(2));
        assert_eq!(col.target_data_type, "NUMERIC(12,2)");
        assert_eq!(col.target_data_precision, Some(12));
        assert_eq!(col.target_data_scale, Some(2));
        assert_eq!(col.target_data_length, None);

        col.set_target_type("VARCHAR", Some(0), None, None);
        assert_eq!(col.target_data_type, "TEXT");
        assert_eq!(col.target_data_precision, None);
        assert_eq!(col.target_data_length, None);
    }

    #[test]
    fn test_apply_patch() {
        let mut col = column("EMAIL", "VARCHAR(20)");
        col.transformation = Some("LOWER(EMAIL)".into());
        let patch = ColumnPatch {
            target_column: Some("email_address".into()),
            nullable: Some(false),
            transformation: Some(None),
            ..Default::default()
        };
        col.apply(&patch);
        assert_eq!(col.target_column, "email_address");
        assert!(!col.nullable);
        assert_eq!(col.transformation, None);
        assert_eq!(col.target_data_type, "VARCHAR(20)");
        assert!(ColumnPatch::default().is_empty());
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let mut mapping = TableMapping::new("HR.EMP", "HR", "EMP", "public", "emp");
        mapping.column_mappings.push(column("ID", "NUMERIC(10)"));
        let json = serde_json::to_value(&mapping).unwrap();
        assert_eq!(json["sourceSchema"], "HR");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["columnMappings"][0]["targetDataType"], "NUMERIC(10)");
        assert!(json.get("dropBeforeInsert").is_none());

        let back: TableMapping = serde_json::from_value(json).unwrap();
        assert_eq!(back, mapping);
    }

    #[test]
    fn test_deserialize_server_defaults() {
        let json = r#"{"id":"HR.EMP","sourceSchema":"HR","sourceTable":"EMP",
            "targetSchema":"public","targetTable":"emp","status":"migrated"}"#;
        let mapping: TableMapping = serde_json::from_str(json).unwrap();
        assert!(mapping.enabled);
        assert_eq!(mapping.status, MappingStatus::Migrated);
        assert!(mapping.column_mappings.is_empty());
    }

    #[test]
    fn test_source_table_from_mapping() {
        let mut mapping = TableMapping::new("HR.EMP", "HR", "EMP", "public", "emp");
        let mut col = column("ID", "NUMERIC(10)");
        col.is_primary_key = true;
        mapping.column_mappings.push(col);
        let source = SourceTable::from(&mapping);
        assert_eq!(source.table_name, "EMP");
        assert_eq!(source.columns[0].is_primary_key, Some(true));
        assert_eq!(source.columns[0].data_length, Some(20));
    }
}
