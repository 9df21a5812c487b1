//! Schema objects and the Oracle catalog metadata they are generated from.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of a generated schema object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaObjectKind {
    Table,
    Index,
    Constraint,
    Sequence,
    View,
    Function,
    Procedure,
    Trigger,
    #[serde(other)]
    Other,
}

impl SchemaObjectKind {
    /// Label used in export comments.
    pub fn label(&self) -> &'static str {
        match self {
            SchemaObjectKind::Table => "Table",
            SchemaObjectKind::Index => "Index",
            SchemaObjectKind::Constraint => "Constraint",
            SchemaObjectKind::Sequence => "Sequence",
            SchemaObjectKind::View => "View",
            SchemaObjectKind::Function => "Function",
            SchemaObjectKind::Procedure => "Procedure",
            SchemaObjectKind::Trigger => "Trigger",
            SchemaObjectKind::Other => "Object",
        }
    }
}

impl fmt::Display for SchemaObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Generation status of a schema object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectStatus {
    #[default]
    Pending,
    Generated,
    Applied,
    Error,
}

/// A generated PostgreSQL object with the conversion issues found on the way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaObject {
    pub name: String,
    /// Oracle schema the object came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(rename = "type")]
    pub kind: SchemaObjectKind,
    #[serde(default)]
    pub status: ObjectStatus,
    #[serde(default)]
    pub ddl: String,
    #[serde(default)]
    pub issues: Vec<String>,
    /// Original Oracle definition, kept for views.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ddl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_schema: Option<String>,
}

impl SchemaObject {
    pub fn new(name: impl Into<String>, kind: SchemaObjectKind, ddl: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            kind,
            status: ObjectStatus::Pending,
            ddl: ddl.into(),
            issues: Vec::new(),
            source_ddl: None,
            target_schema: None,
        }
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

/// Oracle index metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexInfo {
    pub index_name: String,
    pub table_name: String,
    #[serde(default)]
    pub table_schema: Option<String>,
    /// `NORMAL`, `UNIQUE`, `BITMAP`, `FUNCTION-BASED NORMAL`, ...
    #[serde(default)]
    pub index_type: Option<String>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub expressions: Vec<String>,
    #[serde(default)]
    pub tablespace: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl IndexInfo {
    pub fn is_bitmap(&self) -> bool {
        self.index_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("BITMAP"))
    }

    pub fn is_function_based(&self) -> bool {
        self.index_type
            .as_deref()
            .is_some_and(|t| t.contains("FUNCTION"))
    }
}

/// Oracle constraint metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintInfo {
    pub constraint_name: String,
    pub table_name: String,
    #[serde(default)]
    pub table_schema: Option<String>,
    /// `PRIMARY KEY`, `FOREIGN KEY`, `UNIQUE`, `CHECK`, `NOT NULL`.
    pub constraint_type: String,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub referenced_table: Option<String>,
    #[serde(default)]
    pub referenced_schema: Option<String>,
    #[serde(default)]
    pub referenced_columns: Vec<String>,
    #[serde(default)]
    pub check_condition: Option<String>,
    #[serde(default)]
    pub delete_rule: Option<String>,
    #[serde(default)]
    pub update_rule: Option<String>,
    /// `ENABLED` or `DISABLED`.
    #[serde(default)]
    pub status: Option<String>,
}

/// Oracle sequence metadata.
///
/// Bounds are decimals: Oracle's default MAXVALUE has 28 digits and does not
/// fit in an `i64`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceInfo {
    pub sequence_name: String,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub min_value: Option<Decimal>,
    #[serde(default)]
    pub max_value: Option<Decimal>,
    #[serde(default)]
    pub increment_by: Option<Decimal>,
    #[serde(default)]
    pub start_with: Option<Decimal>,
    #[serde(default)]
    pub cycle: Option<bool>,
    #[serde(default)]
    pub order: Option<bool>,
    #[serde(default)]
    pub cache_size: Option<Decimal>,
    #[serde(default)]
    pub last_number: Option<Decimal>,
}

/// Oracle view metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewInfo {
    pub view_name: String,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub view_definition: Option<String>,
    #[serde(default)]
    pub read_only: Option<bool>,
    #[serde(default)]
    pub check_option: Option<bool>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Catalog metadata for one Oracle schema, as fed to DDL generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaCatalog {
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub indexes: Vec<IndexInfo>,
    #[serde(default)]
    pub constraints: Vec<ConstraintInfo>,
    #[serde(default)]
    pub sequences: Vec<SequenceInfo>,
    #[serde(default)]
    pub views: Vec<ViewInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_object_wire_format() {
        let json = r#"{"name":"EMP_SEQ","schema":"HR","type":"sequence","status":"generated",
            "ddl":"CREATE SEQUENCE public.\"EMP_SEQ\" NO CACHE;","issues":[]}"#;
        let obj: SchemaObject = serde_json::from_str(json).unwrap();
        assert_eq!(obj.kind, SchemaObjectKind::Sequence);
        assert_eq!(obj.status, ObjectStatus::Generated);
        assert!(!obj.has_issues());

        let back = serde_json::to_value(&obj).unwrap();
        assert_eq!(back["type"], "sequence");
        assert!(back.get("sourceDdl").is_none());
    }

    #[test]
    fn test_unknown_kind_is_other() {
        let json = r#"{"name":"X","type":"synonym","ddl":""}"#;
        let obj: SchemaObject = serde_json::from_str(json).unwrap();
        assert_eq!(obj.kind, SchemaObjectKind::Other);
        assert_eq!(obj.status, ObjectStatus::Pending);
    }

    #[test]
    fn test_index_type_checks() {
        let mut index = IndexInfo {
            index_name: "IX".into(),
            table_name: "T".into(),
            index_type: Some("bitmap".into()),
            ..Default::default()
        };
        assert!(index.is_bitmap());
        assert!(!index.is_function_based());
        index.index_type = Some("FUNCTION-BASED NORMAL".into());
        assert!(index.is_function_based());
    }

    #[test]
    fn test_sequence_decimals_parse_from_strings() {
        let json = r#"{"sequenceName":"S","maxValue":"9999999999999999999999999999",
            "startWith":1,"cacheSize":20}"#;
        let seq: SequenceInfo = serde_json::from_str(json).unwrap();
        assert_eq!(
            seq.max_value.unwrap().to_string(),
            "9999999999999999999999999999"
        );
        assert_eq!(seq.start_with, Some(Decimal::ONE));
    }
}
