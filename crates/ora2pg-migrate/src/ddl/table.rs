//! CREATE TABLE statements from table mappings.

use super::objects::{ObjectStatus, SchemaObject, SchemaObjectKind};
use crate::core::{qualify_pg, quote_list, quote_pg, TableMapping};
use crate::error::Result;

/// Render the target table of a mapping.
///
/// Columns keep mapping order. Non-nullable columns get `NOT NULL`; primary
/// key columns are collected into one table-level `PRIMARY KEY` clause.
pub fn table_ddl(mapping: &TableMapping) -> Result<String> {
    mapping.validate()?;

    let mut lines: Vec<String> = mapping
        .column_mappings
        .iter()
        .map(|c| {
            let mut line = format!("    {} {}", quote_pg(&c.target_column), c.target_data_type);
            if !c.nullable {
                line.push_str(" NOT NULL");
            }
            line
        })
        .collect();

    let pk: Vec<&str> = mapping
        .primary_key()
        .map(|c| c.target_column.as_str())
        .collect();
    if !pk.is_empty() {
        lines.push(format!("    PRIMARY KEY ({})", quote_list(&pk)));
    }

    Ok(format!(
        "CREATE TABLE {} (\n{}\n);",
        qualify_pg(&mapping.target_schema, &mapping.target_table),
        lines.join(",\n")
    ))
}

/// [`table_ddl`] wrapped as a schema object.
pub fn table_object(mapping: &TableMapping) -> Result<SchemaObject> {
    Ok(SchemaObject {
        name: mapping.target_table.clone(),
        schema: Some(mapping.source_schema.clone()),
        kind: SchemaObjectKind::Table,
        status: ObjectStatus::Generated,
        ddl: table_ddl(mapping)?,
        issues: Vec::new(),
        source_ddl: None,
        target_schema: Some(mapping.target_schema.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ColumnMapping;

    fn column(name: &str, target_type: &str, nullable: bool, pk: bool) -> ColumnMapping {
        ColumnMapping {
            id: name.into(),
            source_column: name.to_uppercase(),
            source_data_type: "NUMBER".into(),
            source_data_length: None,
            source_data_precision: None,
            source_data_scale: None,
            target_column: name.into(),
            target_data_type: target_type.into(),
            target_data_length: None,
            target_data_precision: None,
            target_data_scale: None,
            nullable,
            is_primary_key: pk,
            is_foreign_key: false,
            transformation: None,
        }
    }

    #[test]
    fn test_table_ddl() {
        let mut mapping = TableMapping::new("HR.EMP", "HR", "EMP", "hr", "employees");
        mapping.column_mappings = vec![
            column("id", "NUMERIC(10)", false, true),
            column("name", "VARCHAR(50)", true, false),
        ];
        assert_eq!(
            table_ddl(&mapping).unwrap(),
            "CREATE TABLE hr.\"employees\" (\n    \"id\" NUMERIC(10) NOT NULL,\n    \
             \"name\" VARCHAR(50),\n    PRIMARY KEY (\"id\")\n);"
        );
    }

    #[test]
    fn test_table_ddl_composite_key_and_invalid_mapping() {
        let mut mapping = TableMapping::new("HR.JH", "HR", "JOB_HISTORY", "public", "job_history");
        mapping.column_mappings = vec![
            column("employee_id", "NUMERIC(6)", false, true),
            column("start_date", "TIMESTAMP", false, true),
        ];
        let ddl = table_ddl(&mapping).unwrap();
        assert!(ddl.contains("PRIMARY KEY (\"employee_id\", \"start_date\")"));

        let obj = table_object(&mapping).unwrap();
        assert_eq!(obj.kind, SchemaObjectKind::Table);
        assert_eq!(obj.name, "job_history");

        mapping.drop_before_insert = Some(true);
        mapping.truncate_before_insert = Some(true);
        assert!(table_ddl(&mapping).is_err());
    }
}
