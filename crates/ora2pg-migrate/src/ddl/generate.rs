//! PostgreSQL DDL for objects discovered in an Oracle schema.

use rust_decimal::prelude::ToPrimitive;
use tracing::debug;

use super::convert::{
    constraint_issues, convert_check_condition, convert_delete_rule, convert_view_sql,
    index_issues, view_issues,
};
use super::objects::{
    ConstraintInfo, IndexInfo, ObjectStatus, SchemaCatalog, SchemaObject, SchemaObjectKind,
    SequenceInfo, ViewInfo,
};
use crate::core::{qualify_pg, quote_list, quote_pg};

/// `CREATE [UNIQUE] INDEX`, preceded by a warning comment for bitmap indexes.
pub fn index_ddl(index: &IndexInfo, target_schema: &str) -> String {
    let mut ddl = String::new();
    if index.is_bitmap() {
        ddl.push_str(
            "-- WARNING: Bitmap index converted to B-tree (PostgreSQL doesn't support bitmap)\n",
        );
    }
    ddl.push_str(if index.unique {
        "CREATE UNIQUE INDEX "
    } else {
        "CREATE INDEX "
    });
    ddl.push_str(&format!(
        "{} ON {} ({});",
        quote_pg(&index.index_name),
        qualify_pg(target_schema, &index.table_name),
        quote_list(&index.columns)
    ));
    ddl
}

/// `ALTER TABLE ... ADD CONSTRAINT` for PK, FK, UNIQUE and CHECK constraints.
///
/// Returns an empty string for other kinds (Oracle reports NOT NULL as a
/// constraint; it belongs in the column definition instead).
pub fn constraint_ddl(constraint: &ConstraintInfo, target_schema: &str) -> String {
    let head = format!(
        "ALTER TABLE {} ADD CONSTRAINT {}",
        qualify_pg(target_schema, &constraint.table_name),
        quote_pg(&constraint.constraint_name)
    );

    match constraint.constraint_type.as_str() {
        "PRIMARY KEY" => format!("{} PRIMARY KEY ({});", head, quote_list(&constraint.columns)),
        "FOREIGN KEY" => {
            let referenced = constraint.referenced_table.as_deref().unwrap_or_default();
            let mut ddl = format!(
                "{} FOREIGN KEY ({}) REFERENCES {} ({})",
                head,
                quote_list(&constraint.columns),
                qualify_pg(target_schema, referenced),
                quote_list(&constraint.referenced_columns)
            );
            if let Some(rule) = &constraint.delete_rule {
                ddl.push_str(" ON DELETE ");
                ddl.push_str(convert_delete_rule(rule));
            }
            ddl.push(';');
            ddl
        }
        "UNIQUE" => format!("{} UNIQUE ({});", head, quote_list(&constraint.columns)),
        "CHECK" => format!(
            "{} CHECK ({});",
            head,
            convert_check_condition(constraint.check_condition.as_deref().unwrap_or_default())
        ),
        _ => String::new(),
    }
}

/// `CREATE SEQUENCE` carrying Oracle's bounds verbatim.
///
/// PostgreSQL requires CACHE >= 1 and rejects huge values, so Oracle's
/// NOCACHE (0), the default of 1, and anything above `i32::MAX` all render
/// `NO CACHE`.
pub fn sequence_ddl(sequence: &SequenceInfo, target_schema: &str) -> String {
    let mut ddl = format!(
        "CREATE SEQUENCE {}",
        qualify_pg(target_schema, &sequence.sequence_name)
    );

    if let Some(v) = sequence.start_with {
        ddl.push_str(&format!(" START {}", v));
    }
    if let Some(v) = sequence.increment_by {
        ddl.push_str(&format!(" INCREMENT {}", v));
    }
    if let Some(v) = sequence.min_value {
        ddl.push_str(&format!(" MINVALUE {}", v));
    }
    if let Some(v) = sequence.max_value {
        ddl.push_str(&format!(" MAXVALUE {}", v));
    }
    if let Some(cycle) = sequence.cycle {
        ddl.push_str(if cycle { " CYCLE" } else { " NO CYCLE" });
    }

    let cache = sequence
        .cache_size
        .and_then(|c| c.trunc().to_i64())
        .filter(|&c| c > 1 && c <= i64::from(i32::MAX));
    match cache {
        Some(c) => ddl.push_str(&format!(" CACHE {}", c)),
        None => ddl.push_str(" NO CACHE"),
    }

    ddl.push(';');
    ddl
}

/// `CREATE VIEW` over the converted query.
pub fn view_ddl(view: &ViewInfo, target_schema: &str) -> String {
    let converted = convert_view_sql(view.view_definition.as_deref().unwrap_or_default());
    let mut ddl = format!(
        "CREATE VIEW {} AS\n{}",
        qualify_pg(target_schema, &view.view_name),
        converted
    );
    if view.check_option == Some(true) {
        ddl.push_str("\nWITH CHECK OPTION");
    }
    ddl.push(';');
    ddl
}

fn generated(
    name: &str,
    kind: SchemaObjectKind,
    source_schema: Option<&str>,
    target_schema: &str,
    ddl: String,
    issues: Vec<String>,
) -> SchemaObject {
    SchemaObject {
        name: name.to_string(),
        schema: source_schema.map(str::to_string),
        kind,
        status: ObjectStatus::Generated,
        ddl,
        issues,
        source_ddl: None,
        target_schema: Some(target_schema.to_string()),
    }
}

pub fn index_object(index: &IndexInfo, target_schema: &str) -> SchemaObject {
    generated(
        &index.index_name,
        SchemaObjectKind::Index,
        index.table_schema.as_deref(),
        target_schema,
        index_ddl(index, target_schema),
        index_issues(index),
    )
}

pub fn constraint_object(constraint: &ConstraintInfo, target_schema: &str) -> SchemaObject {
    generated(
        &constraint.constraint_name,
        SchemaObjectKind::Constraint,
        constraint.table_schema.as_deref(),
        target_schema,
        constraint_ddl(constraint, target_schema),
        constraint_issues(constraint),
    )
}

pub fn sequence_object(sequence: &SequenceInfo, target_schema: &str) -> SchemaObject {
    generated(
        &sequence.sequence_name,
        SchemaObjectKind::Sequence,
        sequence.schema.as_deref(),
        target_schema,
        sequence_ddl(sequence, target_schema),
        Vec::new(),
    )
}

pub fn view_object(view: &ViewInfo, target_schema: &str) -> SchemaObject {
    let definition = view.view_definition.as_deref().unwrap_or_default();
    let mut object = generated(
        &view.view_name,
        SchemaObjectKind::View,
        view.schema.as_deref(),
        target_schema,
        view_ddl(view, target_schema),
        view_issues(definition),
    );
    object.source_ddl = view.view_definition.clone();
    object
}

/// Generate objects for a whole catalog: indexes, constraints, sequences,
/// then views.
pub fn generate_schema_objects(catalog: &SchemaCatalog, target_schema: &str) -> Vec<SchemaObject> {
    let mut objects = Vec::with_capacity(
        catalog.indexes.len()
            + catalog.constraints.len()
            + catalog.sequences.len()
            + catalog.views.len(),
    );
    objects.extend(catalog.indexes.iter().map(|i| index_object(i, target_schema)));
    objects.extend(
        catalog
            .constraints
            .iter()
            .map(|c| constraint_object(c, target_schema))
            .filter(|o| !o.ddl.is_empty()),
    );
    objects.extend(catalog.sequences.iter().map(|s| sequence_object(s, target_schema)));
    objects.extend(catalog.views.iter().map(|v| view_object(v, target_schema)));

    debug!(
        "Generated {} schema object(s) for target schema {}",
        objects.len(),
        target_schema
    );
    objects
}
