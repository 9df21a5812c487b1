//! Assembly of generated schema objects into one SQL script.

use serde::{Deserialize, Serialize};

use super::objects::{SchemaObject, SchemaObjectKind};

const BANNER_RULE: &str = "-- ============================================================";

/// Which object kinds go into the exported script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub include_sequences: bool,
    pub include_indexes: bool,
    pub include_constraints: bool,
    pub include_views: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_sequences: true,
            include_indexes: true,
            include_constraints: true,
            include_views: true,
        }
    }
}

impl ExportOptions {
    /// Exported kinds in script order, with their inclusion flag.
    fn sections(&self) -> [(SchemaObjectKind, &'static str, bool); 4] {
        [
            (SchemaObjectKind::Sequence, "SEQUENCES", self.include_sequences),
            (SchemaObjectKind::Index, "INDEXES", self.include_indexes),
            (SchemaObjectKind::Constraint, "CONSTRAINTS", self.include_constraints),
            (SchemaObjectKind::View, "VIEWS", self.include_views),
        ]
    }
}

/// Build the export script.
///
/// Sections always appear as sequences, indexes, constraints, views, since
/// later kinds may reference earlier ones. Objects keep their input order
/// inside a section. Tables and other kinds are not exported. Empty or
/// excluded sections produce no output at all.
pub fn assemble_export(objects: &[SchemaObject], options: &ExportOptions) -> String {
    let mut out = String::new();

    for (kind, title, included) in options.sections() {
        if !included {
            continue;
        }
        let section: Vec<&SchemaObject> = objects.iter().filter(|o| o.kind == kind).collect();
        if section.is_empty() {
            continue;
        }

        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(BANNER_RULE);
        out.push('\n');
        out.push_str(&format!("-- {} ({})\n", title, section.len()));
        out.push_str(BANNER_RULE);
        out.push('\n');

        for object in section {
            out.push('\n');
            write_object(&mut out, object);
        }
    }

    out
}

fn write_object(out: &mut String, object: &SchemaObject) {
    out.push_str(&format!("-- {}: {}\n", object.kind.label(), object.name));
    for issue in &object.issues {
        out.push_str(&format!("-- ISSUE: {}\n", issue));
    }
    if object.kind == SchemaObjectKind::View {
        if let Some(source) = object.source_ddl.as_deref().filter(|s| !s.is_empty()) {
            out.push_str("-- Original Oracle DDL:\n");
            for line in source.lines() {
                out.push_str("-- ");
                out.push_str(line);
                out.push('\n');
            }
        }
    }
    out.push_str(&object.ddl);
    if !object.ddl.ends_with('\n') {
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(name: &str, kind: SchemaObjectKind) -> SchemaObject {
        SchemaObject::new(name, kind, format!("-- ddl for {}", name))
    }

    #[test]
    fn test_section_order_ignores_input_order() {
        let objects = vec![
            obj("V1", SchemaObjectKind::View),
            obj("C1", SchemaObjectKind::Constraint),
            obj("T1", SchemaObjectKind::Table),
            obj("I1", SchemaObjectKind::Index),
            obj("S1", SchemaObjectKind::Sequence),
            obj("I2", SchemaObjectKind::Index),
        ];
        let script = assemble_export(&objects, &ExportOptions::default());

        let pos = |needle: &str| script.find(needle).unwrap();
        assert!(pos("-- SEQUENCES") < pos("-- INDEXES"));
        assert!(pos("-- INDEXES") < pos("-- CONSTRAINTS"));
        assert!(pos("-- CONSTRAINTS") < pos("-- VIEWS"));
        assert!(pos("-- Index: I1") < pos("-- Index: I2"));
        assert!(script.contains("-- INDEXES (2)"));
        assert!(!script.contains("T1"));
    }

    #[test]
    fn test_excluded_and_empty_sections_are_skipped() {
        let objects = vec![obj("S1", SchemaObjectKind::Sequence), obj("V1", SchemaObjectKind::View)];
        let options = ExportOptions {
            include_views: false,
            ..Default::default()
        };
        let script = assemble_export(&objects, &options);
        assert!(script.contains("-- SEQUENCES"));
        assert!(!script.contains("VIEWS"));
        assert!(!script.contains("INDEXES"));
        assert_eq!(assemble_export(&[], &ExportOptions::default()), "");
    }

    #[test]
    fn test_object_block_layout() {
        let mut view = SchemaObject::new("EMP_V", SchemaObjectKind::View, "CREATE VIEW x AS\nSELECT 1;");
        view.issues = vec!["Contains DUAL table - removed (not needed in PostgreSQL)".into()];
        view.source_ddl = Some("SELECT 1\nFROM DUAL".into());
        let script = assemble_export(&[view], &ExportOptions::default());
        assert_eq!(
            script,
            format!(
                "{rule}\n-- VIEWS (1)\n{rule}\n\n-- View: EMP_V\n\
                 -- ISSUE: Contains DUAL table - removed (not needed in PostgreSQL)\n\
                 -- Original Oracle DDL:\n-- SELECT 1\n-- FROM DUAL\n\
                 CREATE VIEW x AS\nSELECT 1;\n",
                rule = BANNER_RULE
            )
        );
    }

    #[test]
    fn test_source_ddl_only_for_views() {
        let mut index = obj("I1", SchemaObjectKind::Index);
        index.source_ddl = Some("CREATE INDEX ...".into());
        let script = assemble_export(&[index], &ExportOptions::default());
        assert!(!script.contains("Original Oracle DDL"));
    }
}
