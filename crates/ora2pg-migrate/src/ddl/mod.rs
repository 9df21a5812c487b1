//! DDL generation and export.
//!
//! - [`objects`]: schema objects and Oracle catalog metadata
//! - [`generate`]: index, constraint, sequence and view DDL
//! - [`table`]: CREATE TABLE from a table mapping
//! - [`export`]: assembly of objects into one ordered script

pub mod convert;
pub mod export;
pub mod generate;
pub mod objects;
pub mod table;

pub use convert::{convert_check_condition, convert_view_sql};
pub use export::{assemble_export, ExportOptions};
pub use generate::{
    constraint_ddl, constraint_object, generate_schema_objects, index_ddl, index_object,
    sequence_ddl, sequence_object, view_ddl, view_object,
};
pub use objects::{
    ConstraintInfo, IndexInfo, ObjectStatus, SchemaCatalog, SchemaObject, SchemaObjectKind,
    SequenceInfo, ViewInfo,
};
pub use table::{table_ddl, table_object};
