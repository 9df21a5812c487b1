//! In-process mapping backend.
//!
//! Used by the CLI for offline work on exported mapping files and by tests.
//! Discovery has no Oracle to talk to, so it serves whatever source tables the
//! backend was seeded with.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::warn;

use super::automap::auto_map_tables;
use super::backend::MappingBackend;
use crate::core::{ConnectionConfig, SourceTable, TableMapping};
use crate::error::{MigrateError, Result};
use crate::naming::NamingStrategy;
use crate::typemap::TypeResolver;

/// Backend that keeps mappings in memory.
pub struct MemoryBackend {
    projects: Mutex<HashMap<String, Vec<TableMapping>>>,
    source_tables: Vec<SourceTable>,
    resolver: TypeResolver,
    naming: NamingStrategy,
    warned: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_source_tables(Vec::new())
    }

    /// Backend whose discovery returns `tables`.
    pub fn with_source_tables(tables: Vec<SourceTable>) -> Self {
        Self {
            projects: Mutex::new(HashMap::new()),
            source_tables: tables,
            resolver: TypeResolver::default(),
            naming: NamingStrategy::default(),
            warned: AtomicBool::new(false),
        }
    }

    /// Resolver and naming strategy used by [`MappingBackend::auto_map`].
    pub fn with_resolver(mut self, resolver: TypeResolver, naming: NamingStrategy) -> Self {
        self.resolver = resolver;
        self.naming = naming;
        self
    }

    /// Mappings last saved for `project_id`.
    pub fn saved(&self, project_id: &str) -> Option<Vec<TableMapping>> {
        self.projects
            .lock()
            .ok()
            .and_then(|p| p.get(project_id).cloned())
    }

    fn warn_once(&self) {
        if !self.warned.swap(true, Ordering::SeqCst) {
            warn!(
                "Using in-memory mapping backend: changes are not sent to the migration server."
            );
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MappingBackend for MemoryBackend {
    async fn save_table_mappings(
        &self,
        project_id: &str,
        mappings: &[TableMapping],
    ) -> Result<Vec<TableMapping>> {
        self.warn_once();
        for mapping in mappings {
            mapping.validate()?;
        }
        let mut projects = self
            .projects
            .lock()
            .map_err(|_| MigrateError::Config("mapping store lock poisoned".into()))?;
        projects.insert(project_id.to_string(), mappings.to_vec());
        Ok(mappings.to_vec())
    }

    async fn discover_tables(
        &self,
        _connection: &ConnectionConfig,
        schema: &str,
        name_filter: Option<&str>,
    ) -> Result<Vec<SourceTable>> {
        self.warn_once();
        Ok(self
            .source_tables
            .iter()
            .filter(|t| t.schema.eq_ignore_ascii_case(schema))
            .filter(|t| name_filter.map_or(true, |p| like_matches(p, &t.table_name)))
            .cloned()
            .collect())
    }

    async fn auto_map(
        &self,
        source_tables: &[SourceTable],
        target_schema: &str,
    ) -> Result<Vec<TableMapping>> {
        auto_map_tables(source_tables, target_schema, &self.resolver, self.naming)
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}

/// Case-insensitive SQL `LIKE` with `%` and `_` wildcards.
pub fn like_matches(pattern: &str, value: &str) -> bool {
    let pattern: Vec<char> = pattern.to_uppercase().chars().collect();
    let value: Vec<char> = value.to_uppercase().chars().collect();

    // Classic two-pointer wildcard match with backtracking to the last `%`.
    let (mut p, mut v) = (0, 0);
    let mut star: Option<(usize, usize)> = None;
    while v < value.len() {
        if p < pattern.len() && (pattern[p] == '_' || pattern[p] == value[v]) {
            p += 1;
            v += 1;
        } else if p < pattern.len() && pattern[p] == '%' {
            star = Some((p, v));
            p += 1;
        } else if let Some((sp, sv)) = star {
            p = sp + 1;
            v = sv + 1;
            star = Some((sp, sv + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|&c| c == '%')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DatabaseType;

    fn table(schema: &str, name: &str) -> SourceTable {
        SourceTable {
            table_name: name.into(),
            schema: schema.into(),
            row_count: None,
            columns: Vec::new(),
        }
    }

    #[test]
    fn test_like_matches() {
        assert!(like_matches("TRADE_%", "TRADE_ORDERS"));
        assert!(like_matches("trade%", "TRADES"));
        assert!(!like_matches("TRADE_%", "TRADE"));
        assert!(like_matches("%ORD%", "TRADE_ORDERS"));
        assert!(like_matches("EMP", "emp"));
        assert!(!like_matches("EMP", "EMPLOYEES"));
        assert!(like_matches("%", ""));
    }

    #[tokio::test]
    async fn test_discover_filters_schema_and_pattern() {
        let backend = MemoryBackend::with_source_tables(vec![
            table("HR", "EMPLOYEES"),
            table("HR", "TRADE_LOG"),
            table("SALES", "TRADE_ORDERS"),
        ]);
        let conn = ConnectionConfig::new(DatabaseType::Oracle, "db", "ORCL", "scott");
        let all = backend.discover_tables(&conn, "hr", None).await.unwrap();
        assert_eq!(all.len(), 2);
        let trades = backend
            .discover_tables(&conn, "HR", Some("TRADE%"))
            .await
            .unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].table_name, "TRADE_LOG");
    }

    #[tokio::test]
    async fn test_save_validates_and_stores() {
        let backend = MemoryBackend::new();
        let mut mapping = TableMapping::new("HR.EMP", "HR", "EMP", "public", "emp");
        let saved = backend
            .save_table_mappings("p1", std::slice::from_ref(&mapping))
            .await
            .unwrap();
        assert_eq!(saved, vec![mapping.clone()]);
        assert_eq!(backend.saved("p1").unwrap().len(), 1);

        mapping.drop_before_insert = Some(true);
        mapping.truncate_before_insert = Some(true);
        assert!(backend.save_table_mappings("p1", &[mapping]).await.is_err());
        assert_eq!(backend.backend_type(), "memory");
    }
}
