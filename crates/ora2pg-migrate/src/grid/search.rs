//! Search and pagination over table mappings.

use crate::core::TableMapping;

pub const DEFAULT_PER_PAGE: usize = 50;

/// Tables whose names or any column name contain `search`, case-insensitively.
///
/// Matches source and target schema, table, and `schema.table`, plus every
/// source and target column name. A match on a single column keeps the whole
/// table. An empty search returns everything.
pub fn filter_mappings<'a>(mappings: &'a [TableMapping], search: &str) -> Vec<&'a TableMapping> {
    let needle = search.trim().to_lowercase();
    if needle.is_empty() {
        return mappings.iter().collect();
    }
    mappings.iter().filter(|m| matches(m, &needle)).collect()
}

fn matches(mapping: &TableMapping, needle: &str) -> bool {
    let hit = |s: &str| s.to_lowercase().contains(needle);

    hit(&mapping.source_schema)
        || hit(&mapping.source_table)
        || hit(&mapping.source_full_name())
        || hit(&mapping.target_schema)
        || hit(&mapping.target_table)
        || hit(&mapping.target_full_name())
        || mapping
            .column_mappings
            .iter()
            .any(|c| hit(&c.source_column) || hit(&c.target_column))
}

/// Number of pages needed for `total` rows; at least 1.
pub fn total_pages(total: usize, per_page: usize) -> usize {
    let per_page = per_page.max(1);
    total.div_ceil(per_page).max(1)
}

/// One 1-based page of `items`. Out-of-range pages are empty.
pub fn page<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    let per_page = per_page.max(1);
    let start = page.saturating_sub(1).saturating_mul(per_page);
    if page == 0 || start >= items.len() {
        return &[];
    }
    let end = (start + per_page).min(items.len());
    &items[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ColumnMapping;

    fn mapping(schema: &str, table: &str, columns: &[&str]) -> TableMapping {
        let mut m = TableMapping::new(
            format!("{}.{}", schema, table),
            schema,
            table,
            "public",
            table.to_lowercase(),
        );
        m.column_mappings = columns
            .iter()
            .map(|c| ColumnMapping {
                id: format!("{}.{}", table, c),
                source_column: c.to_string(),
                source_data_type: "VARCHAR2".into(),
                source_data_length: None,
                source_data_precision: None,
                source_data_scale: None,
                target_column: c.to_lowercase(),
                target_data_type: "TEXT".into(),
                target_data_length: None,
                target_data_precision: None,
                target_data_scale: None,
                nullable: true,
                is_primary_key: false,
                is_foreign_key: false,
                transformation: None,
            })
            .collect();
        m
    }

    #[test]
    fn test_filter_by_table_and_schema() {
        let data = vec![
            mapping("HR", "EMPLOYEES", &["ID"]),
            mapping("SALES", "ORDERS", &["ID"]),
        ];
        assert_eq!(filter_mappings(&data, "").len(), 2);
        assert_eq!(filter_mappings(&data, "emp")[0].source_table, "EMPLOYEES");
        assert_eq!(filter_mappings(&data, "sales.ord").len(), 1);
        assert_eq!(filter_mappings(&data, "public.orders").len(), 1);
        assert_eq!(filter_mappings(&data, "PUBLIC").len(), 2);
        assert!(filter_mappings(&data, "nothing").is_empty());
    }

    #[test]
    fn test_column_only_match_includes_table() {
        let data = vec![
            mapping("HR", "EMPLOYEES", &["ID", "EMAIL_ADDRESS"]),
            mapping("HR", "DEPARTMENTS", &["ID", "NAME"]),
        ];
        let hits = filter_mappings(&data, "email");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].column_mappings.len(), 2);
    }

    #[test]
    fn test_pagination() {
        let items: Vec<usize> = (0..120).collect();
        assert_eq!(total_pages(items.len(), DEFAULT_PER_PAGE), 3);
        assert_eq!(total_pages(0, DEFAULT_PER_PAGE), 1);
        assert_eq!(total_pages(100, 50), 2);
        assert_eq!(page(&items, 1, 50).len(), 50);
        assert_eq!(page(&items, 3, 50), &items[100..120]);
        assert!(page(&items, 4, 50).is_empty());
        assert!(page(&items, 0, 50).is_empty());
        assert_eq!(page(&items, 2, 0), &[1]);
    }
}
