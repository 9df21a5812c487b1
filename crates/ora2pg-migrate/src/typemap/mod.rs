//! Type mapping between Oracle and PostgreSQL.

mod datatype;
mod rules;

pub use datatype::{format_data_type, parse_data_type, DataType, ParsedDataType};
pub use rules::{default_rules, DataTypeMappingRule, RuleSet};

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{MigrateError, Result};

const FALLBACK_TYPE: &str = "TEXT";

/// Built-in rules shared by every [`map_data_type`] call.
static DEFAULT_RULES: LazyLock<RuleSet> = LazyLock::new(RuleSet::new);

/// Map an Oracle data type to PostgreSQL using the built-in rules.
///
/// Explicit `length`/`precision`/`scale` win over parameters embedded in the
/// type string. Types with no rule map to `TEXT`.
pub fn map_data_type(
    oracle_type: &str,
    length: Option<u32>,
    precision: Option<u32>,
    scale: Option<u32>,
) -> String {
    let upper = oracle_type.trim().to_uppercase();
    if upper.is_empty() {
        return FALLBACK_TYPE.to_string();
    }
    let (base, params) = split_base(&upper);

    resolve_parameterized(base, params, length, precision, scale)
        .or_else(|| DEFAULT_RULES.lookup(&upper).map(|r| r.postgres_type.clone()))
        .unwrap_or_else(|| FALLBACK_TYPE.to_string())
}

/// Split `NAME(...)...` into `NAME` and the remainder starting at `(`.
fn split_base(upper: &str) -> (&str, Option<&str>) {
    match upper.find('(') {
        Some(i) => (upper[..i].trim_end(), Some(&upper[i..])),
        None => (upper, None),
    }
}

/// Families whose PostgreSQL spelling carries the Oracle type parameters.
fn resolve_parameterized(
    base: &str,
    params: Option<&str>,
    length: Option<u32>,
    precision: Option<u32>,
    scale: Option<u32>,
) -> Option<String> {
    let length = length.filter(|&n| n > 0);
    let precision = precision.filter(|&n| n > 0);
    let scale = scale.filter(|&n| n > 0);

    let mapped = match base {
        "VARCHAR2" | "NVARCHAR2" => match (length, params) {
            (Some(n), _) => format!("VARCHAR({})", n),
            (None, Some(p)) => format!("VARCHAR{}", p),
            (None, None) => "TEXT".to_string(),
        },
        "NUMBER" => match (precision, scale, params) {
            (Some(p), Some(s), _) => format!("NUMERIC({},{})", p, s),
            (Some(p), None, _) => format!("NUMERIC({})", p),
            (None, _, Some(p)) => format!("NUMERIC{}", p),
            (None, _, None) => "NUMERIC".to_string(),
        },
        "CHAR" | "NCHAR" => match (length, params) {
            (Some(n), _) => format!("CHAR({})", n),
            (None, Some(p)) => format!("CHAR{}", p),
            (None, None) => "CHAR(1)".to_string(),
        },
        b if b.starts_with("TIMESTAMP") => match params {
            Some(p) => format!("TIMESTAMP{}", p),
            None => "TIMESTAMP".to_string(),
        },
        _ => return None,
    };
    Some(mapped)
}

/// Render an Oracle source descriptor for display, e.g. `NUMBER(10,2)`.
///
/// Strings that already carry parameters are returned unchanged.
pub fn format_source_data_type(
    data_type: &str,
    length: Option<u32>,
    precision: Option<u32>,
    scale: Option<u32>,
) -> String {
    if data_type.is_empty() {
        return String::new();
    }
    let upper = data_type.trim().to_uppercase();
    if upper.contains('(') {
        return data_type.to_string();
    }

    let length = length.filter(|&n| n > 0);
    let precision = precision.filter(|&n| n > 0);
    let scale = scale.filter(|&n| n > 0);
    let base = upper.as_str();

    match base {
        "VARCHAR2" | "NVARCHAR2" | "VARCHAR" | "CHAR" | "NCHAR" => match length {
            Some(n) => format!("{}({})", base, n),
            None => base.to_string(),
        },
        "NUMBER" | "NUMERIC" => match (precision, scale) {
            (Some(p), Some(s)) => format!("{}({},{})", base, p, s),
            (Some(p), None) => format!("{}({})", base, p),
            _ => base.to_string(),
        },
        // Oracle reports fractional-second precision in the scale column.
        b if b.starts_with("TIMESTAMP") || b == "DATE" => {
            match scale.or(length).or(precision) {
                Some(n) => format!("TIMESTAMP({})", n),
                None => base.to_string(),
            }
        }
        _ => data_type.to_string(),
    }
}

/// Result of mapping a type from source to target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMapping {
    /// Target type string (e.g., "VARCHAR(255)", "NUMERIC(10,2)").
    pub target_type: String,
    /// Whether this mapping loses data or precision.
    pub is_lossy: bool,
    /// Warning message for lossy mappings.
    pub warning: Option<String>,
    /// Transformation hint carried by the matching rule.
    pub hint: Option<String>,
}

impl TypeMapping {
    /// Create a lossless type mapping.
    pub fn lossless(target_type: impl Into<String>) -> Self {
        Self {
            target_type: target_type.into(),
            is_lossy: false,
            warning: None,
            hint: None,
        }
    }

    /// Create a lossy type mapping with a warning.
    pub fn lossy(target_type: impl Into<String>, warning: impl Into<String>) -> Self {
        Self {
            target_type: target_type.into(),
            is_lossy: true,
            warning: Some(warning.into()),
            hint: None,
        }
    }

    fn with_hint(mut self, hint: Option<String>) -> Self {
        self.hint = hint;
        self
    }
}

/// What to do with an Oracle type no rule covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmappedTypePolicy {
    /// Map to `TEXT` and flag the mapping as lossy.
    #[default]
    Text,
    /// Fail with [`MigrateError::UnmappedType`].
    Error,
}

/// Rule-aware resolver used by auto-mapping.
///
/// Resolution order: a custom rule matching the type, then the parameterized
/// families (VARCHAR2, NUMBER, CHAR, TIMESTAMP), then the rule table, then the
/// unmapped-type policy.
#[derive(Debug, Clone, Default)]
pub struct TypeResolver {
    rules: RuleSet,
    policy: UnmappedTypePolicy,
}

impl TypeResolver {
    pub fn new(rules: RuleSet, policy: UnmappedTypePolicy) -> Self {
        Self { rules, policy }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut RuleSet {
        &mut self.rules
    }

    pub fn policy(&self) -> UnmappedTypePolicy {
        self.policy
    }

    /// Resolve an Oracle column type.
    pub fn resolve(
        &self,
        oracle_type: &str,
        length: Option<u32>,
        precision: Option<u32>,
        scale: Option<u32>,
    ) -> Result<TypeMapping> {
        let upper = oracle_type.trim().to_uppercase();
        if upper.is_empty() {
            return self.unmapped(oracle_type);
        }
        let (base, params) = split_base(&upper);

        if let Some(rule) = self.rules.lookup_custom(&upper, base) {
            return Ok(TypeMapping::lossless(rule.postgres_type.clone())
                .with_hint(rule.transformation_hint.clone()));
        }

        if let Some(mapped) = resolve_parameterized(base, params, length, precision, scale) {
            return Ok(TypeMapping::lossless(mapped));
        }

        match self.rules.lookup(&upper) {
            Some(rule) => Ok(TypeMapping::lossless(rule.postgres_type.clone())
                .with_hint(rule.transformation_hint.clone())),
            None => self.unmapped(oracle_type),
        }
    }

    fn unmapped(&self, oracle_type: &str) -> Result<TypeMapping> {
        match self.policy {
            UnmappedTypePolicy::Text => {
                warn!("No mapping rule for Oracle type '{}', falling back to TEXT", oracle_type);
                Ok(TypeMapping::lossy(
                    FALLBACK_TYPE,
                    format!("Oracle type '{}' has no mapping rule; stored as TEXT", oracle_type),
                ))
            }
            UnmappedTypePolicy::Error => Err(MigrateError::UnmappedType(oracle_type.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varchar2_types() {
        assert_eq!(map_data_type("VARCHAR2", Some(50), None, None), "VARCHAR(50)");
        assert_eq!(map_data_type("VARCHAR2", None, None, None), "TEXT");
        assert_eq!(map_data_type("nvarchar2", Some(10), None, None), "VARCHAR(10)");
        assert_eq!(map_data_type("VARCHAR2(40)", None, None, None), "VARCHAR(40)");
        assert_eq!(map_data_type("VARCHAR2", Some(0), None, None), "TEXT");
    }

    #[test]
    fn test_number_types() {
        assert_eq!(map_data_type("NUMBER", None, Some(10), Some(2)), "NUMERIC(10,2)");
        assert_eq!(map_data_type("NUMBER", None, Some(10), None), "NUMERIC(10)");
        assert_eq!(map_data_type("NUMBER", None, Some(10), Some(0)), "NUMERIC(10)");
        assert_eq!(map_data_type("NUMBER", None, None, None), "NUMERIC");
        assert_eq!(map_data_type("NUMBER(8,3)", None, None, None), "NUMERIC(8,3)");
    }

    #[test]
    fn test_char_types() {
        assert_eq!(map_data_type("CHAR", Some(3), None, None), "CHAR(3)");
        assert_eq!(map_data_type("NCHAR", None, None, None), "CHAR(1)");
        assert_eq!(map_data_type("CHAR(2)", None, None, None), "CHAR(2)");
    }

    #[test]
    fn test_timestamp_types() {
        assert_eq!(map_data_type("TIMESTAMP(6)", None, None, None), "TIMESTAMP(6)");
        assert_eq!(map_data_type("TIMESTAMP", None, None, Some(6)), "TIMESTAMP");
        assert_eq!(
            map_data_type("TIMESTAMP WITH LOCAL TIME ZONE", None, None, None),
            "TIMESTAMP"
        );
    }

    #[test]
    fn test_table_types() {
        assert_eq!(map_data_type("DATE", None, None, None), "TIMESTAMP");
        assert_eq!(map_data_type("clob", None, None, None), "TEXT");
        assert_eq!(map_data_type("BLOB", None, None, None), "BYTEA");
        assert_eq!(map_data_type("RAW(16)", None, None, None), "BYTEA");
        assert_eq!(map_data_type("LONG RAW", None, None, None), "BYTEA");
        assert_eq!(map_data_type("BINARY_DOUBLE", None, None, None), "DOUBLE PRECISION");
        assert_eq!(map_data_type("ROWID", None, None, None), "VARCHAR(18)");
        assert_eq!(map_data_type("XMLTYPE", None, None, None), "XML");
    }

    #[test]
    fn test_unknown_type_falls_back_to_text() {
        assert_eq!(map_data_type("ANYDATA", None, None, None), "TEXT");
        assert_eq!(map_data_type("", None, None, None), "TEXT");
        assert_eq!(map_data_type("   ", Some(5), None, None), "TEXT");
    }

    #[test]
    fn test_plain_default_rules_map_through_shared_table() {
        let families = ["VARCHAR2", "NVARCHAR2", "NUMBER", "CHAR", "NCHAR"];
        let plain = DEFAULT_RULES.defaults().into_iter().filter(|r| {
            let base = r.base_name();
            !r.oracle_type.contains('(')
                && !families.contains(&base.as_str())
                && !base.starts_with("TIMESTAMP")
        });
        let mut checked = 0;
        for rule in plain {
            assert_eq!(
                map_data_type(&rule.oracle_type, None, None, None),
                rule.postgres_type,
                "{}",
                rule.oracle_type
            );
            checked += 1;
        }
        assert!(checked > 10);
    }

    #[test]
    fn test_format_source_data_type() {
        assert_eq!(format_source_data_type("VARCHAR2", Some(50), None, None), "VARCHAR2(50)");
        assert_eq!(format_source_data_type("NUMBER", None, Some(10), Some(2)), "NUMBER(10,2)");
        assert_eq!(format_source_data_type("NUMBER", None, None, None), "NUMBER");
        assert_eq!(format_source_data_type("TIMESTAMP", Some(11), None, Some(6)), "TIMESTAMP(6)");
        assert_eq!(format_source_data_type("CHAR(1)", Some(5), None, None), "CHAR(1)");
        assert_eq!(format_source_data_type("BLOB", Some(4000), None, None), "BLOB");
        assert_eq!(format_source_data_type("", None, None, None), "");
    }

    #[test]
    fn test_resolver_flags_fallback_as_lossy() {
        let resolver = TypeResolver::default();
        let mapping = resolver.resolve("ANYDATA", None, None, None).unwrap();
        assert_eq!(mapping.target_type, "TEXT");
        assert!(mapping.is_lossy);
        assert!(mapping.warning.unwrap().contains("ANYDATA"));

        let mapping = resolver.resolve("DATE", None, None, None).unwrap();
        assert!(!mapping.is_lossy);
        assert_eq!(mapping.hint.as_deref(), Some("Oracle DATE includes time component"));
    }

    #[test]
    fn test_resolver_error_policy() {
        let resolver = TypeResolver::new(RuleSet::new(), UnmappedTypePolicy::Error);
        let err = resolver.resolve("ANYDATA", None, None, None).unwrap_err();
        assert!(matches!(err, MigrateError::UnmappedType(t) if t == "ANYDATA"));
        assert!(resolver.resolve("NUMBER", None, Some(5), None).is_ok());
    }

    #[test]
    fn test_resolver_custom_rule_wins() {
        let rules = RuleSet::new()
            .with_custom(vec![DataTypeMappingRule::new("NUMBER", "BIGINT", "ids")])
            .unwrap();
        let resolver = TypeResolver::new(rules, UnmappedTypePolicy::Text);
        let mapping = resolver.resolve("NUMBER", None, Some(19), None).unwrap();
        assert_eq!(mapping.target_type, "BIGINT");
        // Families without a custom rule still carry their parameters.
        let mapping = resolver.resolve("VARCHAR2", Some(30), None, None).unwrap();
        assert_eq!(mapping.target_type, "VARCHAR(30)");
    }

    #[test]
    fn test_resolver_agrees_with_map_data_type() {
        let resolver = TypeResolver::default();
        for (t, l, p, s) in [
            ("VARCHAR2", Some(20), None, None),
            ("NUMBER", None, Some(12), Some(4)),
            ("CHAR", None, None, None),
            ("TIMESTAMP(3)", None, None, None),
            ("NCLOB", None, None, None),
            ("SDO_GEOMETRY", None, None, None),
        ] {
            assert_eq!(
                resolver.resolve(t, l, p, s).unwrap().target_type,
                map_data_type(t, l, p, s)
            );
        }
    }
}
