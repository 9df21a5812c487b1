//! Oracle → PostgreSQL data type mapping rules.
//!
//! The built-in table is immutable. Users layer custom rules on top; a custom
//! rule for the same Oracle type shadows the default.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{MigrateError, Result};

/// One Oracle → PostgreSQL mapping rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTypeMappingRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub oracle_type: String,
    pub postgres_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformation_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_custom: Option<bool>,
}

impl DataTypeMappingRule {
    /// Create a rule without id or custom flag.
    pub fn new(
        oracle_type: impl Into<String>,
        postgres_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            oracle_type: oracle_type.into(),
            postgres_type: postgres_type.into(),
            description: description.into(),
            transformation_hint: None,
            is_custom: None,
        }
    }

    /// Attach a transformation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.transformation_hint = Some(hint.into());
        self
    }

    pub fn is_custom(&self) -> bool {
        self.is_custom.unwrap_or(false)
    }

    /// Oracle type name before any `(`, upper-cased.
    pub fn base_name(&self) -> String {
        let upper = self.oracle_type.to_uppercase();
        match upper.find('(') {
            Some(i) => upper[..i].trim_end().to_string(),
            None => upper,
        }
    }

    /// Match by exact name, or by this rule's base name equal to `base`.
    /// Both arguments must already be upper-cased.
    pub fn matches(&self, upper_type: &str, base: &str) -> bool {
        self.oracle_type.to_uppercase() == upper_type || self.base_name() == base
    }
}

/// The built-in rule table, in lookup order.
pub fn default_rules() -> Vec<DataTypeMappingRule> {
    type R = DataTypeMappingRule;
    vec![
        // Numeric
        R::new("NUMBER", "NUMERIC", "Exact numeric with precision and scale"),
        R::new("NUMBER(p)", "NUMERIC(p)", "Exact numeric with precision"),
        R::new("NUMBER(p,s)", "NUMERIC(p,s)", "Exact numeric with precision and scale"),
        R::new("BINARY_FLOAT", "REAL", "32-bit floating point"),
        R::new("BINARY_DOUBLE", "DOUBLE PRECISION", "64-bit floating point"),
        R::new("FLOAT", "DOUBLE PRECISION", "Floating point number"),
        R::new("INTEGER", "INTEGER", "32-bit integer"),
        R::new("SMALLINT", "SMALLINT", "16-bit integer"),
        // Character
        R::new("VARCHAR2(n)", "VARCHAR(n)", "Variable-length character string"),
        R::new("CHAR(n)", "CHAR(n)", "Fixed-length character string"),
        R::new("NVARCHAR2(n)", "VARCHAR(n)", "Variable-length Unicode string"),
        R::new("NCHAR(n)", "CHAR(n)", "Fixed-length Unicode string"),
        R::new("CLOB", "TEXT", "Large text object"),
        R::new("NCLOB", "TEXT", "Large Unicode text object"),
        R::new("LONG", "TEXT", "Variable-length character data (deprecated)"),
        // Date/time
        R::new("DATE", "TIMESTAMP", "Date and time")
            .with_hint("Oracle DATE includes time component"),
        R::new("TIMESTAMP", "TIMESTAMP", "Timestamp without timezone"),
        R::new("TIMESTAMP WITH TIME ZONE", "TIMESTAMPTZ", "Timestamp with timezone"),
        R::new(
            "TIMESTAMP WITH LOCAL TIME ZONE",
            "TIMESTAMPTZ",
            "Timestamp with local timezone",
        ),
        R::new("INTERVAL YEAR TO MONTH", "INTERVAL", "Year-month interval"),
        R::new("INTERVAL DAY TO SECOND", "INTERVAL", "Day-second interval"),
        // Binary
        R::new("BLOB", "BYTEA", "Binary large object"),
        R::new("RAW(n)", "BYTEA", "Raw binary data"),
        R::new("LONG RAW", "BYTEA", "Variable-length raw binary data (deprecated)"),
        R::new("BFILE", "BYTEA", "External binary file").with_hint("Requires data extraction"),
        // Other
        R::new("ROWID", "VARCHAR(18)", "Row identifier"),
        R::new("UROWID", "VARCHAR(4000)", "Universal row identifier"),
        R::new("XMLTYPE", "XML", "XML data"),
        R::new("SDO_GEOMETRY", "GEOMETRY", "Spatial data").with_hint("Requires PostGIS extension"),
        R::new("BOOLEAN", "BOOLEAN", "Boolean value"),
    ]
}

/// Default rules plus user-defined overrides.
#[derive(Debug, Clone)]
pub struct RuleSet {
    defaults: Vec<DataTypeMappingRule>,
    custom: Vec<DataTypeMappingRule>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleSet {
    /// Rule set containing only the built-in defaults.
    pub fn new() -> Self {
        Self {
            defaults: default_rules(),
            custom: Vec::new(),
        }
    }

    /// Split a server rule listing into defaults and custom rules.
    ///
    /// Falls back to the built-in defaults when the listing carries none.
    pub fn from_rules(rules: Vec<DataTypeMappingRule>) -> Self {
        let (custom, defaults): (Vec<_>, Vec<_>) = rules.into_iter().partition(|r| r.is_custom());
        Self {
            defaults: if defaults.is_empty() { default_rules() } else { defaults },
            custom,
        }
    }

    /// Load custom rules (e.g. from a rules file).
    ///
    /// Rules without an id get one; duplicates by Oracle type are rejected.
    pub fn with_custom(mut self, rules: Vec<DataTypeMappingRule>) -> Result<Self> {
        for rule in rules {
            self.create_custom(rule)?;
        }
        Ok(self)
    }

    /// Built-in rules, sorted by Oracle type.
    pub fn defaults(&self) -> Vec<DataTypeMappingRule> {
        sorted(self.defaults.clone())
    }

    /// Custom rules, sorted by Oracle type.
    pub fn custom(&self) -> Vec<DataTypeMappingRule> {
        sorted(self.custom.clone())
    }

    /// Effective rules: custom rules plus every default not shadowed by one.
    pub fn all(&self) -> Vec<DataTypeMappingRule> {
        let shadowed = |d: &DataTypeMappingRule| {
            self.custom
                .iter()
                .any(|c| c.oracle_type.eq_ignore_ascii_case(&d.oracle_type))
        };
        let mut rules = self.custom.clone();
        rules.extend(self.defaults.iter().filter(|&d| !shadowed(d)).cloned());
        sorted(rules)
    }

    /// Find the rule for an Oracle type. Custom rules win over defaults;
    /// within each group the first match in table order is used.
    pub fn lookup(&self, oracle_type: &str) -> Option<&DataTypeMappingRule> {
        let upper = oracle_type.trim().to_uppercase();
        let base = match upper.find('(') {
            Some(i) => upper[..i].trim_end(),
            None => upper.as_str(),
        };
        self.lookup_custom(&upper, base).or_else(|| {
            self.defaults.iter().find(|r| r.matches(&upper, base))
        })
    }

    pub(crate) fn lookup_custom(&self, upper: &str, base: &str) -> Option<&DataTypeMappingRule> {
        self.custom.iter().find(|r| r.matches(upper, base))
    }

    /// Add a custom rule. Fails if one already exists for the Oracle type.
    pub fn create_custom(&mut self, mut rule: DataTypeMappingRule) -> Result<DataTypeMappingRule> {
        if self.find_custom_by_type(&rule.oracle_type).is_some() {
            return Err(MigrateError::Rule(format!(
                "Mapping rule already exists for Oracle type: {}",
                rule.oracle_type
            )));
        }
        rule.id = Some(rule.id.unwrap_or_else(|| Uuid::new_v4().to_string()));
        rule.is_custom = Some(true);
        debug!(oracle_type = %rule.oracle_type, postgres_type = %rule.postgres_type, "custom rule created");
        self.custom.push(rule.clone());
        Ok(rule)
    }

    /// Replace a custom rule's fields. Defaults cannot be updated.
    pub fn update_custom(
        &mut self,
        id: &str,
        rule: DataTypeMappingRule,
    ) -> Result<DataTypeMappingRule> {
        self.ensure_not_default(id)?;
        if let Some(existing) = self.find_custom_by_type(&rule.oracle_type) {
            if existing.id.as_deref() != Some(id) {
                return Err(MigrateError::Rule(format!(
                    "Mapping rule already exists for Oracle type: {}",
                    rule.oracle_type
                )));
            }
        }

        let entry = self
            .custom
            .iter_mut()
            .find(|r| r.id.as_deref() == Some(id))
            .ok_or_else(|| MigrateError::not_found("mapping rule", id))?;
        entry.oracle_type = rule.oracle_type;
        entry.postgres_type = rule.postgres_type;
        entry.description = rule.description;
        entry.transformation_hint = rule.transformation_hint;
        Ok(entry.clone())
    }

    /// Remove a custom rule. Defaults cannot be deleted.
    pub fn delete_custom(&mut self, id: &str) -> Result<()> {
        self.ensure_not_default(id)?;
        let before = self.custom.len();
        self.custom.retain(|r| r.id.as_deref() != Some(id));
        if self.custom.len() == before {
            return Err(MigrateError::not_found("mapping rule", id));
        }
        Ok(())
    }

    fn ensure_not_default(&self, id: &str) -> Result<()> {
        if self.defaults.iter().any(|r| r.id.as_deref() == Some(id)) {
            return Err(MigrateError::Rule(
                "Cannot modify a system default rule".to_string(),
            ));
        }
        Ok(())
    }

    fn find_custom_by_type(&self, oracle_type: &str) -> Option<&DataTypeMappingRule> {
        self.custom
            .iter()
            .find(|r| r.oracle_type.eq_ignore_ascii_case(oracle_type))
    }
}

fn sorted(mut rules: Vec<DataTypeMappingRule>) -> Vec<DataTypeMappingRule> {
    rules.sort_by(|a, b| a.oracle_type.cmp(&b.oracle_type));
    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom(oracle: &str, pg: &str) -> DataTypeMappingRule {
        DataTypeMappingRule::new(oracle, pg, "custom")
    }

    #[test]
    fn test_defaults_are_not_custom() {
        let rules = RuleSet::new();
        assert!(rules.custom().is_empty());
        assert!(rules.defaults().iter().all(|r| !r.is_custom() && r.id.is_none()));
        assert_eq!(rules.all().len(), default_rules().len());
    }

    #[test]
    fn test_lookup_by_exact_and_base_name() {
        let rules = RuleSet::new();
        assert_eq!(rules.lookup("clob").unwrap().postgres_type, "TEXT");
        assert_eq!(rules.lookup("RAW(16)").unwrap().postgres_type, "BYTEA");
        assert_eq!(rules.lookup("LONG RAW").unwrap().postgres_type, "BYTEA");
        assert_eq!(rules.lookup("FLOAT(126)").unwrap().postgres_type, "DOUBLE PRECISION");
        assert!(rules.lookup("ANYDATA").is_none());
    }

    #[test]
    fn test_custom_rule_overrides_default() {
        let mut rules = RuleSet::new();
        let created = rules.create_custom(custom("DATE", "DATE")).unwrap();
        assert!(created.is_custom());
        assert!(created.id.is_some());

        assert_eq!(rules.lookup("DATE").unwrap().postgres_type, "DATE");
        let all = rules.all();
        let dates: Vec<_> = all.iter().filter(|r| r.oracle_type == "DATE").collect();
        assert_eq!(dates.len(), 1);
        assert_eq!(dates[0].postgres_type, "DATE");
        assert_eq!(all.len(), default_rules().len());
    }

    #[test]
    fn test_duplicate_custom_rule_rejected() {
        let mut rules = RuleSet::new();
        rules.create_custom(custom("CLOB", "JSONB")).unwrap();
        let err = rules.create_custom(custom("clob", "TEXT")).unwrap_err();
        assert!(matches!(err, MigrateError::Rule(_)));
    }

    #[test]
    fn test_update_custom_rule() {
        let mut rules = RuleSet::new();
        let created = rules.create_custom(custom("CLOB", "JSONB")).unwrap();
        let id = created.id.unwrap();

        let updated = rules.update_custom(&id, custom("CLOB", "TEXT")).unwrap();
        assert_eq!(updated.postgres_type, "TEXT");
        assert_eq!(updated.id.as_deref(), Some(id.as_str()));

        rules.create_custom(custom("NCLOB", "JSONB")).unwrap();
        let conflict = rules.update_custom(&id, custom("NCLOB", "TEXT"));
        assert!(matches!(conflict, Err(MigrateError::Rule(_))));

        let missing = rules.update_custom("nope", custom("XMLTYPE", "TEXT"));
        assert!(matches!(missing, Err(MigrateError::NotFound { .. })));
    }

    #[test]
    fn test_delete_custom_rule() {
        let mut rules = RuleSet::new();
        let id = rules.create_custom(custom("CLOB", "JSONB")).unwrap().id.unwrap();
        rules.delete_custom(&id).unwrap();
        assert_eq!(rules.lookup("CLOB").unwrap().postgres_type, "TEXT");
        assert!(matches!(
            rules.delete_custom(&id),
            Err(MigrateError::NotFound { .. })
        ));
    }

    #[test]
    fn test_server_defaults_are_immutable() {
        let mut default = DataTypeMappingRule::new("CLOB", "TEXT", "Large text object");
        default.id = Some("d-1".into());
        default.is_custom = Some(false);
        let mut own = custom("NCLOB", "JSONB");
        own.id = Some("c-1".into());
        own.is_custom = Some(true);

        let mut rules = RuleSet::from_rules(vec![default, own]);
        assert_eq!(rules.defaults().len(), 1);
        assert_eq!(rules.custom().len(), 1);
        assert!(matches!(rules.delete_custom("d-1"), Err(MigrateError::Rule(_))));
        assert!(matches!(
            rules.update_custom("d-1", custom("CLOB", "JSONB")),
            Err(MigrateError::Rule(_))
        ));
        rules.delete_custom("c-1").unwrap();
    }

    #[test]
    fn test_with_custom_keeps_given_ids() {
        let mut rule = custom("XMLTYPE", "TEXT");
        rule.id = Some("r-1".into());
        let rules = RuleSet::new().with_custom(vec![rule]).unwrap();
        assert_eq!(rules.custom()[0].id.as_deref(), Some("r-1"));
    }
}
