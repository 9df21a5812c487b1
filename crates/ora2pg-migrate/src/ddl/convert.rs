//! Textual rewrites of Oracle SQL into PostgreSQL, and the issue notes that go
//! with them.
//!
//! These are keyword substitutions, not a parser. Anything they cannot handle
//! (CONNECT BY in particular) is reported as an issue for manual review.

use std::sync::LazyLock;

use regex::Regex;

use super::objects::{ConstraintInfo, IndexInfo};

static DECODE_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bDECODE\s*\(").expect("Invalid DECODE regex"));
static NVL_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bNVL\s*\(").expect("Invalid NVL regex"));
static TO_DATE_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bTO_DATE\s*\(").expect("Invalid TO_DATE regex"));
static ROWNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bROWNUM\b").expect("Invalid ROWNUM regex"));
static SYSTIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bSYSTIMESTAMP\b").expect("Invalid SYSTIMESTAMP regex"));
static SYSDATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bSYSDATE\b").expect("Invalid SYSDATE regex"));
// Takes the whitespace before FROM with it so `SELECT 1 FROM DUAL` ends clean.
static FROM_DUAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*\bFROM\s+DUAL\b").expect("Invalid FROM DUAL regex"));
static CONNECT_BY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bCONNECT\s+BY\b").expect("Invalid CONNECT BY regex"));

pub const ISSUE_BITMAP_INDEX: &str =
    "Bitmap index converted to B-tree (PostgreSQL doesn't support bitmap indexes)";
pub const ISSUE_FUNCTION_INDEX: &str = "Function-based index - verify expression compatibility";
pub const ISSUE_DISABLED_CONSTRAINT: &str =
    "Constraint was disabled in Oracle - verify if it should be enabled";
pub const ISSUE_CHECK_DECODE: &str = "Check condition contains DECODE - converted to CASE WHEN";
pub const ISSUE_CONNECT_BY: &str =
    "Contains CONNECT BY - may need manual conversion to recursive CTE";
pub const ISSUE_ROWNUM: &str = "Contains ROWNUM - converted to ROW_NUMBER()";
pub const ISSUE_DECODE: &str = "Contains DECODE - converted to CASE WHEN";
pub const ISSUE_DUAL: &str = "Contains DUAL table - removed (not needed in PostgreSQL)";

/// Rewrite a view query.
///
/// `DECODE(` becomes `CASE WHEN ` and needs finishing by hand; the other
/// substitutions are drop-in.
pub fn convert_view_sql(oracle_sql: &str) -> String {
    let sql = DECODE_CALL.replace_all(oracle_sql, "CASE WHEN ");
    let sql = NVL_CALL.replace_all(&sql, "COALESCE(");
    let sql = TO_DATE_CALL.replace_all(&sql, "TO_TIMESTAMP(");
    let sql = ROWNUM.replace_all(&sql, "ROW_NUMBER() OVER()");
    let sql = SYSTIMESTAMP.replace_all(&sql, "CURRENT_TIMESTAMP");
    let sql = SYSDATE.replace_all(&sql, "CURRENT_TIMESTAMP");
    let sql = FROM_DUAL.replace_all(&sql, "");
    sql.into_owned()
}

/// Rewrite a CHECK condition.
pub fn convert_check_condition(condition: &str) -> String {
    let cond = NVL_CALL.replace_all(condition, "COALESCE(");
    let cond = DECODE_CALL.replace_all(&cond, "CASE WHEN ");
    cond.into_owned()
}

/// PostgreSQL `ON DELETE` action for an Oracle delete rule.
///
/// Oracle reports `NO ACTION` for foreign keys without a rule; that and
/// anything unrecognized become `RESTRICT`.
pub fn convert_delete_rule(rule: &str) -> &'static str {
    match rule.to_uppercase().as_str() {
        "CASCADE" => "CASCADE",
        "SET NULL" => "SET NULL",
        _ => "RESTRICT",
    }
}

pub fn index_issues(index: &IndexInfo) -> Vec<String> {
    let mut issues = Vec::new();
    if index.is_bitmap() {
        issues.push(ISSUE_BITMAP_INDEX.to_string());
    }
    if index.is_function_based() {
        issues.push(ISSUE_FUNCTION_INDEX.to_string());
    }
    issues
}

pub fn constraint_issues(constraint: &ConstraintInfo) -> Vec<String> {
    let mut issues = Vec::new();
    if constraint
        .status
        .as_deref()
        .is_some_and(|s| s.eq_ignore_ascii_case("DISABLED"))
    {
        issues.push(ISSUE_DISABLED_CONSTRAINT.to_string());
    }
    if constraint
        .check_condition
        .as_deref()
        .is_some_and(|c| DECODE_CALL.is_match(c))
    {
        issues.push(ISSUE_CHECK_DECODE.to_string());
    }
    issues
}

pub fn view_issues(view_definition: &str) -> Vec<String> {
    [
        (&CONNECT_BY, ISSUE_CONNECT_BY),
        (&ROWNUM, ISSUE_ROWNUM),
        (&DECODE_CALL, ISSUE_DECODE),
        (&FROM_DUAL, ISSUE_DUAL),
    ]
    .into_iter()
    .filter(|(pattern, _)| pattern.is_match(view_definition))
    .map(|(_, issue)| issue.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_view_sql() {
        let sql = "SELECT nvl(a, 0), Decode (b, 1, 'x'), to_date(c), SYSDATE, systimestamp \
                   FROM dual WHERE rownum < 10";
        assert_eq!(
            convert_view_sql(sql),
            "SELECT COALESCE(a, 0), CASE WHEN b, 1, 'x'), TO_TIMESTAMP(c), CURRENT_TIMESTAMP, \
             CURRENT_TIMESTAMP WHERE ROW_NUMBER() OVER() < 10"
        );
        assert_eq!(convert_view_sql(""), "");
        assert_eq!(convert_view_sql("SELECT SYSDATE FROM DUAL"), "SELECT CURRENT_TIMESTAMP");
    }

    #[test]
    fn test_rewrites_leave_lookalike_identifiers_alone() {
        let sql = "SELECT INDIVIDUAL_ID, RESIDUAL, SYSDATE_COL, LAST_SYSTIMESTAMP, ROWNUMBER, \
                   MY_NVL(x), TO_DATE_STR FROM emp";
        assert_eq!(convert_view_sql(sql), sql);
        assert!(view_issues(sql).is_empty());
        assert!(view_issues("SELECT * FROM dual_rates").is_empty());
    }

    #[test]
    fn test_convert_check_condition() {
        assert_eq!(
            convert_check_condition("NVL(qty, 0) > 0 AND DECODE(x,1,2) = 2"),
            "COALESCE(qty, 0) > 0 AND CASE WHEN x,1,2) = 2"
        );
    }

    #[test]
    fn test_convert_delete_rule() {
        assert_eq!(convert_delete_rule("cascade"), "CASCADE");
        assert_eq!(convert_delete_rule("SET NULL"), "SET NULL");
        assert_eq!(convert_delete_rule("NO ACTION"), "RESTRICT");
        assert_eq!(convert_delete_rule("whatever"), "RESTRICT");
    }

    #[test]
    fn test_view_issues_in_fixed_order() {
        let issues = view_issues(
            "select decode(x,1,2) from dual where rownum = 1 connect by prior id = pid",
        );
        assert_eq!(
            issues,
            vec![ISSUE_CONNECT_BY, ISSUE_ROWNUM, ISSUE_DECODE, ISSUE_DUAL]
        );
        assert!(view_issues("SELECT 1 FROM emp").is_empty());
    }

    #[test]
    fn test_constraint_issues() {
        let constraint = ConstraintInfo {
            constraint_name: "CK".into(),
            table_name: "T".into(),
            constraint_type: "CHECK".into(),
            check_condition: Some("decode(a,1,1,0) = 1".into()),
            status: Some("disabled".into()),
            ..Default::default()
        };
        assert_eq!(
            constraint_issues(&constraint),
            vec![ISSUE_DISABLED_CONSTRAINT, ISSUE_CHECK_DECODE]
        );
    }
}
