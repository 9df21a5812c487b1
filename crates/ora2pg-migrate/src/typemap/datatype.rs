//! Type string codec.
//!
//! [`DataType`] is the one structure type strings are parsed into and rendered
//! from. The grid's `{base, length, precision, scale}` view
//! ([`ParsedDataType`]) is derived from it so that the editing path and the
//! resolver agree on how a type string is spelled.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MigrateError, Result};

/// A SQL type split into base name, numeric parameters, and trailing words.
///
/// `TIMESTAMP(6) WITH TIME ZONE` parses as base `TIMESTAMP`, params `[6]`,
/// suffix `WITH TIME ZONE`. Bases may span several words
/// (`DOUBLE PRECISION`, `LONG RAW`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataType {
    pub base: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

impl DataType {
    /// Build a type with no parameters.
    pub fn bare(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            params: Vec::new(),
            suffix: None,
        }
    }

    /// Build a type with numeric parameters.
    pub fn with_params(base: impl Into<String>, params: impl Into<Vec<u32>>) -> Self {
        Self {
            base: base.into(),
            params: params.into(),
            suffix: None,
        }
    }

    /// Parse a type string. Base and suffix are upper-cased and their
    /// whitespace collapsed; Oracle `BYTE`/`CHAR` length qualifiers are dropped.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(MigrateError::InvalidType(input.to_string()));
        }

        let (head, params, tail) = match trimmed.find('(') {
            Some(open) => {
                let close = trimmed[open..]
                    .find(')')
                    .map(|i| open + i)
                    .ok_or_else(|| MigrateError::InvalidType(input.to_string()))?;
                let params = parse_params(&trimmed[open + 1..close])
                    .ok_or_else(|| MigrateError::InvalidType(input.to_string()))?;
                (&trimmed[..open], params, &trimmed[close + 1..])
            }
            None => (trimmed, Vec::new(), ""),
        };

        let base = normalize_words(head);
        if base.is_empty() {
            return Err(MigrateError::InvalidType(input.to_string()));
        }

        let suffix = normalize_words(tail);
        Ok(Self {
            base,
            params,
            suffix: (!suffix.is_empty()).then_some(suffix),
        })
    }

    /// True when the base starts with `prefix` (case-sensitive, already upper).
    pub fn is_family(&self, prefix: &str) -> bool {
        self.base.starts_with(prefix)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)?;
        if !self.params.is_empty() {
            let joined: Vec<String> = self.params.iter().map(u32::to_string).collect();
            write!(f, "({})", joined.join(","))?;
        }
        if let Some(suffix) = &self.suffix {
            write!(f, " {}", suffix)?;
        }
        Ok(())
    }
}

impl FromStr for DataType {
    type Err = MigrateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn parse_params(inner: &str) -> Option<Vec<u32>> {
    inner
        .split(',')
        .map(|part| {
            let mut words = part.split_whitespace();
            let number = words.next()?.parse::<u32>().ok()?;
            match words.next().map(str::to_ascii_uppercase).as_deref() {
                None | Some("BYTE") | Some("CHAR") if words.next().is_none() => Some(number),
                _ => None,
            }
        })
        .collect()
}

fn normalize_words(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_ascii_uppercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// The `{baseType, length, precision, scale}` view the mapping grid edits.
///
/// The first parameter is both length and precision; the second is scale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDataType {
    pub base_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
}

/// Split a formatted type into base and up to two numeric parameters.
///
/// Accepts exactly `WORD`, `WORD(n)` and `WORD(n,m)` where WORD is
/// `[A-Za-z0-9_]+` and no whitespace appears. Anything else comes back whole
/// as the base type; empty input yields `TEXT`.
pub fn parse_data_type(data_type: &str) -> ParsedDataType {
    if data_type.is_empty() {
        return ParsedDataType {
            base_type: "TEXT".to_string(),
            ..Default::default()
        };
    }

    match strict_split(data_type) {
        Some((base, first, second)) => ParsedDataType {
            base_type: base.to_string(),
            length: first,
            precision: first,
            scale: second,
        },
        None => ParsedDataType {
            base_type: data_type.to_string(),
            ..Default::default()
        },
    }
}

fn strict_split(s: &str) -> Option<(&str, Option<u32>, Option<u32>)> {
    let is_word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    let base_end = s.find(|c: char| !is_word(c)).unwrap_or(s.len());
    if base_end == 0 {
        return None;
    }
    let (base, rest) = s.split_at(base_end);
    if rest.is_empty() {
        return Some((base, None, None));
    }

    let inner = rest.strip_prefix('(')?.strip_suffix(')')?;
    let digits = |p: &str| -> Option<u32> {
        if p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        p.parse().ok()
    };
    match inner.split_once(',') {
        Some((a, b)) => Some((base, Some(digits(a)?), Some(digits(b)?))),
        None => Some((base, Some(digits(inner)?), None)),
    }
}

/// Render a PostgreSQL type string from the grid's editable components.
pub fn format_data_type(
    base_type: &str,
    length: Option<u32>,
    precision: Option<u32>,
    scale: Option<u32>,
) -> String {
    let length = length.filter(|&n| n > 0);
    let precision = precision.filter(|&n| n > 0);
    let scale = scale.filter(|&n| n > 0);

    let data_type = match base_type {
        "VARCHAR" | "CHAR" => match length {
            Some(n) => DataType::with_params(base_type, [n]),
            None if base_type == "VARCHAR" => DataType::bare("TEXT"),
            None => DataType::with_params("CHAR", [1]),
        },
        "NUMERIC" => match (precision, scale) {
            (Some(p), Some(s)) => DataType::with_params("NUMERIC", [p, s]),
            (Some(p), None) => DataType::with_params("NUMERIC", [p]),
            _ => DataType::bare("NUMERIC"),
        },
        "TIMESTAMP" => match length {
            Some(n) => DataType::with_params("TIMESTAMP", [n]),
            None => DataType::bare("TIMESTAMP"),
        },
        other => return other.to_string(),
    };
    data_type.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_and_parameterized() {
        let dt = DataType::parse("varchar2(50)").unwrap();
        assert_eq!(dt.base, "VARCHAR2");
        assert_eq!(dt.params, vec![50]);
        assert_eq!(dt.suffix, None);

        let dt = DataType::parse("NUMBER(38, 10)").unwrap();
        assert_eq!(dt.params, vec![38, 10]);
        assert_eq!(dt.to_string(), "NUMBER(38,10)");
    }

    #[test]
    fn test_parse_multi_word_and_suffix() {
        let dt = DataType::parse("double   precision").unwrap();
        assert_eq!(dt.base, "DOUBLE PRECISION");

        let dt = DataType::parse("TIMESTAMP(6) WITH TIME ZONE").unwrap();
        assert_eq!(dt.base, "TIMESTAMP");
        assert_eq!(dt.params, vec![6]);
        assert_eq!(dt.suffix.as_deref(), Some("WITH TIME ZONE"));
        assert_eq!(dt.to_string(), "TIMESTAMP(6) WITH TIME ZONE");
    }

    #[test]
    fn test_parse_drops_length_semantics() {
        let dt = DataType::parse("VARCHAR2(100 CHAR)").unwrap();
        assert_eq!(dt.params, vec![100]);
        assert_eq!(dt.to_string(), "VARCHAR2(100)");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(DataType::parse("").is_err());
        assert!(DataType::parse("NUMBER(*,0)").is_err());
        assert!(DataType::parse("VARCHAR(10").is_err());
        assert!(DataType::parse("(10)").is_err());
    }

    #[test]
    fn test_codec_round_trip_canonical() {
        for s in [
            "NUMERIC(10,2)",
            "VARCHAR(255)",
            "TEXT",
            "DOUBLE PRECISION",
            "TIMESTAMP(3) WITH LOCAL TIME ZONE",
        ] {
            assert_eq!(DataType::parse(s).unwrap().to_string(), s);
        }
    }

    #[test]
    fn test_parse_data_type_legacy_view() {
        assert_eq!(
            parse_data_type("NUMERIC(10,2)"),
            ParsedDataType {
                base_type: "NUMERIC".into(),
                length: Some(10),
                precision: Some(10),
                scale: Some(2),
            }
        );
        assert_eq!(parse_data_type("TEXT").base_type, "TEXT");
        assert_eq!(parse_data_type("").base_type, "TEXT");
        // Multi-word types do not fit the grid's grammar and come back whole.
        let parsed = parse_data_type("DOUBLE PRECISION");
        assert_eq!(parsed.base_type, "DOUBLE PRECISION");
        assert_eq!(parsed.length, None);
        assert_eq!(parse_data_type("NUMERIC(1,2,3)").base_type, "NUMERIC(1,2,3)");
        assert_eq!(parse_data_type("VARCHAR( 5)").base_type, "VARCHAR( 5)");
    }

    #[test]
    fn test_format_data_type() {
        assert_eq!(format_data_type("VARCHAR", Some(20), None, None), "VARCHAR(20)");
        assert_eq!(format_data_type("VARCHAR", None, None, None), "TEXT");
        assert_eq!(format_data_type("CHAR", Some(0), None, None), "CHAR(1)");
        assert_eq!(format_data_type("NUMERIC", None, Some(10), Some(2)), "NUMERIC(10,2)");
        assert_eq!(format_data_type("NUMERIC", None, Some(10), Some(0)), "NUMERIC(10)");
        assert_eq!(format_data_type("NUMERIC", None, None, Some(2)), "NUMERIC");
        assert_eq!(format_data_type("TIMESTAMP", Some(6), None, None), "TIMESTAMP(6)");
        assert_eq!(format_data_type("TIMESTAMP", None, None, None), "TIMESTAMP");
        assert_eq!(format_data_type("BYTEA", Some(9), None, None), "BYTEA");
    }

    #[test]
    fn test_parse_format_parse_is_idempotent() {
        for s in [
            "VARCHAR(50)",
            "CHAR(3)",
            "NUMERIC(12)",
            "NUMERIC(18,4)",
            "TIMESTAMP(6)",
        ] {
            let first = parse_data_type(s);
            let formatted = format_data_type(
                &first.base_type,
                first.length,
                first.precision,
                first.scale,
            );
            let second = parse_data_type(&formatted);
            assert_eq!(first, second, "round trip changed {s}");
            let again = format_data_type(
                &second.base_type,
                second.length,
                second.precision,
                second.scale,
            );
            assert_eq!(formatted, again);
        }
    }
}
