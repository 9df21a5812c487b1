//! Column naming strategies applied when deriving target column names.

use serde::{Deserialize, Serialize};

/// How target column names are derived from Oracle column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NamingStrategy {
    #[default]
    #[serde(rename = "lowercase", alias = "lower")]
    Lowercase,
    #[serde(rename = "uppercase", alias = "upper")]
    Uppercase,
    #[serde(rename = "original")]
    Original,
    #[serde(rename = "camelCase", alias = "camelcase")]
    CamelCase,
    #[serde(rename = "snake_case")]
    SnakeCase,
    #[serde(rename = "pascalCase", alias = "pascalcase")]
    PascalCase,
}

impl NamingStrategy {
    /// Parse a strategy name; unknown names fall back to lowercase.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "uppercase" | "upper" => Self::Uppercase,
            "original" => Self::Original,
            "camelcase" => Self::CamelCase,
            "snake_case" => Self::SnakeCase,
            "pascalcase" => Self::PascalCase,
            _ => Self::Lowercase,
        }
    }

    /// Apply the strategy to a column name.
    pub fn apply(self, column_name: &str) -> String {
        if column_name.is_empty() {
            return String::new();
        }
        match self {
            Self::Lowercase => column_name.to_lowercase(),
            Self::Uppercase => column_name.to_uppercase(),
            Self::Original => column_name.to_string(),
            Self::CamelCase => to_camel_case(column_name),
            Self::SnakeCase => normalize_to_words(column_name).to_lowercase(),
            Self::PascalCase => to_pascal_case(column_name),
        }
    }
}

/// Upper-case word list joined by `_`.
///
/// Names that already contain `_` keep their boundaries. Otherwise a boundary
/// is inserted at every lower→upper transition, so `firstName` becomes
/// `FIRST_NAME` while an all-caps `FIRSTNAME` stays one word.
fn normalize_to_words(column_name: &str) -> String {
    if column_name.contains('_') {
        return column_name
            .to_uppercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_");
    }

    let mut result = String::with_capacity(column_name.len() + 4);
    let mut prev: Option<char> = None;
    for c in column_name.chars() {
        if c.is_uppercase() && prev.is_some_and(char::is_lowercase) {
            result.push('_');
        }
        result.extend(c.to_uppercase());
        prev = Some(c);
    }
    result
}

fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn to_camel_case(column_name: &str) -> String {
    let normalized = normalize_to_words(column_name);
    let mut words = normalized.split('_');
    let mut result = words.next().unwrap_or_default().to_lowercase();
    for word in words.filter(|w| !w.is_empty()) {
        result.push_str(&capitalize(word));
    }
    result
}

fn to_pascal_case(column_name: &str) -> String {
    normalize_to_words(column_name)
        .split('_')
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect()
}
