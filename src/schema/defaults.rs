//! Normalisation of raw catalog column defaults.

use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;

use crate::conversion::literal::unquote;
use crate::dialect::ColumnType;
use crate::types::Value;

lazy_static! {
    // Trailing `::type` annotations, possibly chained: `(0)::numeric::integer`
    static ref CAST_SUFFIX: Regex =
        Regex::new(r#"(?:::[\w ."\[\]]+)+$"#).expect("cast suffix pattern");
}

// Expressions meaning "now"; the caller supplies such defaults itself.
const CURRENT_TIME_SENTINELS: [&str; 7] = [
    "now()",
    "current_timestamp",
    "current_date",
    "current_time",
    "localtimestamp",
    "localtime",
    "'now'::",
];

/// Turn the catalog's default expression into a typed default, or `None`
/// when the column has no literal default.
#[must_use]
pub fn normalize_default(raw: Option<&str>, column: &ColumnType) -> Option<Value> {
    let raw = raw.map(str::trim).filter(|r| !r.is_empty())?;
    if is_null_expression(raw) {
        return None;
    }

    if column.array {
        return unquote(raw).map(Value::Text);
    }

    match column.name.as_str() {
        "boolean" => match literal_token(raw).to_ascii_lowercase().as_str() {
            "true" | "t" => Some(Value::Bool(true)),
            "false" | "f" => Some(Value::Bool(false)),
            _ => None,
        },
        "integer" | "smallinteger" | "biginteger" | "serial" => {
            literal_token(raw).parse::<i64>().ok().map(Value::Int)
        }
        "float" => literal_token(raw).parse::<f64>().ok().map(Value::Float),
        "decimal" => {
            let token = literal_token(raw);
            Decimal::from_str(&token).ok().map(|_| Value::Text(token))
        }
        "datetime" | "timestamp" | "date" | "time" => {
            if is_current_time(raw) {
                None
            } else {
                Some(Value::Text(literal_token(raw)))
            }
        }
        // Text types and anything else: strip the cast from quoted literals,
        // keep expressions such as gen_random_uuid() as written.
        _ => Some(Value::Text(unquote(raw).unwrap_or_else(|| raw.to_string()))),
    }
}

fn is_null_expression(raw: &str) -> bool {
    let upper = raw.to_ascii_uppercase();
    upper == "NULL" || upper.starts_with("NULL::")
}

fn is_current_time(raw: &str) -> bool {
    let lowered = raw.to_ascii_lowercase();
    CURRENT_TIME_SENTINELS.iter().any(|s| lowered.contains(s))
}

/// The literal part of a default: unquoted, without casts or wrapping parens.
fn literal_token(raw: &str) -> String {
    if let Some(text) = unquote(raw) {
        return text;
    }
    let without_cast = CAST_SUFFIX.replace(raw, "");
    without_cast
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim()
        .to_string()
}
