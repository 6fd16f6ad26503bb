//! SQL literal rendering and decoding shared by the type handlers.

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::Value;

lazy_static! {
    static ref QUOTED: Regex = Regex::new(r#"(?s)^'((?:[^']|'')*)'(?:::[\w ."\[\]]+)?$"#)
        .expect("quoted literal pattern");
    static ref INTEGER: Regex = Regex::new(r"^[+-]?\d+$").expect("integer pattern");
}

pub const NULL_LITERAL: &str = "NULL";

/// Quote and escape a string as a standard SQL string literal.
#[must_use]
pub fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        if ch == '\'' {
            out.push('\'');
        }
        out.push(ch);
    }
    out.push('\'');
    out
}

/// Undo [`quote_string`]. Returns `None` when `sql` is not a quoted literal.
///
/// A trailing `::type` cast is accepted and ignored.
#[must_use]
pub fn unquote(sql: &str) -> Option<String> {
    QUOTED
        .captures(sql.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().replace("''", "'"))
}

/// Turn a literal produced by the storage direction back into a primitive.
#[must_use]
pub fn decode_literal(sql: &str) -> Value {
    let trimmed = sql.trim();
    if trimmed.eq_ignore_ascii_case(NULL_LITERAL) {
        return Value::Null;
    }
    if trimmed.eq_ignore_ascii_case("TRUE") {
        return Value::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("FALSE") {
        return Value::Bool(false);
    }
    if let Some(text) = unquote(trimmed) {
        return Value::Text(text);
    }
    if INTEGER.is_match(trimmed) {
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Int(i);
        }
    }
    // Decimal numerals, ARRAY[...] and anything else stay textual.
    Value::Text(trimmed.to_string())
}
