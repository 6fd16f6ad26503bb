use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use clap::ValueEnum;
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

/// Values returned by the driver, handed to the ORM, or rendered for storage.
///
/// ```rust
/// use sql_orm_adapter::prelude::*;
///
/// let values = vec![
///     Value::Int(1),
///     Value::Text("alice".into()),
///     Value::Bool(true),
/// ];
/// # let _ = values;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Fixed-point decimal, never routed through floating point
    Decimal(Decimal),
    /// Text/string value
    Text(String),
    /// Calendar date
    Date(NaiveDate),
    /// Time of day
    Time(NaiveTime),
    /// Timestamp without zone information
    Timestamp(NaiveDateTime),
    /// Timestamp with an explicit UTC offset
    TimestampTz(DateTime<FixedOffset>),
    /// JSON value
    Json(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
    /// One-dimensional array
    Array(Vec<Value>),
    /// SQL-ready literal text, as produced by the storage direction of a conversion
    Literal(String),
}

impl Value {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let Value::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let Value::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let Value::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let Value::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_literal(&self) -> Option<&str> {
        if let Value::Literal(sql) = self {
            Some(sql)
        } else {
            None
        }
    }

    /// Render a scalar as plain text, as used for identity values.
    #[must_use]
    pub fn to_plain_string(&self) -> Option<String> {
        match self {
            Value::Null | Value::Array(_) | Value::Blob(_) => None,
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Decimal(d) => Some(d.to_string()),
            Value::Text(s) | Value::Literal(s) => Some(s.clone()),
            Value::Date(d) => Some(d.to_string()),
            Value::Time(t) => Some(t.to_string()),
            Value::Timestamp(ts) => Some(ts.to_string()),
            Value::TimestampTz(ts) => Some(ts.to_rfc3339()),
            Value::Json(j) => Some(j.to_string()),
        }
    }
}

/// The two conversion directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Direction {
    /// Application value -> SQL literal
    ToStorage,
    /// Driver-returned primitive -> application value
    ToApplication,
}

/// A generic type name together with its declared length and precision.
///
/// For `decimal`, `length` is the total number of digits and `precision`
/// the number of fractional digits.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeSpec {
    pub name: String,
    pub length: Option<u32>,
    pub precision: Option<u32>,
}

impl TypeSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            length: None,
            precision: None,
        }
    }

    #[must_use]
    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    #[must_use]
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }
}

impl From<&str> for TypeSpec {
    fn from(name: &str) -> Self {
        TypeSpec::new(name)
    }
}

impl From<String> for TypeSpec {
    fn from(name: String) -> Self {
        TypeSpec::new(name)
    }
}

impl From<&TypeSpec> for TypeSpec {
    fn from(spec: &TypeSpec) -> Self {
        spec.clone()
    }
}
