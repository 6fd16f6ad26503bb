//! Per-type handler pairs for the default conversion table.
//!
//! Storage handlers never see `Value::Null` or `Value::Literal`, and
//! application handlers never see `Value::Null`; the registry resolves those first.

use std::str::FromStr;

use chrono::{
    DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone,
    Utc,
};
use rust_decimal::Decimal;

use super::literal::quote_string;
use crate::types::{TypeSpec, Value};

const TRUE_TOKENS: [&str; 6] = ["t", "true", "1", "y", "yes", "on"];
const FALSE_TOKENS: [&str; 6] = ["f", "false", "0", "n", "no", "off"];

fn plain_text(value: &Value) -> String {
    value.to_plain_string().unwrap_or_default()
}

fn quote_plain(value: &Value) -> String {
    match value {
        Value::Blob(bytes) => quote_string(&String::from_utf8_lossy(bytes)),
        other => quote_string(&plain_text(other)),
    }
}

// integer / smallinteger / biginteger / serial

pub fn integer_to_storage(value: &Value, _ty: &TypeSpec) -> String {
    match value {
        Value::Int(i) => i.to_string(),
        Value::Bool(b) => i64::from(*b).to_string(),
        Value::Float(f) if f.is_finite() => format!("{}", f.trunc()),
        Value::Decimal(d) => d.trunc().normalize().to_string(),
        Value::Text(s) => match parse_integer(s) {
            Some(i) => i.to_string(),
            None => quote_string(s),
        },
        other => quote_plain(other),
    }
}

pub fn integer_to_application(value: Value, _ty: &TypeSpec) -> Value {
    match value {
        Value::Bool(b) => Value::Int(i64::from(b)),
        #[allow(clippy::cast_possible_truncation)]
        Value::Float(f) if f.is_finite() => Value::Int(f.trunc() as i64),
        Value::Decimal(d) => i64::try_from(d.trunc()).map_or(Value::Decimal(d), Value::Int),
        Value::Text(s) => parse_integer(&s).map_or(Value::Text(s), Value::Int),
        other => other,
    }
}

fn parse_integer(s: &str) -> Option<i64> {
    let trimmed = s.trim();
    trimmed.parse::<i64>().ok().or_else(|| {
        Decimal::from_str(trimmed)
            .ok()
            .and_then(|d| i64::try_from(d.trunc()).ok())
    })
}

// float

pub fn float_to_storage(value: &Value, _ty: &TypeSpec) -> String {
    match value {
        Value::Float(f) => render_float(*f),
        Value::Int(i) => i.to_string(),
        Value::Decimal(d) => d.to_string(),
        Value::Bool(b) => i64::from(*b).to_string(),
        Value::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_or_else(|_| quote_string(s), render_float),
        other => quote_plain(other),
    }
}

fn render_float(f: f64) -> String {
    if f.is_nan() {
        quote_string("NaN")
    } else if f.is_infinite() {
        quote_string(if f > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        format!("{f}")
    }
}

pub fn float_to_application(value: Value, _ty: &TypeSpec) -> Value {
    match value {
        #[allow(clippy::cast_precision_loss)]
        Value::Int(i) => Value::Float(i as f64),
        Value::Decimal(d) => f64::try_from(d).map_or(Value::Decimal(d), Value::Float),
        Value::Text(s) => match s.trim() {
            "NaN" => Value::Float(f64::NAN),
            "Infinity" => Value::Float(f64::INFINITY),
            "-Infinity" => Value::Float(f64::NEG_INFINITY),
            t => t.parse::<f64>().map_or(Value::Text(s), Value::Float),
        },
        other => other,
    }
}

// decimal

/// Render fixed-point text with exactly `ty.precision` fractional digits.
///
/// Rounding works on the digit string, so neither scale nor magnitude is
/// bounded by a binary decimal type.
pub fn decimal_to_storage(value: &Value, ty: &TypeSpec) -> String {
    let parsed = match value {
        Value::Decimal(d) => FixedPoint::parse(&d.to_string()),
        Value::Int(i) => FixedPoint::parse(&i.to_string()),
        // Shortest round-trip text, so 0.1 stays 0.1.
        Value::Float(f) if f.is_finite() => FixedPoint::parse(&f.to_string()),
        Value::Text(s) => FixedPoint::parse(s),
        Value::Bool(b) => FixedPoint::parse(if *b { "1" } else { "0" }),
        _ => None,
    };

    match parsed {
        Some(n) => n.render(ty.precision),
        None => quote_plain(value),
    }
}

// Exponents beyond this are not treated as numbers.
const MAX_EXPONENT: i64 = 4096;

/// A decimal number held as its digit strings.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FixedPoint {
    negative: bool,
    integer: String,
    fraction: String,
}

impl FixedPoint {
    fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (negative, rest) = match s.as_bytes().first()? {
            b'-' => (true, &s[1..]),
            b'+' => (false, &s[1..]),
            _ => (false, s),
        };
        let (mantissa, exponent) = match rest.find(['e', 'E']) {
            Some(pos) => (&rest[..pos], rest[pos + 1..].parse::<i64>().ok()?),
            None => (rest, 0),
        };
        if exponent.abs() > MAX_EXPONENT {
            return None;
        }
        let (integer, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if integer.is_empty() && fraction.is_empty() {
            return None;
        }
        if !integer.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }

        let mut digits = format!("{integer}{fraction}");
        let mut point = i64::try_from(integer.len()).ok()? + exponent;
        if point < 0 {
            let pad = usize::try_from(-point).ok()?;
            digits.insert_str(0, &"0".repeat(pad));
            point = 0;
        }
        let point = usize::try_from(point).ok()?;
        if point > digits.len() {
            digits.push_str(&"0".repeat(point - digits.len()));
        }
        let (integer, fraction) = digits.split_at(point);

        Some(Self {
            negative,
            integer: integer.trim_start_matches('0').to_string(),
            fraction: fraction.to_string(),
        })
    }

    /// Text with exactly `scale` fractional digits, rounding half away from zero.
    fn render(mut self, scale: Option<u32>) -> String {
        if let Some(scale) = scale.and_then(|s| usize::try_from(s).ok()) {
            if self.fraction.len() > scale {
                let round_up = self.fraction.as_bytes()[scale] >= b'5';
                self.fraction.truncate(scale);
                if round_up {
                    self.increment();
                }
            } else {
                let pad = scale - self.fraction.len();
                self.fraction.push_str(&"0".repeat(pad));
            }
        }

        let is_zero = self.integer.bytes().chain(self.fraction.bytes()).all(|b| b == b'0');
        let mut out = String::new();
        if self.negative && !is_zero {
            out.push('-');
        }
        if self.integer.is_empty() {
            out.push('0');
        } else {
            out.push_str(&self.integer);
        }
        if !self.fraction.is_empty() {
            out.push('.');
            out.push_str(&self.fraction);
        }
        out
    }

    /// Add one unit in the last fractional place, carrying into the integer part.
    fn increment(&mut self) {
        let mut fraction = self.fraction.clone().into_bytes();
        if carry(&mut fraction) {
            let mut integer = self.integer.clone().into_bytes();
            if carry(&mut integer) {
                integer.insert(0, b'1');
            }
            self.integer = String::from_utf8_lossy(&integer).into_owned();
        }
        self.fraction = String::from_utf8_lossy(&fraction).into_owned();
    }
}

// Adds one to an ASCII digit string; true when the carry runs off the front.
fn carry(digits: &mut [u8]) -> bool {
    for d in digits.iter_mut().rev() {
        if *d == b'9' {
            *d = b'0';
        } else {
            *d += 1;
            return false;
        }
    }
    true
}

/// Decimals reach the application as text so no digit is lost to `f64`.
pub fn decimal_to_application(value: Value, _ty: &TypeSpec) -> Value {
    match value {
        Value::Decimal(d) => Value::Text(d.to_string()),
        Value::Int(i) => Value::Text(i.to_string()),
        Value::Float(f) => Value::Text(f.to_string()),
        Value::Text(s) => Value::Text(s.trim().to_string()),
        other => other,
    }
}

// boolean

pub fn boolean_to_storage(value: &Value, _ty: &TypeSpec) -> String {
    let flag = match value {
        Value::Bool(b) => Some(*b),
        Value::Int(i) => Some(*i != 0),
        Value::Float(f) => Some(*f != 0.0),
        Value::Decimal(d) => Some(!d.is_zero()),
        Value::Text(s) => parse_bool(s),
        _ => None,
    };
    match flag {
        Some(true) => "TRUE".to_string(),
        Some(false) => "FALSE".to_string(),
        None => quote_plain(value),
    }
}

pub fn boolean_to_application(value: Value, _ty: &TypeSpec) -> Value {
    match value {
        Value::Int(i) => Value::Bool(i != 0),
        Value::Text(s) => parse_bool(&s).map_or(Value::Text(s), Value::Bool),
        other => other,
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    let token = s.trim().to_ascii_lowercase();
    if TRUE_TOKENS.contains(&token.as_str()) {
        Some(true)
    } else if FALSE_TOKENS.contains(&token.as_str()) {
        Some(false)
    } else {
        None
    }
}

// string / text / uuid, and the fallback pair

pub fn string_to_storage(value: &Value, _ty: &TypeSpec) -> String {
    quote_plain(value)
}

pub fn passthrough(value: Value, _ty: &TypeSpec) -> Value {
    value
}

// date / datetime / timestamp / time

/// Dates render as a bare calendar date; no zone is involved.
pub fn date_to_storage(value: &Value, ty: &TypeSpec) -> String {
    let date = match value {
        Value::Date(d) => Some(*d),
        Value::Timestamp(ts) => Some(ts.date()),
        Value::TimestampTz(ts) => Some(ts.date_naive()),
        Value::Text(s) => parse_date(s),
        _ => None,
    };
    match date {
        Some(d) => quote_string(&d.format("%Y-%m-%d").to_string()),
        None => datetime_to_storage(value, ty),
    }
}

/// Timestamps render as quoted ISO-8601 text in UTC.
pub fn datetime_to_storage(value: &Value, _ty: &TypeSpec) -> String {
    let instant = match value {
        Value::TimestampTz(ts) => Some(ts.with_timezone(&Utc)),
        Value::Timestamp(naive) => Some(local_to_utc(naive)),
        Value::Date(d) => d.and_hms_opt(0, 0, 0).map(|naive| local_to_utc(&naive)),
        Value::Text(s) => parse_datetime(s).map(|ts| ts.with_timezone(&Utc)),
        _ => None,
    };
    match instant {
        Some(ts) => quote_string(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        None => quote_plain(value),
    }
}

pub fn time_to_storage(value: &Value, _ty: &TypeSpec) -> String {
    let time = match value {
        Value::Time(t) => Some(*t),
        Value::Timestamp(ts) => Some(ts.time()),
        Value::TimestampTz(ts) => Some(ts.time()),
        Value::Text(s) => parse_time(s),
        _ => None,
    };
    match time {
        Some(t) => quote_string(&t.format("%H:%M:%S%.f").to_string()),
        None => quote_plain(value),
    }
}

pub fn date_to_application(value: Value, _ty: &TypeSpec) -> Value {
    match value {
        Value::Timestamp(ts) => Value::Date(ts.date()),
        Value::TimestampTz(ts) => Value::Date(ts.date_naive()),
        Value::Text(s) => parse_date(&s).map_or(Value::Text(s), Value::Date),
        other => other,
    }
}

pub fn datetime_to_application(value: Value, _ty: &TypeSpec) -> Value {
    match value {
        Value::Timestamp(naive) => Value::TimestampTz(assume_local(&naive)),
        Value::Date(d) => d
            .and_hms_opt(0, 0, 0)
            .map_or(Value::Date(d), |naive| Value::TimestampTz(assume_local(&naive))),
        Value::Text(s) => parse_datetime(&s).map_or(Value::Text(s), Value::TimestampTz),
        other => other,
    }
}

pub fn time_to_application(value: Value, _ty: &TypeSpec) -> Value {
    match value {
        Value::Text(s) => parse_time(&s).map_or(Value::Text(s), Value::Time),
        Value::Timestamp(ts) => Value::Time(ts.time()),
        other => other,
    }
}

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse ISO-ish text. An explicit offset is honoured; otherwise local time is assumed.
pub fn parse_datetime(s: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(ts);
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(trimmed, fmt) {
            return Some(ts);
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(assume_local(&naive));
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| assume_local(&naive))
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(trimmed).map(|ts| ts.date_naive()))
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    let trimmed = s.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .ok()
}

fn assume_local(naive: &NaiveDateTime) -> DateTime<FixedOffset> {
    match Local.from_local_datetime(naive).earliest() {
        Some(ts) => ts.fixed_offset(),
        // Skipped by a DST jump; read it as UTC rather than fail.
        None => Utc.from_utc_datetime(naive).fixed_offset(),
    }
}

fn local_to_utc(naive: &NaiveDateTime) -> DateTime<Utc> {
    assume_local(naive).with_timezone(&Utc)
}

// json / binary

pub fn json_to_storage(value: &Value, _ty: &TypeSpec) -> String {
    match value {
        Value::Json(j) => quote_string(&j.to_string()),
        Value::Text(s) => quote_string(s),
        other => quote_string(&plain_text(other)),
    }
}

pub fn json_to_application(value: Value, _ty: &TypeSpec) -> Value {
    match value {
        Value::Text(s) => serde_json::from_str(&s).map_or(Value::Text(s), Value::Json),
        other => other,
    }
}

pub fn binary_to_storage(value: &Value, _ty: &TypeSpec) -> String {
    match value {
        Value::Blob(bytes) => quote_string(&format!("\\x{}", hex::encode(bytes))),
        other => quote_plain(other),
    }
}

pub fn binary_to_application(value: Value, _ty: &TypeSpec) -> Value {
    match value {
        Value::Text(s) => match s.strip_prefix("\\x").map(hex::decode) {
            Some(Ok(bytes)) => Value::Blob(bytes),
            _ => Value::Text(s),
        },
        other => other,
    }
}
