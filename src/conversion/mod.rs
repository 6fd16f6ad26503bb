//! Value conversion between application values and engine literals.
//!
//! The table of handler pairs is immutable once built. The default table is
//! built once per process and shared; a dialect can hand out an alternate table
//! to override conversions for the adapters that use it.

pub mod handlers;
pub mod literal;

use std::collections::HashMap;
use std::sync::Arc;

use lazy_static::lazy_static;

use crate::types::{Direction, TypeSpec, Value};
use handlers as h;
use literal::{NULL_LITERAL, decode_literal};

pub type ToStorageFn = fn(&Value, &TypeSpec) -> String;
pub type ToApplicationFn = fn(Value, &TypeSpec) -> Value;

/// The two handlers registered for one generic type.
#[derive(Debug, Clone, Copy)]
pub struct HandlerPair {
    pub to_storage: ToStorageFn,
    pub to_application: ToApplicationFn,
}

impl HandlerPair {
    #[must_use]
    pub const fn new(to_storage: ToStorageFn, to_application: ToApplicationFn) -> Self {
        Self {
            to_storage,
            to_application,
        }
    }
}

const INTEGER: HandlerPair = HandlerPair::new(h::integer_to_storage, h::integer_to_application);
const FLOAT: HandlerPair = HandlerPair::new(h::float_to_storage, h::float_to_application);
const DECIMAL: HandlerPair = HandlerPair::new(h::decimal_to_storage, h::decimal_to_application);
const BOOLEAN: HandlerPair = HandlerPair::new(h::boolean_to_storage, h::boolean_to_application);
const STRING: HandlerPair = HandlerPair::new(h::string_to_storage, h::passthrough);
const DATE: HandlerPair = HandlerPair::new(h::date_to_storage, h::date_to_application);
const DATETIME: HandlerPair = HandlerPair::new(h::datetime_to_storage, h::datetime_to_application);
const TIME: HandlerPair = HandlerPair::new(h::time_to_storage, h::time_to_application);
const JSON: HandlerPair = HandlerPair::new(h::json_to_storage, h::json_to_application);
const BINARY: HandlerPair = HandlerPair::new(h::binary_to_storage, h::binary_to_application);

/// Used for any type name without a registered pair.
pub const FALLBACK: HandlerPair = HandlerPair::new(h::string_to_storage, h::passthrough);

lazy_static! {
    static ref DEFAULT_REGISTRY: Arc<ConversionRegistry> =
        Arc::new(RegistryBuilder::with_defaults().build());
}

/// Immutable map from generic type name to its handler pair.
#[derive(Debug, Clone)]
pub struct ConversionRegistry {
    handlers: HashMap<String, HandlerPair>,
    fallback: HandlerPair,
}

impl ConversionRegistry {
    /// The process-wide default table.
    #[must_use]
    pub fn default_shared() -> Arc<ConversionRegistry> {
        DEFAULT_REGISTRY.clone()
    }

    /// Start an alternate table from the defaults.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::with_defaults()
    }

    /// Handler pair for `type_name`, or the fallback pair.
    #[must_use]
    pub fn handlers_for(&self, type_name: &str) -> &HandlerPair {
        self.handlers
            .get(&type_name.to_ascii_lowercase())
            .unwrap_or(&self.fallback)
    }

    #[must_use]
    pub fn is_registered(&self, type_name: &str) -> bool {
        self.handlers.contains_key(&type_name.to_ascii_lowercase())
    }

    /// Render `value` as an SQL-ready literal for a column of type `ty`.
    #[must_use]
    pub fn to_storage(&self, ty: &TypeSpec, value: &Value) -> String {
        match value {
            Value::Null => NULL_LITERAL.to_string(),
            Value::Literal(sql) => sql.clone(),
            Value::Array(items) => {
                let rendered: Vec<String> =
                    items.iter().map(|item| self.to_storage(ty, item)).collect();
                format!("ARRAY[{}]", rendered.join(", "))
            }
            other => (self.handlers_for(&ty.name).to_storage)(other, ty),
        }
    }

    /// Turn a driver-returned primitive into an application value.
    #[must_use]
    pub fn to_application(&self, ty: &TypeSpec, value: Value) -> Value {
        let value = match value {
            Value::Literal(sql) => decode_literal(&sql),
            other => other,
        };
        match value {
            Value::Null => Value::Null,
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| self.to_application(ty, item))
                    .collect(),
            ),
            other => (self.handlers_for(&ty.name).to_application)(other, ty),
        }
    }

    /// Direction-generic entry point; `ToStorage` yields a `Value::Literal`.
    #[must_use]
    pub fn convert(&self, direction: Direction, ty: &TypeSpec, value: Value) -> Value {
        match direction {
            Direction::ToStorage => Value::Literal(self.to_storage(ty, &value)),
            Direction::ToApplication => self.to_application(ty, value),
        }
    }
}

/// Builds a [`ConversionRegistry`]; the only way to change a table.
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    handlers: HashMap<String, HandlerPair>,
    fallback: HandlerPair,
}

impl RegistryBuilder {
    /// A builder with nothing registered and the default fallback.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
            fallback: FALLBACK,
        }
    }

    #[must_use]
    pub fn with_defaults() -> Self {
        Self::empty()
            .with("integer", INTEGER)
            .with("smallinteger", INTEGER)
            .with("biginteger", INTEGER)
            .with("serial", INTEGER)
            .with("float", FLOAT)
            .with("decimal", DECIMAL)
            .with("boolean", BOOLEAN)
            .with("string", STRING)
            .with("text", STRING)
            .with("uuid", STRING)
            .with("date", DATE)
            .with("datetime", DATETIME)
            .with("timestamp", DATETIME)
            .with("time", TIME)
            .with("json", JSON)
            .with("binary", BINARY)
    }

    #[must_use]
    pub fn with(mut self, type_name: &str, pair: HandlerPair) -> Self {
        self.handlers.insert(type_name.to_ascii_lowercase(), pair);
        self
    }

    #[must_use]
    pub fn with_fallback(mut self, pair: HandlerPair) -> Self {
        self.fallback = pair;
        self
    }

    #[must_use]
    pub fn build(self) -> ConversionRegistry {
        ConversionRegistry {
            handlers: self.handlers,
            fallback: self.fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TYPES: [&str; 17] = [
        "integer",
        "smallinteger",
        "biginteger",
        "serial",
        "float",
        "decimal",
        "boolean",
        "string",
        "text",
        "uuid",
        "date",
        "datetime",
        "timestamp",
        "time",
        "json",
        "binary",
        "no-such-type",
    ];

    #[test]
    fn null_maps_to_each_directions_null() {
        let registry = ConversionRegistry::default_shared();
        for name in TYPES {
            let ty = TypeSpec::new(name);
            assert_eq!(
                registry.convert(Direction::ToStorage, &ty, Value::Null),
                Value::Literal("NULL".into()),
                "{name}"
            );
            assert_eq!(
                registry.convert(Direction::ToApplication, &ty, Value::Null),
                Value::Null,
                "{name}"
            );
        }
    }

    #[test]
    fn round_trips_integer_boolean_string() {
        let registry = ConversionRegistry::default_shared();
        let cases = [
            ("integer", Value::Int(0)),
            ("integer", Value::Int(-9_000_000_000)),
            ("boolean", Value::Bool(true)),
            ("boolean", Value::Bool(false)),
            ("string", Value::Text(String::new())),
            ("string", Value::Text("O'Reilly -- ; DROP".into())),
            ("string", Value::Text("NULL".into())),
        ];
        for (name, value) in cases {
            let ty = TypeSpec::new(name);
            let stored = registry.convert(Direction::ToStorage, &ty, value.clone());
            let back = registry.convert(Direction::ToApplication, &ty, stored);
            assert_eq!(back, value, "{name}");
        }
    }

    #[test]
    fn unknown_types_use_fallback() {
        let registry = ConversionRegistry::default_shared();
        let ty = TypeSpec::new("geometry");
        assert!(!registry.is_registered("geometry"));
        assert_eq!(registry.to_storage(&ty, &Value::Text("POINT(1 2)".into())), "'POINT(1 2)'");
        assert_eq!(registry.to_storage(&ty, &Value::Int(5)), "'5'");
        assert_eq!(
            registry.to_application(&ty, Value::Blob(vec![1, 2])),
            Value::Blob(vec![1, 2])
        );
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = ConversionRegistry::default_shared();
        assert!(registry.is_registered("DateTime"));
        assert_eq!(registry.to_storage(&"BOOLEAN".into(), &Value::Bool(true)), "TRUE");
    }

    #[test]
    fn arrays_convert_element_wise() {
        let registry = ConversionRegistry::default_shared();
        let ty = TypeSpec::new("integer");
        let v = Value::Array(vec![Value::Int(1), Value::Null, Value::Int(3)]);
        assert_eq!(registry.to_storage(&ty, &v), "ARRAY[1, NULL, 3]");
        assert_eq!(
            registry.to_application(&ty, Value::Array(vec![Value::Text("4".into())])),
            Value::Array(vec![Value::Int(4)])
        );
    }

    #[test]
    fn alternate_tables_do_not_touch_the_default() {
        fn shout(value: &Value, _ty: &TypeSpec) -> String {
            literal::quote_string(&value.to_plain_string().unwrap_or_default().to_uppercase())
        }
        let custom = ConversionRegistry::builder()
            .with("string", HandlerPair::new(shout, handlers::passthrough))
            .build();
        let ty = TypeSpec::new("string");
        assert_eq!(custom.to_storage(&ty, &Value::Text("abc".into())), "'ABC'");
        assert_eq!(
            ConversionRegistry::default_shared().to_storage(&ty, &Value::Text("abc".into())),
            "'abc'"
        );
    }

    #[test]
    fn decimal_respects_declared_precision() {
        let registry = ConversionRegistry::default_shared();
        for p in 0..6u32 {
            let ty = TypeSpec::new("decimal").with_length(12).with_precision(p);
            let rendered = registry.to_storage(&ty, &Value::Float(123.456_789));
            let fraction = rendered.split_once('.').map_or(0, |(_, f)| f.len());
            assert_eq!(fraction, p as usize, "{rendered}");
        }
    }
}
