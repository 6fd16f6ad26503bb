//! SQL dialect capability consumed by the adapter.
//!
//! The adapter never builds catalog SQL or maps engine type names itself; it
//! asks the injected [`Dialect`]. Substitute another implementation to change
//! quoting, statement construction, type mapping or the conversion table.

pub mod postgres;

use std::sync::Arc;

use crate::conversion::ConversionRegistry;
use crate::conversion::literal::quote_string;
use crate::types::TypeSpec;

pub use postgres::PostgresDialect;

/// One column as reported by the catalog, before any mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogColumn {
    pub name: String,
    /// Engine-reported type, e.g. `character varying` or `ARRAY`.
    pub data_type: String,
    /// Underlying type name, e.g. `varchar` or `_int4` for arrays.
    pub udt_name: String,
    pub nullable: bool,
    pub default: Option<String>,
    pub char_length: Option<u32>,
    pub numeric_precision: Option<u32>,
    pub numeric_scale: Option<u32>,
    pub datetime_precision: Option<u32>,
}

/// A generic column type: name plus the hints meaningful for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnType {
    pub name: String,
    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub array: bool,
}

impl ColumnType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn spec(&self) -> TypeSpec {
        TypeSpec {
            name: self.name.clone(),
            length: self.length,
            precision: self.precision,
        }
    }
}

/// Narrow contract with the SQL-dialect component.
pub trait Dialect: Send + Sync {
    /// Get the dialect name
    fn name(&self) -> &'static str;

    /// Quote an identifier (table, column name)
    fn quote_identifier(&self, name: &str) -> String;

    /// Quote a string literal
    fn quote_string(&self, value: &str) -> String {
        quote_string(value)
    }

    /// Hook applied to every non-NULL literal produced for storage.
    fn cast_value(&self, literal: String, _ty: &TypeSpec) -> String {
        literal
    }

    /// SQL listing base tables in `schema`, one `name` column per row.
    fn list_tables_sql(&self, schema: &str) -> String;

    /// SQL describing the columns of one table, in column order.
    ///
    /// Column aliases must match the fields of [`CatalogColumn`].
    fn describe_table_sql(&self, schema: &str, table: &str) -> String;

    /// SQL returning the identity value generated by the last INSERT.
    fn last_insert_id_sql(&self) -> String;

    /// Map a catalog column to a generic type.
    fn column_type(&self, column: &CatalogColumn) -> ColumnType;

    /// The conversion table adapters using this dialect should consult.
    fn converters(&self) -> Arc<ConversionRegistry> {
        ConversionRegistry::default_shared()
    }

    /// Feature flags; `None` for names the dialect does not know.
    fn supports(&self, feature: &str) -> Option<bool>;
}
