//! Catalog introspection: table listing and column descriptions.

pub mod defaults;

use std::collections::BTreeMap;

use tracing::debug;

use crate::dialect::{CatalogColumn, Dialect};
use crate::error::AdapterError;
use crate::executor::QueryExecutor;
use crate::results::Row;
use crate::types::{TypeSpec, Value};

pub use defaults::normalize_default;

/// One column of a described table.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    /// Engine-reported type, e.g. `character varying`.
    pub native_type: String,
    /// Generic type name understood by the conversion table.
    pub type_name: String,
    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub null: bool,
    pub default: Option<Value>,
    pub array: bool,
}

impl FieldDescriptor {
    #[must_use]
    pub fn spec(&self) -> TypeSpec {
        TypeSpec {
            name: self.type_name.clone(),
            length: self.length,
            precision: self.precision,
        }
    }
}

impl From<&FieldDescriptor> for TypeSpec {
    fn from(field: &FieldDescriptor) -> Self {
        field.spec()
    }
}

/// A caller-supplied column description; skips the catalog entirely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnHint {
    pub name: String,
    pub type_name: String,
    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub null: bool,
    pub default: Option<Value>,
    pub array: bool,
}

impl ColumnHint {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            null: true,
            ..Self::default()
        }
    }
}

impl From<&ColumnHint> for FieldDescriptor {
    fn from(hint: &ColumnHint) -> Self {
        FieldDescriptor {
            name: hint.name.clone(),
            native_type: hint.type_name.clone(),
            type_name: hint.type_name.clone(),
            length: hint.length,
            precision: hint.precision,
            null: hint.null,
            default: hint.default.clone(),
            array: hint.array,
        }
    }
}

/// Reads the catalog through the executor, shaped by the dialect.
pub struct SchemaIntrospector<'a> {
    executor: &'a QueryExecutor,
    dialect: &'a dyn Dialect,
    schema: &'a str,
}

impl<'a> SchemaIntrospector<'a> {
    #[must_use]
    pub fn new(executor: &'a QueryExecutor, dialect: &'a dyn Dialect, schema: &'a str) -> Self {
        Self {
            executor,
            dialect,
            schema,
        }
    }

    /// Base tables of the configured schema, keyed and valued by name.
    ///
    /// # Errors
    /// Propagates connection and query errors from the catalog read.
    pub async fn sources(&self) -> Result<BTreeMap<String, String>, AdapterError> {
        let sql = self.dialect.list_tables_sql(self.schema);
        let data = self.executor.fetch(&sql).await?;
        let tables: BTreeMap<String, String> = data
            .rows
            .iter()
            .filter_map(|row| text(row, "name"))
            .map(|name| (name.clone(), name))
            .collect();
        debug!(schema = self.schema, count = tables.len(), "listed sources");
        Ok(tables)
    }

    /// Describe `table` column by column, in catalog order.
    ///
    /// With `hints` the catalog is not consulted at all.
    ///
    /// # Errors
    /// Propagates connection and query errors from the catalog read.
    pub async fn describe(
        &self,
        table: &str,
        hints: Option<&[ColumnHint]>,
    ) -> Result<Vec<FieldDescriptor>, AdapterError> {
        if let Some(hints) = hints {
            return Ok(hints.iter().map(FieldDescriptor::from).collect());
        }

        let sql = self.dialect.describe_table_sql(self.schema, table);
        let data = self.executor.fetch(&sql).await?;
        let fields: Vec<FieldDescriptor> = data
            .rows
            .iter()
            .map(catalog_column)
            .map(|column| self.describe_column(&column))
            .collect();
        debug!(table, columns = fields.len(), "described table");
        Ok(fields)
    }

    fn describe_column(&self, column: &CatalogColumn) -> FieldDescriptor {
        let mapped = self.dialect.column_type(column);
        let default = normalize_default(column.default.as_deref(), &mapped);
        FieldDescriptor {
            name: column.name.clone(),
            native_type: column.data_type.clone(),
            type_name: mapped.name,
            length: mapped.length,
            precision: mapped.precision,
            null: column.nullable,
            default,
            array: mapped.array,
        }
    }
}

impl std::fmt::Debug for SchemaIntrospector<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaIntrospector")
            .field("dialect", &self.dialect.name())
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Read one catalog row; columns are looked up by the aliases the dialect emits.
#[must_use]
pub fn catalog_column(row: &Row) -> CatalogColumn {
    CatalogColumn {
        name: text(row, "name").unwrap_or_default(),
        data_type: text(row, "data_type").unwrap_or_default(),
        udt_name: text(row, "udt_name").unwrap_or_default(),
        nullable: row
            .get("nullable")
            .is_some_and(|v| match v {
                Value::Bool(b) => *b,
                other => other
                    .as_text()
                    .is_some_and(|t| t.eq_ignore_ascii_case("YES")),
            }),
        default: text(row, "default"),
        char_length: uint(row, "char_length"),
        numeric_precision: uint(row, "numeric_precision"),
        numeric_scale: uint(row, "numeric_scale"),
        datetime_precision: uint(row, "datetime_precision"),
    }
}

fn text(row: &Row, column: &str) -> Option<String> {
    row.get(column).and_then(Value::to_plain_string)
}

fn uint(row: &Row, column: &str) -> Option<u32> {
    match row.get(column)? {
        Value::Int(i) => u32::try_from(*i).ok(),
        other => other.as_text().and_then(|t| t.trim().parse().ok()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::PostgresDialect;

    fn catalog_row(pairs: &[(&str, Value)]) -> Row {
        Row::from_pairs(pairs.iter().map(|(k, v)| (*k, v.clone())))
    }

    #[test]
    fn reads_catalog_rows() {
        let row = catalog_row(&[
            ("name", Value::Text("price".into())),
            ("data_type", Value::Text("numeric".into())),
            ("udt_name", Value::Text("numeric".into())),
            ("nullable", Value::Text("NO".into())),
            ("default", Value::Null),
            ("char_length", Value::Null),
            ("numeric_precision", Value::Int(10)),
            ("numeric_scale", Value::Int(2)),
            ("datetime_precision", Value::Null),
        ]);
        let column = catalog_column(&row);
        assert_eq!(column.name, "price");
        assert!(!column.nullable);
        assert_eq!(column.default, None);
        assert_eq!(column.numeric_precision, Some(10));
        assert_eq!(column.numeric_scale, Some(2));
    }

    #[test]
    fn hints_become_descriptors_verbatim() {
        let hint = ColumnHint {
            default: Some(Value::Int(3)),
            null: false,
            ..ColumnHint::new("rank", "integer")
        };
        let field = FieldDescriptor::from(&hint);
        assert_eq!(field.name, "rank");
        assert_eq!(field.type_name, "integer");
        assert!(!field.null);
        assert_eq!(field.default, Some(Value::Int(3)));
        assert_eq!(TypeSpec::from(&field).name, "integer");
    }

    #[test]
    fn nullable_flag_accepts_text_and_bool() {
        let yes = catalog_row(&[("nullable", Value::Text("YES".into()))]);
        let flag = catalog_row(&[("nullable", Value::Bool(true))]);
        let missing = catalog_row(&[("name", Value::Text("x".into()))]);
        assert!(catalog_column(&yes).nullable);
        assert!(catalog_column(&flag).nullable);
        assert!(!catalog_column(&missing).nullable);
    }

    #[test]
    fn maps_array_columns() {
        let column = CatalogColumn {
            name: "tags".into(),
            data_type: "ARRAY".into(),
            udt_name: "_text".into(),
            nullable: true,
            default: Some("'{}'::text[]".into()),
            ..CatalogColumn::default()
        };
        let mapped = PostgresDialect.column_type(&column);
        assert!(mapped.array);
        assert_eq!(
            normalize_default(column.default.as_deref(), &mapped),
            Some(Value::Text("{}".into()))
        );
    }
}
