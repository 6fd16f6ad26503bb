use super::{CatalogColumn, ColumnType, Dialect};

/// PostgreSQL dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "PostgreSQL"
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn list_tables_sql(&self, schema: &str) -> String {
        format!(
            "SELECT table_name::text AS name \
             FROM information_schema.tables \
             WHERE table_schema = {} AND table_type = 'BASE TABLE' \
             ORDER BY table_name",
            self.quote_string(schema)
        )
    }

    fn describe_table_sql(&self, schema: &str, table: &str) -> String {
        format!(
            r#"SELECT
                c.column_name::text AS name,
                c.data_type::text AS data_type,
                c.udt_name::text AS udt_name,
                c.is_nullable::text AS nullable,
                c.column_default::text AS "default",
                c.character_maximum_length::int AS char_length,
                c.numeric_precision::int AS numeric_precision,
                c.numeric_scale::int AS numeric_scale,
                c.datetime_precision::int AS datetime_precision
            FROM information_schema.columns c
            WHERE c.table_schema = {} AND c.table_name = {}
            ORDER BY c.ordinal_position"#,
            self.quote_string(schema),
            self.quote_string(table)
        )
    }

    fn last_insert_id_sql(&self) -> String {
        "SELECT lastval() AS insert_id".to_string()
    }

    fn column_type(&self, column: &CatalogColumn) -> ColumnType {
        if column.data_type.eq_ignore_ascii_case("ARRAY") {
            // udt_name of an array is the element type prefixed with '_'
            let element = column.udt_name.trim_start_matches('_');
            let mut mapped = map_type(element, column);
            mapped.array = true;
            return mapped;
        }
        map_type(&column.data_type, column)
    }

    fn supports(&self, feature: &str) -> Option<bool> {
        match feature {
            "transactions" | "returning" | "schemas" | "arrays" | "upsert" | "json" => Some(true),
            "cascading_delete" | "sequences" => Some(true),
            "unsigned_integers" => Some(false),
            _ => None,
        }
    }
}

fn map_type(engine_type: &str, column: &CatalogColumn) -> ColumnType {
    let lowered = engine_type.to_ascii_lowercase();
    let base = lowered.split('(').next().unwrap_or_default().trim();

    match base {
        "smallint" | "int2" => ColumnType::new("smallinteger"),
        "integer" | "int" | "int4" => ColumnType::new("integer"),
        "bigint" | "int8" => ColumnType::new("biginteger"),
        "real" | "float4" | "double precision" | "float8" => ColumnType::new("float"),
        "numeric" | "decimal" => ColumnType {
            length: column.numeric_precision,
            precision: column.numeric_scale,
            ..ColumnType::new("decimal")
        },
        "boolean" | "bool" => ColumnType::new("boolean"),
        "character varying" | "varchar" | "character" | "char" | "bpchar" => ColumnType {
            length: column.char_length,
            ..ColumnType::new("string")
        },
        "text" | "citext" => ColumnType::new("text"),
        "uuid" => ColumnType::new("uuid"),
        "date" => ColumnType::new("date"),
        "timestamp without time zone"
        | "timestamp with time zone"
        | "timestamp"
        | "timestamptz" => ColumnType {
            precision: column.datetime_precision,
            ..ColumnType::new("datetime")
        },
        "time without time zone" | "time with time zone" | "time" | "timetz" => ColumnType {
            precision: column.datetime_precision,
            ..ColumnType::new("time")
        },
        "json" | "jsonb" => ColumnType::new("json"),
        "bytea" => ColumnType::new("binary"),
        _ => ColumnType::new("string"),
    }
}
