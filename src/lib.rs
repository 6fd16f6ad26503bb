//! PostgreSQL adapter for ORM runtimes.
//!
//! Connection lifecycle, statement execution with identity capture, catalog
//! introspection and value conversion over `tokio-postgres`. Start from
//! [`PostgresAdapter`] or import [`prelude`].

pub mod adapter;
pub mod config;
pub mod connection;
pub mod conversion;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod postgres;
pub mod prelude;
pub mod results;
pub mod schema;
pub mod types;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use adapter::PostgresAdapter;
pub use config::ConnectionConfig;
pub use connection::ConnectionManager;
pub use conversion::{ConversionRegistry, HandlerPair, RegistryBuilder};
pub use dialect::{CatalogColumn, ColumnType, Dialect, PostgresDialect};
pub use error::{AdapterError, EngineError};
pub use executor::{QueryExecutor, StatementKind};
pub use postgres::{Connector, PgConnector, PgSession, Session};
pub use results::{Cursor, QueryOutcome, ResultData, Row};
pub use schema::{ColumnHint, FieldDescriptor, SchemaIntrospector};
pub use types::{Direction, TypeSpec, Value};
