//! Convenient imports for common functionality.
//!
//! This module re-exports what an ORM runtime needs to drive the adapter.

pub use crate::adapter::PostgresAdapter;
pub use crate::config::ConnectionConfig;
pub use crate::dialect::{Dialect, PostgresDialect};
pub use crate::error::AdapterError;
pub use crate::results::{Cursor, QueryOutcome, Row};
pub use crate::schema::{ColumnHint, FieldDescriptor};
pub use crate::types::{Direction, TypeSpec, Value};
