//! Query results: rows, cursors, and the outcome of a statement.

pub mod cursor;
pub mod row;

pub use cursor::Cursor;
pub use row::Row;

use std::sync::Arc;

use crate::types::Value;

/// Everything the transport hands back for one statement.
///
/// `columns` is empty when the statement does not produce row data at all
/// (DDL, plain DML); a read that matched nothing has columns but no rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultData {
    pub columns: Arc<Vec<String>>,
    pub rows: Vec<Row>,
}

impl ResultData {
    /// A result with no row description.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a result from column names and raw value vectors.
    #[must_use]
    pub fn from_values(columns: Vec<String>, values: Vec<Vec<Value>>) -> Self {
        let columns = Arc::new(columns);
        let index = Arc::new(row::index_columns(&columns));
        let rows = values
            .into_iter()
            .map(|v| Row::with_index(columns.clone(), index.clone(), v))
            .collect();
        Self { columns, rows }
    }

    #[must_use]
    pub fn has_row_data(&self) -> bool {
        !self.columns.is_empty()
    }

    /// First value of the first row, if any.
    #[must_use]
    pub fn scalar(&self) -> Option<&Value> {
        self.rows.first().and_then(|r| r.get_by_index(0))
    }

    #[must_use]
    pub fn into_cursor(self) -> Cursor {
        Cursor::new(self.columns, self.rows)
    }
}

/// What a successful `query()` resolves to.
#[derive(Debug, Clone)]
pub enum QueryOutcome {
    /// A read that returned row data.
    Cursor(Cursor),
    /// A write, or a statement that returned no rows.
    Success,
}

impl QueryOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, QueryOutcome::Success)
    }

    /// Take the cursor, if the statement produced one.
    #[must_use]
    pub fn into_cursor(self) -> Option<Cursor> {
        match self {
            QueryOutcome::Cursor(cursor) => Some(cursor),
            QueryOutcome::Success => None,
        }
    }
}
