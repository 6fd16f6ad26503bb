use std::collections::VecDeque;
use std::sync::Arc;

use super::row::Row;

/// Forward-only, single-pass sequence of rows produced by a read query.
///
/// Once exhausted it stays exhausted; there is no rewind.
#[derive(Debug, Clone, Default)]
pub struct Cursor {
    column_names: Arc<Vec<String>>,
    rows: VecDeque<Row>,
}

impl Cursor {
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, rows: Vec<Row>) -> Self {
        Self {
            column_names,
            rows: rows.into(),
        }
    }

    /// Whether another row can be read.
    #[must_use]
    pub fn valid(&self) -> bool {
        !self.rows.is_empty()
    }

    /// Advance and yield the current row mapping.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<Row> {
        self.rows.pop_front()
    }

    /// Rows not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }
}

impl Iterator for Cursor {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        Cursor::next(self)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.rows.len(), Some(self.rows.len()))
    }
}
