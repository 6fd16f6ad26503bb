use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::types::Value;

/// A row mapping (column name -> value) from a query result.
///
/// Column names are shared by every row of the same result.
#[derive(Debug, Clone)]
pub struct Row {
    /// The column names for this row (shared across all rows in a result)
    pub column_names: Arc<Vec<String>>,
    /// The values for this row, in column order
    pub values: Vec<Value>,
    // Name -> index lookup, shared the same way as the names
    column_index_cache: Arc<HashMap<String, usize>>,
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.column_names == other.column_names && self.values == other.values
    }
}

impl Row {
    /// Create a row, building its own column index.
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, values: Vec<Value>) -> Self {
        let cache = Arc::new(index_columns(&column_names));
        Self {
            column_names,
            values,
            column_index_cache: cache,
        }
    }

    /// Create a row that reuses an index built for a sibling row.
    pub(crate) fn with_index(
        column_names: Arc<Vec<String>>,
        index: Arc<HashMap<String, usize>>,
        values: Vec<Value>,
    ) -> Self {
        Self {
            column_names,
            values,
            column_index_cache: index,
        }
    }

    /// Build a row from `(column, value)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let (names, values): (Vec<String>, Vec<Value>) =
            pairs.into_iter().map(|(k, v)| (k.into(), v)).unzip();
        Self::new(Arc::new(names), values)
    }

    /// Get the index of a column by name
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        if let Some(&idx) = self.column_index_cache.get(column_name) {
            return Some(idx);
        }
        self.column_names.iter().position(|col| col == column_name)
    }

    /// Get a value from the row by column name
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&Value> {
        self.get_column_index(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consume the row into an owned name -> value map.
    #[must_use]
    pub fn into_map(self) -> BTreeMap<String, Value> {
        self.column_names
            .iter()
            .cloned()
            .zip(self.values)
            .collect()
    }
}

pub(crate) fn index_columns(column_names: &[String]) -> HashMap<String, usize> {
    column_names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name_and_index() {
        let row = Row::from_pairs([("id", Value::Int(7)), ("title", Value::Text("x".into()))]);
        assert_eq!(row.get("id"), Some(&Value::Int(7)));
        assert_eq!(row.get_by_index(1), Some(&Value::Text("x".into())));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn into_map_keeps_every_column() {
        let row = Row::from_pairs([("a", Value::Null), ("b", Value::Bool(true))]);
        let map = row.into_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map["b"], Value::Bool(true));
    }
}
