//! Helper utilities for testing and development.

use std::sync::Arc;

use crate::results::{ResultData, Row};
use crate::types::Value;

/// Create a test row with the given column names and values.
#[must_use]
pub fn create_test_row(column_names: Vec<String>, values: Vec<Value>) -> Row {
    Row::new(Arc::new(column_names), values)
}

/// Create a result set from column names and rows of values.
#[must_use]
pub fn create_test_result(column_names: &[&str], rows: Vec<Vec<Value>>) -> ResultData {
    ResultData::from_values(
        column_names.iter().map(|c| (*c).to_string()).collect(),
        rows,
    )
}
