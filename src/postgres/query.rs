use tokio_postgres::{SimpleQueryMessage, SimpleQueryRow};

use crate::error::EngineError;
use crate::results::ResultData;
use crate::types::Value;

/// Build a result from the messages of one simple-protocol round trip.
///
/// Every non-NULL column arrives in the engine's text format and becomes
/// `Value::Text`; typing happens later through the conversion table. When the
/// text held several statements, the last one's result is reported.
///
/// # Errors
/// Returns `EngineError` if a column cannot be read.
pub fn build_result_data(messages: &[SimpleQueryMessage]) -> Result<ResultData, EngineError> {
    let mut results = ResultAssembler::default();
    for message in messages {
        match message {
            SimpleQueryMessage::RowDescription(columns) => {
                results.describe(columns.iter().map(|c| c.name().to_string()).collect());
            }
            SimpleQueryMessage::Row(row) => {
                let values = (0..row.len())
                    .map(|idx| postgres_extract_value(row, idx))
                    .collect::<Result<Vec<_>, _>>()?;
                results.row(|| column_names(row), values);
            }
            SimpleQueryMessage::CommandComplete(_) => results.complete(),
            _ => {}
        }
    }
    Ok(results.finish())
}

/// Extracts a `Value` from a text-format row at the given index.
///
/// # Errors
/// Returns `EngineError` if the column cannot be retrieved.
pub fn postgres_extract_value(row: &SimpleQueryRow, idx: usize) -> Result<Value, EngineError> {
    let val: Option<&str> = row.try_get(idx).map_err(EngineError::from)?;
    Ok(val.map_or(Value::Null, |text| Value::Text(text.to_string())))
}

fn column_names(row: &SimpleQueryRow) -> Vec<String> {
    row.columns().iter().map(|c| c.name().to_string()).collect()
}

/// Groups row descriptions, rows and completions into per-statement results.
#[derive(Debug, Default)]
pub struct ResultAssembler {
    current: Option<(Vec<String>, Vec<Vec<Value>>)>,
    last: Option<ResultData>,
}

impl ResultAssembler {
    /// A statement announced its result columns.
    pub fn describe(&mut self, columns: Vec<String>) {
        self.current = Some((columns, Vec::new()));
    }

    /// A row arrived; `columns` is consulted only if no description preceded it.
    pub fn row(&mut self, columns: impl FnOnce() -> Vec<String>, values: Vec<Value>) {
        self.current
            .get_or_insert_with(|| (columns(), Vec::new()))
            .1
            .push(values);
    }

    /// A statement finished; statements without a description yield no row data.
    pub fn complete(&mut self) {
        self.last = Some(match self.current.take() {
            Some((columns, rows)) => ResultData::from_values(columns, rows),
            None => ResultData::empty(),
        });
    }

    #[must_use]
    pub fn finish(mut self) -> ResultData {
        if self.current.is_some() {
            self.complete();
        }
        self.last.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(columns: &[&str]) -> Vec<String> {
        columns.iter().map(|c| (*c).to_string()).collect()
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn last_statement_wins() {
        let mut results = ResultAssembler::default();
        results.describe(names(&["a"]));
        results.row(Vec::new, vec![text("1")]);
        results.complete();
        results.describe(names(&["b"]));
        results.row(Vec::new, vec![text("2")]);
        results.complete();

        let data = results.finish();
        assert_eq!(*data.columns, names(&["b"]));
        assert_eq!(data.rows.len(), 1);
        assert_eq!(data.rows[0].get("b"), Some(&text("2")));
    }

    #[test]
    fn empty_read_keeps_its_description() {
        let mut results = ResultAssembler::default();
        results.describe(names(&["id", "title"]));
        results.complete();

        let data = results.finish();
        assert!(data.has_row_data());
        assert!(data.rows.is_empty());
    }

    #[test]
    fn statements_without_description_have_no_row_data() {
        let mut results = ResultAssembler::default();
        results.complete();
        assert!(!results.finish().has_row_data());

        // A trailing write replaces an earlier read.
        let mut results = ResultAssembler::default();
        results.describe(names(&["id"]));
        results.row(Vec::new, vec![text("1")]);
        results.complete();
        results.complete();
        assert!(!results.finish().has_row_data());

        assert!(!ResultAssembler::default().finish().has_row_data());
    }

    #[test]
    fn rows_without_description_use_their_own_columns() {
        let mut results = ResultAssembler::default();
        results.row(|| names(&["span"]), vec![text("1 day")]);
        results.row(|| names(&["ignored"]), vec![Value::Null]);

        let data = results.finish();
        assert_eq!(*data.columns, names(&["span"]));
        assert_eq!(data.rows[0].get("span"), Some(&text("1 day")));
        assert_eq!(data.rows[1].get("span"), Some(&Value::Null));
    }
}
