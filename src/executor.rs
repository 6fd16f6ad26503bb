use std::sync::{Arc, Mutex, PoisonError};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

use crate::connection::ConnectionManager;
use crate::dialect::Dialect;
use crate::error::AdapterError;
use crate::results::{QueryOutcome, ResultData};
use crate::types::Value;

lazy_static! {
    // Whitespace and comments that may precede the first keyword.
    static ref LEADING_NOISE: Regex =
        Regex::new(r"^(?s)(?:\s+|--[^\n]*(?:\n|$)|/\*.*?\*/)*").expect("leading noise pattern");
}

/// How a statement is treated, decided by its first keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Insert,
    Update,
    Delete,
    /// Anything else, typically a read.
    Other,
}

impl StatementKind {
    #[must_use]
    pub fn classify(sql: &str) -> Self {
        let start = LEADING_NOISE.find(sql).map_or(0, |m| m.end());
        let keyword: String = sql[start..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();

        match keyword.to_ascii_uppercase().as_str() {
            "INSERT" => StatementKind::Insert,
            "UPDATE" => StatementKind::Update,
            "DELETE" => StatementKind::Delete,
            _ => StatementKind::Other,
        }
    }
}

/// Runs SQL text over the managed session and classifies what comes back.
pub struct QueryExecutor {
    connection: Arc<ConnectionManager>,
    dialect: Arc<dyn Dialect>,
    last_insert_id: Mutex<Option<String>>,
}

impl QueryExecutor {
    #[must_use]
    pub fn new(connection: Arc<ConnectionManager>, dialect: Arc<dyn Dialect>) -> Self {
        Self {
            connection,
            dialect,
            last_insert_id: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn connection(&self) -> &Arc<ConnectionManager> {
        &self.connection
    }

    /// Execute `sql`, connecting first if needed.
    ///
    /// INSERTs are followed by an identity lookup on the same session; if that
    /// lookup fails the whole call fails, even though the row was written.
    ///
    /// # Errors
    /// Returns connection errors from the implicit connect, or
    /// `AdapterError::QueryError` with the engine's message.
    pub async fn query(&self, sql: &str) -> Result<QueryOutcome, AdapterError> {
        let kind = StatementKind::classify(sql);
        let data = self.run(sql).await?;
        debug!(?kind, rows = data.rows.len(), "statement executed");

        match kind {
            StatementKind::Insert => {
                let identity = self.run(&self.dialect.last_insert_id_sql()).await?;
                let id = identity.scalar().and_then(Value::to_plain_string);
                debug!(id = ?id, "captured insert id");
                *self
                    .last_insert_id
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = id;
                Ok(QueryOutcome::Success)
            }
            StatementKind::Update | StatementKind::Delete => Ok(QueryOutcome::Success),
            StatementKind::Other if data.has_row_data() => {
                Ok(QueryOutcome::Cursor(data.into_cursor()))
            }
            StatementKind::Other => Ok(QueryOutcome::Success),
        }
    }

    /// Execute `sql` and return the raw result, without classification.
    ///
    /// # Errors
    /// Same as [`query`](Self::query).
    pub async fn fetch(&self, sql: &str) -> Result<ResultData, AdapterError> {
        self.run(sql).await
    }

    /// Identity captured by the most recent successful INSERT on this session.
    #[must_use]
    pub fn last_insert_id(&self) -> Option<String> {
        self.last_insert_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn run(&self, sql: &str) -> Result<ResultData, AdapterError> {
        let session = self.connection.connect().await?;
        session.query(sql).await.map_err(|e| {
            warn!(code = ?e.code, error = %e.message, "statement failed");
            AdapterError::query(e)
        })
    }
}

impl std::fmt::Debug for QueryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryExecutor")
            .field("connection", &self.connection)
            .field("dialect", &self.dialect.name())
            .field("last_insert_id", &self.last_insert_id())
            .finish()
    }
}
