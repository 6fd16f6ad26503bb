use thiserror::Error;

/// Errors surfaced to the ORM runtime.
///
/// Conversion has no error kind; unknown type names fall back to permissive
/// handlers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// Required configuration is missing. Raised before any network attempt.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The handshake with the server failed.
    #[error("Connection error: could not connect to {host}:{port}: {message}{}", code_suffix(.code))]
    ConnectionError {
        host: String,
        port: u16,
        code: Option<String>,
        message: String,
    },

    /// Statement execution (or the identity lookup following an INSERT) failed.
    ///
    /// The payload is the engine's message, verbatim.
    #[error("{0}")]
    QueryError(String),
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_ref()
        .map(|c| format!(" (code {c})"))
        .unwrap_or_default()
}

impl AdapterError {
    /// Wrap a transport failure raised during the handshake.
    #[must_use]
    pub fn connection(host: &str, port: u16, err: EngineError) -> Self {
        AdapterError::ConnectionError {
            host: host.to_string(),
            port,
            code: err.code,
            message: err.message,
        }
    }

    /// Wrap a transport failure raised while executing a statement.
    #[must_use]
    pub fn query(err: EngineError) -> Self {
        AdapterError::QueryError(err.message)
    }
}

/// Error reported by the transport: an optional SQLSTATE code and the message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct EngineError {
    pub code: Option<String>,
    pub message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl From<tokio_postgres::Error> for EngineError {
    fn from(err: tokio_postgres::Error) -> Self {
        // Server-side failures carry a SQLSTATE and a primary message; keep
        // the message verbatim so callers can match on it.
        if let Some(db) = err.as_db_error() {
            return EngineError {
                code: Some(db.code().code().to_string()),
                message: db.message().to_string(),
            };
        }
        EngineError {
            code: err.code().map(|c| c.code().to_string()),
            message: err.to_string(),
        }
    }
}
