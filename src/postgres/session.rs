use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, warn};

use super::query::build_result_data;
use crate::config::ConnectionConfig;
use crate::error::EngineError;
use crate::results::ResultData;

/// A live session with the engine.
///
/// SQL is submitted as plain text over the simple protocol, one call at a
/// time, in the order they are awaited.
#[async_trait]
pub trait Session: Send + Sync {
    /// Run `sql` and return the row description and rows of its last statement.
    async fn query(&self, sql: &str) -> Result<ResultData, EngineError>;

    /// Terminate the session. Must be safe to call more than once.
    async fn close(&self);

    /// Whether the underlying socket is known to be gone.
    fn is_closed(&self) -> bool;
}

/// Opens sessions; the seam used to substitute the transport.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Session>, EngineError>;
}

/// Connector backed by `tokio_postgres` without TLS.
#[derive(Debug, Default, Clone, Copy)]
pub struct PgConnector;

#[async_trait]
impl Connector for PgConnector {
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Session>, EngineError> {
        let cfg = config.to_tokio_config();
        debug!(
            host = %config.host,
            port = config.port,
            db = ?config.database,
            user = ?config.username,
            "postgres connect start"
        );
        let (client, connection) = cfg.connect(NoTls).await?;
        debug!("postgres connect established");

        let task = tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!(error = %e, "postgres connection terminated");
            }
        });

        Ok(Arc::new(PgSession { client, task }))
    }
}

/// A `tokio_postgres` client plus the task driving its socket.
pub struct PgSession {
    client: Client,
    task: JoinHandle<()>,
}

impl PgSession {
    /// Borrow the raw driver client.
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Session for PgSession {
    async fn query(&self, sql: &str) -> Result<ResultData, EngineError> {
        let messages = self.client.simple_query(sql).await?;
        build_result_data(&messages)
    }

    async fn close(&self) {
        self.task.abort();
    }

    fn is_closed(&self) -> bool {
        self.client.is_closed() || self.task.is_finished()
    }
}

impl Drop for PgSession {
    fn drop(&mut self) {
        self.task.abort();
    }
}
