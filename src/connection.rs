use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::ConnectionConfig;
use crate::error::AdapterError;
use crate::postgres::{Connector, PgConnector, Session};

/// Owns the single network session of one adapter instance.
///
/// The slot lock is held across the handshake, so callers racing on
/// [`connect`](Self::connect) queue behind the first one and then observe its
/// outcome; at most one session is ever opened per connect cycle.
pub struct ConnectionManager {
    config: ConnectionConfig,
    connector: Arc<dyn Connector>,
    slot: Mutex<Slot>,
    // Bumped under the slot lock each time a handshake finishes.
    handshakes: AtomicU64,
    connected: AtomicBool,
}

#[derive(Default)]
struct Slot {
    session: Option<Arc<dyn Session>>,
    last_error: Option<AdapterError>,
}

impl ConnectionManager {
    #[must_use]
    pub fn new(config: ConnectionConfig) -> Self {
        Self::with_connector(config, Arc::new(PgConnector))
    }

    #[must_use]
    pub fn with_connector(config: ConnectionConfig, connector: Arc<dyn Connector>) -> Self {
        Self {
            config,
            connector,
            slot: Mutex::new(Slot::default()),
            handshakes: AtomicU64::new(0),
            connected: AtomicBool::new(false),
        }
    }

    /// Adopt a pre-built session; `connect()` will return it without a handshake.
    #[must_use]
    pub fn with_session(self, session: Arc<dyn Session>) -> Self {
        Self {
            slot: Mutex::new(Slot {
                session: Some(session),
                last_error: None,
            }),
            connected: AtomicBool::new(true),
            ..self
        }
    }

    #[must_use]
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    #[must_use]
    pub fn connector(&self) -> Arc<dyn Connector> {
        self.connector.clone()
    }

    /// Return the live session, opening it first if there is none.
    ///
    /// # Errors
    /// Returns `AdapterError::ConfigError` when no database is configured (before any
    /// network attempt) or `AdapterError::ConnectionError` when the handshake fails.
    pub async fn connect(&self) -> Result<Arc<dyn Session>, AdapterError> {
        let seen = self.handshakes.load(Ordering::SeqCst);
        let mut slot = self.slot.lock().await;
        if let Some(session) = slot.session.as_ref() {
            return Ok(session.clone());
        }
        self.config.validate()?;
        // A handshake finished while we waited for the lock: share its failure.
        if self.handshakes.load(Ordering::SeqCst) != seen {
            if let Some(err) = slot.last_error.clone() {
                return Err(err);
            }
        }

        let outcome = self.connector.connect(&self.config).await;
        self.handshakes.fetch_add(1, Ordering::SeqCst);

        match outcome {
            Ok(session) => {
                slot.session = Some(session.clone());
                slot.last_error = None;
                self.connected.store(true, Ordering::SeqCst);
                debug!(host = %self.config.host, db = ?self.config.database, "connected");
                Ok(session)
            }
            Err(e) => {
                warn!(
                    host = %self.config.host,
                    port = self.config.port,
                    code = ?e.code,
                    error = %e.message,
                    "handshake failed"
                );
                let err = AdapterError::connection(&self.config.host, self.config.port, e);
                slot.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Last known handshake state; may lag behind the socket.
    #[must_use]
    pub fn connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Close the session if there is one. Always succeeds.
    pub async fn disconnect(&self) {
        let taken = self.slot.lock().await.session.take();
        self.connected.store(false, Ordering::SeqCst);
        if let Some(session) = taken {
            session.close().await;
            debug!(host = %self.config.host, "disconnected");
        }
    }

    /// The raw session handle, if one is held.
    pub async fn client(&self) -> Option<Arc<dyn Session>> {
        self.slot.lock().await.session.clone()
    }

    /// Like [`client`](Self::client), but `None` while a connect is in flight.
    #[must_use]
    pub fn try_client(&self) -> Option<Arc<dyn Session>> {
        self.slot.try_lock().ok()?.session.clone()
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("database", &self.config.database)
            .field("connected", &self.connected())
            .finish_non_exhaustive()
    }
}
