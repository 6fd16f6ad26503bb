use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::ConnectionConfig;
use crate::connection::ConnectionManager;
use crate::conversion::ConversionRegistry;
use crate::dialect::{Dialect, PostgresDialect};
use crate::error::AdapterError;
use crate::executor::QueryExecutor;
use crate::postgres::{Connector, Session};
use crate::results::QueryOutcome;
use crate::schema::{ColumnHint, FieldDescriptor, SchemaIntrospector};
use crate::types::{Direction, TypeSpec, Value};

/// The contract the ORM runtime talks to: one connection, one dialect.
///
/// ```no_run
/// # async fn run() -> Result<(), sql_orm_adapter::AdapterError> {
/// use sql_orm_adapter::prelude::*;
///
/// let adapter = PostgresAdapter::new(ConnectionConfig::new("shop"));
/// adapter.query("INSERT INTO gallery (title) VALUES ('first')").await?;
/// println!("new id: {:?}", adapter.last_insert_id());
///
/// if let Some(mut rows) = adapter.query("SELECT * FROM gallery").await?.into_cursor() {
///     while let Some(row) = rows.next() {
///         println!("{:?}", row.get("title"));
///     }
/// }
/// adapter.disconnect().await;
/// # Ok(())
/// # }
/// ```
pub struct PostgresAdapter {
    connection: Arc<ConnectionManager>,
    executor: QueryExecutor,
    dialect: Arc<dyn Dialect>,
    converters: Arc<ConversionRegistry>,
}

impl PostgresAdapter {
    /// An adapter using `tokio-postgres` and the PostgreSQL dialect.
    #[must_use]
    pub fn new(config: ConnectionConfig) -> Self {
        Self::assemble(ConnectionManager::new(config), Arc::new(PostgresDialect))
    }

    fn assemble(manager: ConnectionManager, dialect: Arc<dyn Dialect>) -> Self {
        let connection = Arc::new(manager);
        let executor = QueryExecutor::new(connection.clone(), dialect.clone());
        let converters = dialect.converters();
        Self {
            connection,
            executor,
            dialect,
            converters,
        }
    }

    /// Swap the dialect, and with it the conversion table.
    #[must_use]
    pub fn with_dialect(self, dialect: Arc<dyn Dialect>) -> Self {
        let manager = self.rebuild_manager(self.connection.connector(), None);
        Self::assemble(manager, dialect)
    }

    /// Swap the transport used for the handshake.
    #[must_use]
    pub fn with_connector(self, connector: Arc<dyn Connector>) -> Self {
        let manager = self.rebuild_manager(connector, None);
        Self::assemble(manager, self.dialect)
    }

    /// Adopt a pre-built session instead of connecting.
    #[must_use]
    pub fn with_session(self, session: Arc<dyn Session>) -> Self {
        let manager = self.rebuild_manager(self.connection.connector(), Some(session));
        Self::assemble(manager, self.dialect)
    }

    // Fresh manager with the same settings; keeps an adopted session unless replaced.
    fn rebuild_manager(
        &self,
        connector: Arc<dyn Connector>,
        session: Option<Arc<dyn Session>>,
    ) -> ConnectionManager {
        let manager = ConnectionManager::with_connector(self.config().clone(), connector);
        let adopted = session.or_else(|| {
            self.connection
                .connected()
                .then(|| self.connection.try_client())
                .flatten()
        });
        match adopted {
            Some(session) => manager.with_session(session),
            None => manager,
        }
    }

    // -- connection lifecycle --

    /// # Errors
    /// See [`ConnectionManager::connect`].
    pub async fn connect(&self) -> Result<Arc<dyn Session>, AdapterError> {
        self.connection.connect().await
    }

    pub async fn disconnect(&self) {
        self.connection.disconnect().await;
    }

    #[must_use]
    pub fn connected(&self) -> bool {
        self.connection.connected()
    }

    pub async fn client(&self) -> Option<Arc<dyn Session>> {
        self.connection.client().await
    }

    // -- execution --

    /// # Errors
    /// See [`QueryExecutor::query`].
    pub async fn query(&self, sql: &str) -> Result<QueryOutcome, AdapterError> {
        self.executor.query(sql).await
    }

    #[must_use]
    pub fn last_insert_id(&self) -> Option<String> {
        self.executor.last_insert_id()
    }

    // -- introspection --

    /// # Errors
    /// Propagates connection and query errors from the catalog read.
    pub async fn sources(&self) -> Result<BTreeMap<String, String>, AdapterError> {
        self.introspector().sources().await
    }

    /// # Errors
    /// Propagates connection and query errors from the catalog read; never
    /// fails when `hints` are given.
    pub async fn describe(
        &self,
        table: &str,
        hints: Option<&[ColumnHint]>,
    ) -> Result<Vec<FieldDescriptor>, AdapterError> {
        self.introspector().describe(table, hints).await
    }

    fn introspector(&self) -> SchemaIntrospector<'_> {
        SchemaIntrospector::new(&self.executor, self.dialect.as_ref(), &self.config().schema)
    }

    // -- conversion --

    /// Convert `value` for a column of type `ty` in `direction`.
    ///
    /// Storage literals other than `NULL` pass through the dialect's cast hook.
    pub fn convert(&self, direction: Direction, ty: impl Into<TypeSpec>, value: Value) -> Value {
        let ty = ty.into();
        match direction {
            Direction::ToStorage => Value::Literal(self.to_storage(&ty, &value)),
            Direction::ToApplication => self.to_application(&ty, value),
        }
    }

    #[must_use]
    pub fn to_storage(&self, ty: &TypeSpec, value: &Value) -> String {
        let literal = self.converters.to_storage(ty, value);
        if value.is_null() {
            literal
        } else {
            self.dialect.cast_value(literal, ty)
        }
    }

    #[must_use]
    pub fn to_application(&self, ty: &TypeSpec, value: Value) -> Value {
        self.converters.to_application(ty, value)
    }

    // -- accessors --

    #[must_use]
    pub fn dialect(&self) -> &Arc<dyn Dialect> {
        &self.dialect
    }

    #[must_use]
    pub fn config(&self) -> &ConnectionConfig {
        self.connection.config()
    }

    #[must_use]
    pub fn use_alias(&self) -> bool {
        self.config().use_alias
    }

    /// Feature flag lookup; `None` for names the dialect does not know.
    #[must_use]
    pub fn supports(&self, feature: &str) -> Option<bool> {
        self.dialect.supports(feature)
    }
}

impl std::fmt::Debug for PostgresAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresAdapter")
            .field("connection", &self.connection)
            .field("dialect", &self.dialect.name())
            .finish_non_exhaustive()
    }
}
