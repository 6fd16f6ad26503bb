use super::super::SHARED_RUNTIME;
use crate::config::ConnectionConfig;
use crate::postgres::{Connector, PgConnector, Session};

#[cfg(feature = "test-utils")]
use postgresql_embedded::PostgreSQL;

/// Represents a running embedded `PostgreSQL` instance.
#[cfg(feature = "test-utils")]
pub struct EmbeddedPostgres {
    pub postgresql: PostgreSQL,
    pub port: u16,
    pub database_url: String,
    /// Settings that reach the running instance with its real credentials
    pub config: ConnectionConfig,
}

/// Set up an embedded `PostgreSQL` instance for testing.
///
/// # Errors
/// Returns an error if the embedded server cannot be set up or started, if
/// the database cannot be created, or if the post-start connectivity check fails.
#[cfg(feature = "test-utils")]
pub fn setup_postgres_embedded(
    database: &str,
) -> Result<EmbeddedPostgres, Box<dyn std::error::Error>> {
    SHARED_RUNTIME.block_on(async {
        let mut postgresql = PostgreSQL::default();

        // Bundled binaries, so no download
        postgresql.setup().await?;
        postgresql.start().await?;

        let settings = postgresql.settings();
        let port = settings.port;
        let host = settings.host.clone();
        let user = settings.username.clone();
        let password = settings.password.clone();

        postgresql.create_database(database).await?;

        let database_url = format!("postgres://{user}:{password}@{host}:{port}/{database}");
        println!("PostgreSQL started on port {port}");

        let config = ConnectionConfig {
            host,
            port,
            username: Some(user),
            password: Some(password),
            ..ConnectionConfig::new(database)
        };

        // Quick connection test
        let session = PgConnector
            .connect(&config)
            .await
            .map_err(|e| format!("connectivity check failed: {e}"))?;
        session
            .query("SELECT 1")
            .await
            .map_err(|e| format!("connectivity check failed: {e}"))?;
        session.close().await;

        Ok(EmbeddedPostgres {
            postgresql,
            port,
            database_url,
            config,
        })
    })
}

/// Stop a previously started embedded `PostgreSQL` instance.
#[cfg(feature = "test-utils")]
pub fn stop_postgres_embedded(postgres: EmbeddedPostgres) {
    let EmbeddedPostgres { postgresql, .. } = postgres;
    SHARED_RUNTIME.block_on(async move {
        let _ = postgresql.stop().await;
    });
}
