//! `sqlx`-backed implementation of the driver seam.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pooldb_bind::{BoundStatement, PlaceholderStyle};
use pooldb_pool::{
    Driver, DriverConnection, DriverError, DriverPool, ExecuteOptions, PoolConfig, ResultSet,
};
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Postgres;

use crate::config::{PgDriverConfig, connect_options};
use crate::decode::decode_rows;
use crate::encode::bind_value;

/// PostgreSQL driver.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use pooldb_postgres::{PgDriver, PgDriverConfig};
///
/// let driver = PgDriver::with_config(
///     PgDriverConfig::default()
///         .max_connections(4)
///         .acquire_timeout(Duration::from_secs(5)),
/// );
/// assert_eq!(driver.config().max_connections, 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PgDriver {
    config: PgDriverConfig,
}

impl PgDriver {
    /// Create a driver with default pool options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a driver with custom pool options.
    #[must_use]
    pub fn with_config(config: PgDriverConfig) -> Self {
        Self { config }
    }

    /// Pool options used for new pools.
    #[must_use]
    pub fn config(&self) -> &PgDriverConfig {
        &self.config
    }
}

#[async_trait]
impl Driver for PgDriver {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Dollar
    }

    async fn create_pool(&self, config: &PoolConfig) -> Result<Arc<dyn DriverPool>, DriverError> {
        let options = connect_options(config)?;
        let pool = PgPoolOptions::new()
            .max_connections(self.config.max_connections)
            .acquire_timeout(self.config.acquire_timeout)
            .connect_with(options)
            .await
            .map_err(|e| DriverError::with_source("failed to connect to postgres", e))?;

        tracing::debug!(
            max_connections = self.config.max_connections,
            "postgres pool connected"
        );
        Ok(Arc::new(PgDriverPool { pool }))
    }
}

struct PgDriverPool {
    pool: PgPool,
}

#[async_trait]
impl DriverPool for PgDriverPool {
    async fn acquire(&self) -> Result<Box<dyn DriverConnection>, DriverError> {
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| DriverError::with_source("failed to acquire postgres connection", e))?;
        Ok(Box::new(PgDriverConnection { conn }))
    }

    async fn close(&self, drain: Duration) -> Result<(), DriverError> {
        // The pool refuses new work as soon as close starts; the timeout only
        // bounds how long busy connections are waited for.
        if tokio::time::timeout(drain, self.pool.close()).await.is_err() {
            tracing::debug!(?drain, "drain timeout elapsed, dropping remaining connections");
        }
        Ok(())
    }
}

struct PgDriverConnection {
    conn: PoolConnection<Postgres>,
}

#[async_trait]
impl DriverConnection for PgDriverConnection {
    async fn execute(
        &mut self,
        statement: &BoundStatement,
        _options: &ExecuteOptions,
    ) -> Result<ResultSet, DriverError> {
        // PostgreSQL has no LOB locators; TEXT and BYTEA always arrive inline.
        let query = statement
            .params()
            .iter()
            .fold(sqlx::query(statement.sql()), bind_value);

        let rows = query
            .fetch_all(&mut *self.conn)
            .await
            .map_err(|e| DriverError::with_source("postgres query failed", e))?;

        decode_rows(&rows)
    }
}
