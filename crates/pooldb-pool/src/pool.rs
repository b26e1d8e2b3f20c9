//! Connection pool manager.
//!
//! This module owns the lifecycle of the process pool: existence check,
//! creation from the configured credentials, connection leases and
//! teardown.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use pooldb_bind::{BoundStatement, PlaceholderStyle};
use tokio::sync::OwnedRwLockReadGuard;

use crate::config::PoolConfig;
use crate::error::{DriverError, PoolError};
use crate::lifecycle::{ConnectionMetadata, Driver, DriverConnection, ExecuteOptions, ResultSet};
use crate::registry::{ActivePool, PoolRegistry, PoolSlot};

/// Manager of the single named pool.
///
/// The pool moves between two states:
///
/// ```text
/// Absent --create_pool--> Active --close--> Absent
/// ```
///
/// Creation and teardown take the slot's write lock and every lease holds
/// its read lock, so `close` never tears the pool down under a running
/// statement and concurrent first callers create the pool only once.
///
/// # Example
///
/// ```rust,ignore
/// use pooldb_pool::{ConnectionPoolManager, PoolConfig};
///
/// let manager = ConnectionPoolManager::builder(driver)
///     .config(PoolConfig::from_env())
///     .build();
///
/// let conn = manager.try_connect().await?;
/// // Use connection...
/// drop(conn);
/// manager.close().await;
/// ```
///
/// Clones share the pool, metrics and counters.
#[derive(Clone)]
pub struct ConnectionPoolManager {
    config: PoolConfig,
    driver: Arc<dyn Driver>,
    registry: Arc<PoolRegistry>,
    slot: Arc<PoolSlot>,
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    /// Counter for generating connection IDs.
    next_connection_id: AtomicU64,

    /// Counter for pool generations.
    next_generation: AtomicU64,

    /// When the manager was created.
    created_at: Instant,

    /// Manager metrics.
    metrics: Mutex<PoolMetricsInner>,
}

/// Internal metrics tracking.
#[derive(Debug, Default)]
struct PoolMetricsInner {
    /// Pools created.
    pools_created: u64,
    /// Pools closed.
    pools_closed: u64,
    /// Pool creation attempts that failed.
    creations_failed: u64,
    /// Successful connection checkouts.
    checkouts_successful: u64,
    /// Failed connection checkouts.
    checkouts_failed: u64,
    /// Close attempts that failed or found no pool.
    closes_failed: u64,
}

impl ConnectionPoolManager {
    /// Create a manager on the process-wide registry.
    #[must_use]
    pub fn new(config: PoolConfig, driver: Arc<dyn Driver>) -> Self {
        Self::builder(driver).config(config).build()
    }

    /// Create a manager builder for `driver`.
    #[must_use]
    pub fn builder(driver: Arc<dyn Driver>) -> PoolBuilder {
        PoolBuilder::new(driver)
    }

    /// The alias this manager's pool is registered under.
    #[must_use]
    pub fn alias(&self) -> &'static str {
        self.slot.alias
    }

    /// Pure existence check for the pool.
    ///
    /// Returns `false` and logs an error when no pool is registered. Never
    /// creates a pool and never leases a connection.
    pub fn has_active_connection(&self) -> bool {
        let active = self.slot.is_active();
        if !active {
            tracing::error!(alias = self.alias(), "no active connection pool");
        }
        active
    }

    /// Create the pool under the configured alias.
    ///
    /// Fails with [`PoolError::DuplicateAlias`] if the pool already exists.
    pub async fn create_pool(&self) -> Result<(), PoolError> {
        let mut state = self.slot.state.write().await;
        if state.is_some() {
            let err = PoolError::DuplicateAlias {
                alias: self.alias().to_string(),
            };
            tracing::error!(alias = self.alias(), error = %err, "cannot create connection pool");
            return Err(err);
        }

        *state = Some(self.build_pool().await?);
        self.slot.set_active(true);
        Ok(())
    }

    /// Lease a connection from the active pool without creating one.
    pub async fn acquire(&self) -> Result<PooledConnection, PoolError> {
        let guard = Arc::clone(&self.slot.state).read_owned().await;
        self.lease(guard).await
    }

    /// Ensure the pool exists, then lease a connection.
    ///
    /// Pool creation is attempted at most once per call.
    pub async fn try_connect(&self) -> Result<PooledConnection, PoolError> {
        if self.has_active_connection() {
            let guard = Arc::clone(&self.slot.state).read_owned().await;
            if guard.is_some() {
                return self.lease(guard).await;
            }
        }

        tracing::info!(
            alias = self.alias(),
            "no active connection pool, creating a new one"
        );

        let mut state = Arc::clone(&self.slot.state).write_owned().await;
        // Another caller may have created the pool while we waited.
        if state.is_none() {
            *state = Some(self.build_pool().await?);
            self.slot.set_active(true);
        }
        self.lease(state.downgrade()).await
    }

    /// Like [`try_connect`](Self::try_connect), but logs the failure and
    /// returns `None`.
    pub async fn connect(&self) -> Option<PooledConnection> {
        match self.try_connect().await {
            Ok(conn) => Some(conn),
            Err(e) => {
                tracing::error!(alias = self.alias(), error = %e, "failed to connect to database");
                None
            }
        }
    }

    /// Close the pool, returning whether it was closed.
    ///
    /// Logs a warning when there is no pool to close and an error when the
    /// driver fails to close it. Never fails.
    pub async fn close(&self) -> bool {
        match self.try_close().await {
            Ok(()) => true,
            // already warned
            Err(PoolError::NoActivePool { .. }) => false,
            Err(e) => {
                tracing::error!(alias = self.alias(), error = %e, "failed to close connection pool");
                false
            }
        }
    }

    /// Close the pool, keeping the error.
    ///
    /// Waits for outstanding leases to be released, then closes the driver
    /// pool with the configured drain timeout.
    pub async fn try_close(&self) -> Result<(), PoolError> {
        if !self.slot.is_active() {
            tracing::warn!(alias = self.alias(), "no open connection pools to close");
        }

        let mut state = self.slot.state.write().await;
        let Some(active) = state.take() else {
            self.inner.metrics.lock().closes_failed += 1;
            return Err(PoolError::NoActivePool {
                alias: self.alias().to_string(),
            });
        };
        self.slot.set_active(false);

        let drain = self.config.drain_timeout;
        match active.pool.close(drain).await {
            Ok(()) => {
                self.inner.metrics.lock().pools_closed += 1;
                let lifetime_ms = active.created_at.elapsed().as_millis() as u64;
                tracing::info!(
                    alias = self.alias(),
                    generation = active.generation,
                    lifetime_ms,
                    ?drain,
                    "connection pool closed"
                );
                Ok(())
            }
            Err(e) => {
                self.inner.metrics.lock().closes_failed += 1;
                Err(PoolError::Teardown(e))
            }
        }
    }

    /// Placeholder syntax expected by the driver.
    #[must_use]
    pub fn placeholder_style(&self) -> PlaceholderStyle {
        self.driver.placeholder_style()
    }

    /// Get the current pool status.
    #[must_use]
    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            alias: self.alias(),
            active: self.slot.is_active(),
            leases: self.slot.leases.load(Ordering::Acquire),
        }
    }

    /// Get manager metrics.
    #[must_use]
    pub fn metrics(&self) -> PoolMetrics {
        let inner = self.inner.metrics.lock();
        PoolMetrics {
            pools_created: inner.pools_created,
            pools_closed: inner.pools_closed,
            creations_failed: inner.creations_failed,
            checkouts_successful: inner.checkouts_successful,
            checkouts_failed: inner.checkouts_failed,
            closes_failed: inner.closes_failed,
            uptime: self.inner.created_at.elapsed(),
        }
    }

    /// Get the pool configuration.
    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Get the registry this manager is attached to.
    #[must_use]
    pub fn registry(&self) -> &Arc<PoolRegistry> {
        &self.registry
    }

    async fn build_pool(&self) -> Result<ActivePool, PoolError> {
        if let Err(e) = self.config.validate() {
            self.inner.metrics.lock().creations_failed += 1;
            tracing::error!(alias = self.alias(), error = %e, "failed to create connection pool");
            return Err(e);
        }

        match self.driver.create_pool(&self.config).await {
            Ok(pool) => {
                let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
                self.inner.metrics.lock().pools_created += 1;
                tracing::info!(
                    alias = self.alias(),
                    driver = self.driver.name(),
                    generation,
                    "connection pool created"
                );
                Ok(ActivePool {
                    pool,
                    generation,
                    created_at: Instant::now(),
                })
            }
            Err(e) => {
                self.inner.metrics.lock().creations_failed += 1;
                let err = PoolError::Creation(e);
                tracing::error!(alias = self.alias(), error = %err, "failed to create connection pool");
                Err(err)
            }
        }
    }

    async fn lease(
        &self,
        guard: OwnedRwLockReadGuard<Option<ActivePool>>,
    ) -> Result<PooledConnection, PoolError> {
        let Some(active) = guard.as_ref() else {
            self.inner.metrics.lock().checkouts_failed += 1;
            return Err(PoolError::NoActivePool {
                alias: self.alias().to_string(),
            });
        };
        let pool = Arc::clone(&active.pool);
        let generation = active.generation;

        tracing::trace!(alias = self.alias(), "acquiring connection from pool");

        let acquired = pool.acquire().await;
        match acquired {
            Ok(conn) => {
                self.inner.metrics.lock().checkouts_successful += 1;
                let id = self.inner.next_connection_id.fetch_add(1, Ordering::Relaxed);
                self.slot.leases.fetch_add(1, Ordering::AcqRel);
                Ok(PooledConnection {
                    conn,
                    metadata: ConnectionMetadata::new(id, self.alias(), generation),
                    slot: Arc::clone(&self.slot),
                    _lease: guard,
                })
            }
            Err(e) => {
                self.inner.metrics.lock().checkouts_failed += 1;
                let err = PoolError::Acquisition(e);
                tracing::error!(alias = self.alias(), error = %err, "failed to acquire connection");
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for ConnectionPoolManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPoolManager")
            .field("alias", &self.alias())
            .field("driver", &self.driver.name())
            .field("status", &self.status())
            .finish()
    }
}

/// Builder for a [`ConnectionPoolManager`].
///
/// # Example
///
/// ```rust,ignore
/// let manager = ConnectionPoolManager::builder(driver)
///     .config(PoolConfig::from_env())
///     .registry(Arc::new(PoolRegistry::new()))
///     .build();
/// ```
pub struct PoolBuilder {
    driver: Arc<dyn Driver>,
    config: Option<PoolConfig>,
    registry: Option<Arc<PoolRegistry>>,
}

impl PoolBuilder {
    /// Create a builder for `driver`.
    #[must_use]
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self {
            driver,
            config: None,
            registry: None,
        }
    }

    /// Set the pool configuration. Defaults to [`PoolConfig::from_env`].
    #[must_use]
    pub fn config(mut self, config: PoolConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the registry. Defaults to [`PoolRegistry::global`].
    #[must_use]
    pub fn registry(mut self, registry: Arc<PoolRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set the drain timeout used on close.
    #[must_use]
    pub fn drain_timeout(mut self, timeout: Duration) -> Self {
        let config = self.config.take().unwrap_or_else(PoolConfig::from_env);
        self.config = Some(config.drain_timeout(timeout));
        self
    }

    /// Build the manager.
    #[must_use]
    pub fn build(self) -> ConnectionPoolManager {
        let config = self.config.unwrap_or_else(PoolConfig::from_env);
        let registry = self.registry.unwrap_or_else(PoolRegistry::global);
        let slot = registry.slot(config.pool_alias());

        ConnectionPoolManager {
            config,
            driver: self.driver,
            registry,
            slot,
            inner: Arc::new(ManagerInner {
                next_connection_id: AtomicU64::new(1),
                next_generation: AtomicU64::new(0),
                created_at: Instant::now(),
                metrics: Mutex::new(PoolMetricsInner::default()),
            }),
        }
    }
}

/// Status information about the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    /// Pool alias.
    pub alias: &'static str,
    /// Whether a pool is registered.
    pub active: bool,
    /// Connections currently leased.
    pub leases: usize,
}

impl PoolStatus {
    /// Whether the pool is registered and nothing is leased.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.active && self.leases == 0
    }
}

/// Metrics collected by a manager.
#[derive(Debug, Clone)]
pub struct PoolMetrics {
    /// Pools created.
    pub pools_created: u64,
    /// Pools closed.
    pub pools_closed: u64,
    /// Pool creation attempts that failed.
    pub creations_failed: u64,
    /// Successful connection checkouts.
    pub checkouts_successful: u64,
    /// Failed connection checkouts.
    pub checkouts_failed: u64,
    /// Close attempts that failed or found no pool.
    pub closes_failed: u64,
    /// Time since the manager was created.
    pub uptime: Duration,
}

impl PoolMetrics {
    /// Calculate checkout success rate (0.0 to 1.0).
    #[must_use]
    pub fn checkout_success_rate(&self) -> f64 {
        let total = self.checkouts_successful + self.checkouts_failed;
        if total == 0 {
            return 1.0;
        }
        self.checkouts_successful as f64 / total as f64
    }

    /// Pools currently left open by this manager.
    #[must_use]
    pub fn pools_open(&self) -> u64 {
        self.pools_created.saturating_sub(self.pools_closed)
    }
}

/// A connection leased from the pool.
///
/// Holding one keeps the pool from being closed. Dropping it returns the
/// connection to the driver pool and releases the lease.
pub struct PooledConnection {
    conn: Box<dyn DriverConnection>,
    metadata: ConnectionMetadata,
    slot: Arc<PoolSlot>,
    _lease: OwnedRwLockReadGuard<Option<ActivePool>>,
}

impl PooledConnection {
    /// Get the connection metadata.
    #[must_use]
    pub fn metadata(&self) -> &ConnectionMetadata {
        &self.metadata
    }

    /// Execute a bound statement on this connection.
    pub async fn execute(
        &mut self,
        statement: &BoundStatement,
        options: &ExecuteOptions,
    ) -> Result<ResultSet, DriverError> {
        tracing::debug!(
            connection_id = self.metadata.id,
            params = statement.params().len(),
            "executing statement"
        );
        self.conn.execute(statement, options).await
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        self.slot.leases.fetch_sub(1, Ordering::AcqRel);
        let held_ms = self.metadata.held_for().as_millis() as u64;
        tracing::trace!(
            connection_id = self.metadata.id,
            held_ms,
            "returning connection to pool"
        );
    }
}

impl std::fmt::Debug for PooledConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledConnection")
            .field("metadata", &self.metadata)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use pooldb_types::SqlValue;

    use super::*;
    use crate::lifecycle::{Column, DriverPool};

    /// Minimal in-crate driver; the full scripted driver lives in
    /// pooldb-testing.
    #[derive(Default)]
    struct EchoDriver {
        pools: AtomicUsize,
    }

    struct EchoPool;
    struct EchoConnection;

    #[async_trait]
    impl Driver for EchoDriver {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn placeholder_style(&self) -> PlaceholderStyle {
            PlaceholderStyle::Question
        }

        async fn create_pool(&self, _config: &PoolConfig) -> Result<Arc<dyn DriverPool>, DriverError> {
            self.pools.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(EchoPool))
        }
    }

    #[async_trait]
    impl DriverPool for EchoPool {
        async fn acquire(&self) -> Result<Box<dyn DriverConnection>, DriverError> {
            Ok(Box::new(EchoConnection))
        }

        async fn close(&self, _drain: Duration) -> Result<(), DriverError> {
            Ok(())
        }
    }

    #[async_trait]
    impl DriverConnection for EchoConnection {
        async fn execute(
            &mut self,
            statement: &BoundStatement,
            _options: &ExecuteOptions,
        ) -> Result<ResultSet, DriverError> {
            Ok(ResultSet::new(
                vec![Column::new("sql", "TEXT")],
                vec![vec![SqlValue::String(statement.sql().to_string())]],
            ))
        }
    }

    fn valid_config() -> PoolConfig {
        PoolConfig::new()
            .connect_string("localhost/test")
            .user("app")
            .password("secret")
    }

    fn manager(config: PoolConfig) -> (ConnectionPoolManager, Arc<EchoDriver>) {
        let driver = Arc::new(EchoDriver::default());
        let manager = ConnectionPoolManager::builder(driver.clone())
            .config(config)
            .registry(Arc::new(PoolRegistry::new()))
            .build();
        (manager, driver)
    }

    #[tokio::test]
    async fn test_existence_check_does_not_create_pool() {
        let (manager, driver) = manager(valid_config());
        assert!(!manager.has_active_connection());
        assert_eq!(driver.pools.load(Ordering::SeqCst), 0);
        assert!(!manager.status().active);
    }

    #[tokio::test]
    async fn test_connect_creates_then_close_tears_down() {
        let (manager, driver) = manager(valid_config());

        let mut conn = manager.try_connect().await.unwrap();
        assert!(manager.has_active_connection());
        assert_eq!(manager.status().leases, 1);

        let rs = conn
            .execute(&BoundStatement::unbound("SELECT 1"), &ExecuteOptions::default())
            .await
            .unwrap();
        assert_eq!(rs.rows, vec![vec![SqlValue::String("SELECT 1".into())]]);
        drop(conn);

        assert!(manager.status().is_idle());
        assert!(manager.close().await);
        assert!(!manager.has_active_connection());
        assert_eq!(driver.pools.load(Ordering::SeqCst), 1);

        let metrics = manager.metrics();
        assert_eq!(metrics.pools_created, 1);
        assert_eq!(metrics.pools_closed, 1);
        assert_eq!(metrics.pools_open(), 0);
    }

    #[tokio::test]
    async fn test_connect_reuses_active_pool() {
        let (manager, driver) = manager(valid_config());
        drop(manager.try_connect().await.unwrap());
        drop(manager.try_connect().await.unwrap());
        assert_eq!(driver.pools.load(Ordering::SeqCst), 1);
        assert_eq!(manager.metrics().checkouts_successful, 2);
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_creation() {
        let (manager, driver) = manager(PoolConfig::new().user("app"));
        let err = manager.try_connect().await.unwrap_err();
        assert!(matches!(err, PoolError::Configuration { .. }));
        assert!(manager.connect().await.is_none());
        assert_eq!(driver.pools.load(Ordering::SeqCst), 0);
        assert_eq!(manager.metrics().creations_failed, 2);
    }

    #[tokio::test]
    async fn test_duplicate_create_is_rejected() {
        let (manager, _driver) = manager(valid_config());
        manager.create_pool().await.unwrap();
        let err = manager.create_pool().await.unwrap_err();
        assert!(matches!(err, PoolError::DuplicateAlias { ref alias } if alias == "default"));
    }

    #[tokio::test]
    async fn test_acquire_without_pool() {
        let (manager, _driver) = manager(valid_config());
        assert!(matches!(
            manager.acquire().await,
            Err(PoolError::NoActivePool { .. })
        ));
        assert_eq!(manager.metrics().checkouts_failed, 1);
    }

    #[tokio::test]
    async fn test_close_without_pool_returns_false() {
        let (manager, _driver) = manager(valid_config());
        assert!(!manager.close().await);
        assert_eq!(manager.metrics().closes_failed, 1);
    }

    #[test]
    fn test_pool_metrics_success_rate() {
        let metrics = PoolMetrics {
            pools_created: 10,
            pools_closed: 9,
            creations_failed: 0,
            checkouts_successful: 90,
            checkouts_failed: 10,
            closes_failed: 0,
            uptime: Duration::from_secs(3600),
        };

        assert!((metrics.checkout_success_rate() - 0.9).abs() < f64::EPSILON);
        assert_eq!(metrics.pools_open(), 1);
    }

    #[test]
    fn test_pool_status_idle() {
        let status = PoolStatus {
            alias: "default",
            active: true,
            leases: 0,
        };
        assert!(status.is_idle());
        assert!(!PoolStatus { leases: 2, ..status }.is_idle());
    }
}
