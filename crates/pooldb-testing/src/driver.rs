//! Scripted in-memory driver.

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use pooldb_bind::{BoundStatement, PlaceholderStyle};
use pooldb_pool::{
    Driver, DriverConnection, DriverError, DriverPool, ExecuteOptions, PoolConfig, ResultSet,
};
use pooldb_types::SqlValue;

/// A driver operation that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    /// `Driver::create_pool`.
    CreatePool,
    /// `DriverPool::acquire`.
    Acquire,
    /// `DriverConnection::execute`.
    Execute,
    /// `DriverPool::close`.
    Close,
}

/// A statement the driver received.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedStatement {
    /// Translated SQL.
    pub sql: String,
    /// Positional parameters.
    pub params: Vec<SqlValue>,
    /// Placeholder style the statement was translated to.
    pub style: PlaceholderStyle,
    /// Whether large objects were requested as text.
    pub lob_as_text: bool,
}

/// In-memory driver returning canned result sets.
///
/// Clones share state, so a test keeps one handle for scripting and
/// assertions and hands another to the pool manager.
#[derive(Clone, Default)]
pub struct ScriptedDriver {
    state: Arc<DriverState>,
}

#[derive(Default)]
struct DriverState {
    style: Mutex<PlaceholderStyle>,
    responses: Mutex<HashMap<String, ResultSet>>,
    fallback: Mutex<ResultSet>,
    faults: Mutex<HashSet<Fault>>,
    create_delay: Mutex<Option<Duration>>,
    execute_delay: Mutex<Option<Duration>>,
    pools_created: AtomicUsize,
    pools_closed: AtomicUsize,
    acquires: AtomicUsize,
    executed: Mutex<Vec<ExecutedStatement>>,
    drains: Mutex<Vec<Duration>>,
    configs: Mutex<Vec<PoolConfig>>,
}

impl ScriptedDriver {
    /// Create a driver that answers every statement with no rows.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `style` for placeholders.
    #[must_use]
    pub fn with_style(self, style: PlaceholderStyle) -> Self {
        *self.state.style.lock() = style;
        self
    }

    /// Answer the translated statement `sql` with `result`.
    pub fn respond(&self, sql: impl Into<String>, result: ResultSet) {
        self.state.responses.lock().insert(sql.into(), result);
    }

    /// Answer every unscripted statement with `result`.
    pub fn respond_any(&self, result: ResultSet) {
        *self.state.fallback.lock() = result;
    }

    /// Make `fault` fail until [`heal`](Self::heal) is called.
    pub fn fail(&self, fault: Fault) {
        self.state.faults.lock().insert(fault);
    }

    /// Stop failing `fault`.
    pub fn heal(&self, fault: Fault) {
        self.state.faults.lock().remove(&fault);
    }

    /// Sleep this long inside `create_pool`.
    pub fn delay_create(&self, delay: Duration) {
        *self.state.create_delay.lock() = Some(delay);
    }

    /// Sleep this long inside `execute`.
    pub fn delay_execute(&self, delay: Duration) {
        *self.state.execute_delay.lock() = Some(delay);
    }

    /// Pools created.
    #[must_use]
    pub fn pools_created(&self) -> usize {
        self.state.pools_created.load(Ordering::SeqCst)
    }

    /// Pools closed.
    #[must_use]
    pub fn pools_closed(&self) -> usize {
        self.state.pools_closed.load(Ordering::SeqCst)
    }

    /// Pools created and not yet closed.
    #[must_use]
    pub fn open_pools(&self) -> usize {
        self.pools_created().saturating_sub(self.pools_closed())
    }

    /// Successful connection acquisitions.
    #[must_use]
    pub fn acquires(&self) -> usize {
        self.state.acquires.load(Ordering::SeqCst)
    }

    /// Statements executed, in order.
    #[must_use]
    pub fn executed(&self) -> Vec<ExecutedStatement> {
        self.state.executed.lock().clone()
    }

    /// Drain timeouts passed to close, in order.
    #[must_use]
    pub fn drains(&self) -> Vec<Duration> {
        self.state.drains.lock().clone()
    }

    /// Configurations pools were created from, in order.
    #[must_use]
    pub fn configs(&self) -> Vec<PoolConfig> {
        self.state.configs.lock().clone()
    }

    fn faulty(&self, fault: Fault) -> bool {
        self.state.faults.lock().contains(&fault)
    }

    fn response(&self, sql: &str) -> ResultSet {
        self.state
            .responses
            .lock()
            .get(sql)
            .cloned()
            .unwrap_or_else(|| self.state.fallback.lock().clone())
    }
}

impl std::fmt::Debug for ScriptedDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedDriver")
            .field("pools_created", &self.pools_created())
            .field("pools_closed", &self.pools_closed())
            .field("acquires", &self.acquires())
            .finish()
    }
}

#[async_trait]
impl Driver for ScriptedDriver {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        *self.state.style.lock()
    }

    async fn create_pool(&self, config: &PoolConfig) -> Result<Arc<dyn DriverPool>, DriverError> {
        let delay = *self.state.create_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.faulty(Fault::CreatePool) {
            return Err(DriverError::new("scripted: listener refused connection"));
        }

        self.state.configs.lock().push(config.clone());
        self.state.pools_created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(ScriptedPool {
            driver: self.clone(),
            closed: AtomicBool::new(false),
        }))
    }
}

struct ScriptedPool {
    driver: ScriptedDriver,
    closed: AtomicBool,
}

#[async_trait]
impl DriverPool for ScriptedPool {
    async fn acquire(&self) -> Result<Box<dyn DriverConnection>, DriverError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(DriverError::new("scripted: pool is closed"));
        }
        if self.driver.faulty(Fault::Acquire) {
            return Err(DriverError::new("scripted: pool exhausted"));
        }

        self.driver.state.acquires.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedConnection {
            driver: self.driver.clone(),
        }))
    }

    async fn close(&self, drain: Duration) -> Result<(), DriverError> {
        self.driver.state.drains.lock().push(drain);
        if self.driver.faulty(Fault::Close) {
            return Err(DriverError::new("scripted: close timed out"));
        }
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(DriverError::new("scripted: pool already closed"));
        }

        self.driver.state.pools_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct ScriptedConnection {
    driver: ScriptedDriver,
}

#[async_trait]
impl DriverConnection for ScriptedConnection {
    async fn execute(
        &mut self,
        statement: &BoundStatement,
        options: &ExecuteOptions,
    ) -> Result<ResultSet, DriverError> {
        let delay = *self.driver.state.execute_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.driver.state.executed.lock().push(ExecutedStatement {
            sql: statement.sql().to_string(),
            params: statement.params().to_vec(),
            style: statement.style(),
            lob_as_text: options.lob_as_text,
        });

        if self.driver.faulty(Fault::Execute) {
            return Err(DriverError::with_source(
                "scripted: statement failed",
                io::Error::other("table or view does not exist"),
            ));
        }
        Ok(self.driver.response(statement.sql()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pooldb_pool::Column;

    use super::*;

    fn one_row() -> ResultSet {
        ResultSet::new(vec![Column::new("N", "INT4")], vec![vec![SqlValue::Int(1)]])
    }

    #[tokio::test]
    async fn test_scripted_response() {
        let driver = ScriptedDriver::new();
        driver.respond("SELECT 1", one_row());

        let pool = driver.create_pool(&PoolConfig::new()).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let hit = conn
            .execute(&BoundStatement::unbound("SELECT 1"), &ExecuteOptions::default())
            .await
            .unwrap();
        let miss = conn
            .execute(&BoundStatement::unbound("SELECT 2"), &ExecuteOptions::default())
            .await
            .unwrap();

        assert_eq!(hit.len(), 1);
        assert!(miss.is_empty());
        assert_eq!(driver.executed().len(), 2);
    }

    #[tokio::test]
    async fn test_faults() {
        let driver = ScriptedDriver::new();
        driver.fail(Fault::CreatePool);
        assert!(driver.create_pool(&PoolConfig::new()).await.is_err());

        driver.heal(Fault::CreatePool);
        let pool = driver.create_pool(&PoolConfig::new()).await.unwrap();

        driver.fail(Fault::Acquire);
        assert!(pool.acquire().await.is_err());
        assert_eq!(driver.acquires(), 0);
    }

    #[tokio::test]
    async fn test_closed_pool_refuses_work() {
        let driver = ScriptedDriver::new();
        let pool = driver.create_pool(&PoolConfig::new()).await.unwrap();

        pool.close(Duration::ZERO).await.unwrap();
        assert!(pool.acquire().await.is_err());
        assert!(pool.close(Duration::ZERO).await.is_err());
        assert_eq!(driver.pools_closed(), 1);
        assert_eq!(driver.open_pools(), 0);
    }
}
