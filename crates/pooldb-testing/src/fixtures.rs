//! Common test fixtures.

use std::sync::Arc;

use pooldb_client::{Config, QueryExecutor};
use pooldb_pool::{Column, ConnectionPoolManager, PoolConfig, PoolRegistry, ResultSet};
use pooldb_types::SqlValue;

use crate::driver::ScriptedDriver;

/// Complete credentials for a scripted pool.
#[must_use]
pub fn credentials() -> PoolConfig {
    PoolConfig::new()
        .connect_string("scripted://localhost/app")
        .user("app")
        .password("secret")
}

/// A result set with `TEXT` columns named `names`.
#[must_use]
pub fn result_set(names: &[&str], rows: Vec<Vec<SqlValue>>) -> ResultSet {
    let columns = names.iter().map(|name| Column::new(*name, "TEXT")).collect();
    ResultSet::new(columns, rows)
}

/// A manager over `driver` on its own registry, with complete credentials.
#[must_use]
pub fn manager(driver: &ScriptedDriver) -> ConnectionPoolManager {
    manager_with(driver, credentials())
}

/// A manager over `driver` on its own registry.
#[must_use]
pub fn manager_with(driver: &ScriptedDriver, config: PoolConfig) -> ConnectionPoolManager {
    ConnectionPoolManager::builder(Arc::new(driver.clone()))
        .config(config)
        .registry(Arc::new(PoolRegistry::new()))
        .build()
}

/// An executor over `driver` on its own registry, with complete credentials
/// and default options.
#[must_use]
pub fn executor(driver: &ScriptedDriver) -> QueryExecutor {
    QueryExecutor::new(manager(driver))
}

/// An executor over `driver` on its own registry, configured by `config`.
#[must_use]
pub fn executor_with(driver: &ScriptedDriver, config: &Config) -> QueryExecutor {
    QueryExecutor::with_pool(config, manager_with(driver, config.pool.clone()))
}
