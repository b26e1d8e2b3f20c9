//! Executor configuration.

use pooldb_pool::{ExecuteOptions, PoolConfig};

use crate::instrumentation::StatementLog;
use crate::logging::LogConfig;

/// What happens to the pool after a query call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TeardownPolicy {
    /// Close the pool after every call, success or failure.
    #[default]
    ClosePool,
    /// Release the connection and keep the pool for the next call.
    KeepPool,
}

impl TeardownPolicy {
    /// Whether the pool is closed after each call.
    #[must_use]
    pub fn closes_pool(self) -> bool {
        matches!(self, Self::ClosePool)
    }
}

/// Everything an executor needs, usually read from the environment.
///
/// # Example
///
/// ```
/// use pooldb_client::{Config, TeardownPolicy};
///
/// let config = Config::from_lookup(|key| match key {
///     "DB_URI" => Some("postgres://localhost/app".into()),
///     "DB_LOG_LEVEL" => Some("warn".into()),
///     _ => None,
/// });
///
/// assert_eq!(config.teardown, TeardownPolicy::ClosePool);
/// assert!(config.pool.user.is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Pool credentials.
    pub pool: PoolConfig,
    /// Log threshold and destinations.
    pub logging: LogConfig,
    /// Pool teardown after each call.
    pub teardown: TeardownPolicy,
    /// Options passed to every statement.
    pub execute: ExecuteOptions,
    /// How statements appear in log records.
    pub statement_log: StatementLog,
}

impl Config {
    /// Create a configuration with defaults and no credentials.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read pool and logging settings from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read pool and logging settings from an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            pool: PoolConfig::from_lookup(&lookup),
            logging: LogConfig::from_lookup(&lookup),
            ..Self::default()
        }
    }

    /// Set the pool configuration.
    #[must_use]
    pub fn pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    /// Set the logging configuration.
    #[must_use]
    pub fn logging(mut self, logging: LogConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Set the teardown policy.
    #[must_use]
    pub fn teardown(mut self, teardown: TeardownPolicy) -> Self {
        self.teardown = teardown;
        self
    }

    /// Set how statements are logged.
    #[must_use]
    pub fn statement_log(mut self, statement_log: StatementLog) -> Self {
        self.statement_log = statement_log;
        self
    }
}
