//! Single-call query execution.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use pooldb_bind::translate;
use pooldb_pool::{ConnectionPoolManager, Driver, ExecuteOptions};
use pooldb_types::Binds;
use tracing::Instrument;

use crate::config::{Config, TeardownPolicy};
use crate::error::{Error, Result};
use crate::instrumentation::{self, QUERY_SPAN, StatementLog};
use crate::outcome::QueryOutcome;
use crate::row::Row;

/// Anything that can answer a parameterized query with text rows.
///
/// Implemented by [`QueryExecutor`]; depend on the trait to substitute a
/// fake in callers' tests.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run `query` with named `binds`. Empty on no match and on any failure.
    async fn run_query(&self, query: &str, binds: &Binds) -> Vec<Vec<String>>;
}

/// Runs a query per call against the managed pool.
///
/// Each call walks connect, translate, execute and teardown. Under the
/// default [`TeardownPolicy::ClosePool`] the pool is closed exactly once per
/// call whichever step failed, and the connection is released before that.
/// A call dropped before completion closes the pool on a spawned task.
#[derive(Debug)]
pub struct QueryExecutor {
    pool: ConnectionPoolManager,
    teardown: TeardownPolicy,
    options: ExecuteOptions,
    statement_log: StatementLog,
}

impl QueryExecutor {
    /// Create an executor over `pool` with default options.
    #[must_use]
    pub fn new(pool: ConnectionPoolManager) -> Self {
        Self {
            pool,
            teardown: TeardownPolicy::default(),
            options: ExecuteOptions::default(),
            statement_log: StatementLog::default(),
        }
    }

    /// Create an executor on the process-wide registry from `config`.
    #[must_use]
    pub fn from_config(config: &Config, driver: Arc<dyn Driver>) -> Self {
        Self::with_pool(config, ConnectionPoolManager::new(config.pool.clone(), driver))
    }

    /// Create an executor over an existing manager, taking the executor
    /// options from `config`.
    #[must_use]
    pub fn with_pool(config: &Config, pool: ConnectionPoolManager) -> Self {
        Self {
            pool,
            teardown: config.teardown,
            options: config.execute,
            statement_log: config.statement_log.clone(),
        }
    }

    /// Set the teardown policy.
    #[must_use]
    pub fn teardown(mut self, teardown: TeardownPolicy) -> Self {
        self.teardown = teardown;
        self
    }

    /// Set the options passed to every statement.
    #[must_use]
    pub fn execute_options(mut self, options: ExecuteOptions) -> Self {
        self.options = options;
        self
    }

    /// The pool manager.
    #[must_use]
    pub fn pool(&self) -> &ConnectionPoolManager {
        &self.pool
    }

    /// Run `query` and keep the cause of an empty result.
    pub async fn execute(&self, query: &str, binds: &Binds) -> QueryOutcome {
        let span = tracing::info_span!(
            QUERY_SPAN,
            operation = instrumentation::operation(query),
            alias = self.pool.alias(),
        );
        self.execute_inner(query, binds).instrument(span).await
    }

    async fn execute_inner(&self, query: &str, binds: &Binds) -> QueryOutcome {
        let started = Instant::now();

        let teardown = Teardown::arm(&self.pool, self.teardown);
        // The lease is dropped when `fetch` returns, before teardown takes
        // the pool's write lock.
        let result = self.fetch(query, binds).await;
        teardown.run().await;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(rows) => {
                tracing::debug!(rows = rows.len(), elapsed_ms, "query completed");
            }
            Err(e) => {
                let statement = self.statement_log.render(query);
                tracing::error!(
                    %statement,
                    kind = ?e.kind(),
                    error = %e,
                    elapsed_ms,
                    "query failed"
                );
            }
        }

        QueryOutcome::from_result(result)
    }

    async fn fetch(&self, query: &str, binds: &Binds) -> Result<Vec<Row>> {
        let mut conn = self.pool.try_connect().await?;
        let statement = translate(query, binds, self.pool.placeholder_style())?;

        let result = conn
            .execute(&statement, &self.options)
            .await
            .map_err(Error::Execution)?;
        drop(conn);

        if result.is_empty() {
            return Err(Error::NoData);
        }
        Ok(Row::from_result_set(result))
    }
}

/// Closes the pool once per call, even when the call's future is dropped
/// before it completes.
struct Teardown {
    pool: Option<ConnectionPoolManager>,
}

impl Teardown {
    fn arm(pool: &ConnectionPoolManager, policy: TeardownPolicy) -> Self {
        Self {
            pool: policy.closes_pool().then(|| pool.clone()),
        }
    }

    async fn run(mut self) {
        if let Some(pool) = self.pool.take() {
            pool.close().await;
        }
    }
}

impl Drop for Teardown {
    fn drop(&mut self) {
        let Some(pool) = self.pool.take() else {
            return;
        };
        // The cancelled call may still hold its lease; the spawned close
        // waits for it.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::debug!(alias = pool.alias(), "query cancelled, closing pool");
                handle.spawn(
                    async move {
                        pool.close().await;
                    }
                    .in_current_span(),
                );
            }
            Err(_) => {
                tracing::warn!(
                    alias = pool.alias(),
                    "query cancelled outside a runtime, pool left open"
                );
            }
        }
    }
}

#[async_trait]
impl Database for QueryExecutor {
    async fn run_query(&self, query: &str, binds: &Binds) -> Vec<Vec<String>> {
        self.execute(query, binds).await.into_rows()
    }
}
