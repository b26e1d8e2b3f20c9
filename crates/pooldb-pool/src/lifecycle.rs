//! Driver seam and connection metadata.
//!
//! A backend plugs into the pool manager by implementing three traits:
//!
//! - [`Driver`]: creates a pool from a [`PoolConfig`]
//! - [`DriverPool`]: hands out connections and closes the pool
//! - [`DriverConnection`]: executes one bound statement
//!
//! The manager owns all lifecycle bookkeeping (registry, leases, metrics,
//! logging); drivers only talk to the backend.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use pooldb_bind::{BoundStatement, PlaceholderStyle};
use pooldb_types::SqlValue;

use crate::config::PoolConfig;
use crate::error::DriverError;

/// A database backend that can create connection pools.
#[async_trait]
pub trait Driver: Send + Sync + 'static {
    /// Short backend name for logs (`"postgres"`, `"scripted"`...).
    fn name(&self) -> &'static str;

    /// Positional placeholder syntax the backend expects.
    fn placeholder_style(&self) -> PlaceholderStyle;

    /// Create a pool from validated credentials.
    async fn create_pool(&self, config: &PoolConfig) -> Result<Arc<dyn DriverPool>, DriverError>;
}

/// A live pool created by a [`Driver`].
#[async_trait]
pub trait DriverPool: Send + Sync {
    /// Lease a connection.
    async fn acquire(&self) -> Result<Box<dyn DriverConnection>, DriverError>;

    /// Close the pool, waiting at most `drain` for in-flight work.
    async fn close(&self, drain: Duration) -> Result<(), DriverError>;
}

/// A leased backend connection.
#[async_trait]
pub trait DriverConnection: Send {
    /// Execute a statement and collect every row.
    async fn execute(
        &mut self,
        statement: &BoundStatement,
        options: &ExecuteOptions,
    ) -> Result<ResultSet, DriverError>;
}

/// Per-statement execution options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecuteOptions {
    /// Materialize large-object columns as text instead of handles.
    pub lob_as_text: bool,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self { lob_as_text: true }
    }
}

/// Column metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Backend type name.
    pub type_name: String,
}

impl Column {
    /// Create column metadata.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Rows returned by a statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// Column metadata, in select-list order.
    pub columns: Vec<Column>,
    /// Row values, each aligned with `columns`.
    pub rows: Vec<Vec<SqlValue>>,
}

impl ResultSet {
    /// Create a result set.
    #[must_use]
    pub fn new(columns: Vec<Column>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self { columns, rows }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the statement returned no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Metadata about a leased connection.
#[derive(Debug, Clone)]
pub struct ConnectionMetadata {
    /// Connection ID, unique per manager.
    pub id: u64,
    /// Alias of the pool the connection came from.
    pub pool_alias: &'static str,
    /// Generation of the pool: increments every time the pool is recreated.
    pub pool_generation: u64,
    /// When the connection was leased.
    pub acquired_at: Instant,
}

impl ConnectionMetadata {
    /// Create metadata for a fresh lease.
    #[must_use]
    pub fn new(id: u64, pool_alias: &'static str, pool_generation: u64) -> Self {
        Self {
            id,
            pool_alias,
            pool_generation,
            acquired_at: Instant::now(),
        }
    }

    /// How long the lease has been held.
    #[must_use]
    pub fn held_for(&self) -> Duration {
        self.acquired_at.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lob_as_text_by_default() {
        assert!(ExecuteOptions::default().lob_as_text);
    }

    #[test]
    fn test_result_set_len() {
        let rs = ResultSet::new(
            vec![Column::new("ID", "NUMBER")],
            vec![vec![SqlValue::Int(1)], vec![SqlValue::Int(2)]],
        );
        assert_eq!(rs.len(), 2);
        assert!(!rs.is_empty());
        assert!(ResultSet::default().is_empty());
    }

    #[test]
    fn test_metadata() {
        let meta = ConnectionMetadata::new(3, "default", 1);
        assert_eq!(meta.id, 3);
        assert_eq!(meta.pool_alias, "default");
        assert!(meta.held_for() < Duration::from_secs(60));
    }
}
