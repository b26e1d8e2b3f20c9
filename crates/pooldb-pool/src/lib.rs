//! # pooldb-pool
//!
//! Lifecycle management for the single named connection pool a process
//! talks to its database through.
//!
//! The pool is created lazily on first use from environment-derived
//! credentials, every query leases a connection from it, and the pool is
//! torn down again once the query is done. Creation and teardown for an
//! alias are serialized: concurrent cold-start callers create the pool
//! once, and `close` waits for in-flight leases before tearing it down.
//!
//! The backend is reached through the [`Driver`] seam, so the same manager
//! runs against PostgreSQL in production and a scripted driver in tests.
//!
//! ## Example
//!
//! ```rust,ignore
//! use pooldb_pool::{ConnectionPoolManager, PoolConfig};
//!
//! let manager = ConnectionPoolManager::new(PoolConfig::from_env(), driver);
//!
//! if let Some(mut conn) = manager.connect().await {
//!     let result = conn.execute(&statement, &Default::default()).await?;
//!     drop(conn);
//! }
//! manager.close().await;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod pool;
pub mod registry;

// Configuration
pub use config::{DEFAULT_POOL_ALIAS, PoolConfig};

// Error types
pub use error::{DriverError, PoolError};

// Pool types
pub use pool::{ConnectionPoolManager, PoolBuilder, PoolMetrics, PoolStatus, PooledConnection};

// Driver seam
pub use lifecycle::{
    Column, ConnectionMetadata, Driver, DriverConnection, DriverPool, ExecuteOptions, ResultSet,
};

pub use registry::PoolRegistry;
