//! # pooldb-postgres
//!
//! PostgreSQL backend for the pooldb pool manager, built on `sqlx`.
//!
//! Statements are sent with `$n` placeholders and every column is decoded
//! into a [`SqlValue`](pooldb_types::SqlValue) by its PostgreSQL type name.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use pooldb_client::{Binds, Config, QueryExecutor};
//! use pooldb_postgres::PgDriver;
//!
//! let config = Config::from_env();
//! let executor = QueryExecutor::from_config(&config, Arc::new(PgDriver::new()));
//!
//! let rows = executor
//!     .run_query("SELECT name FROM users WHERE id = :id", &Binds::new().bind("id", 7))
//!     .await;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
mod decode;
pub mod driver;
mod encode;

pub use config::{PgDriverConfig, connect_options};
pub use driver::PgDriver;
