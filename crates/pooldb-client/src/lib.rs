//! # pooldb-client
//!
//! Runs one parameterized query end to end: make sure the pool exists,
//! lease a connection, translate the named binds, execute, normalize the
//! rows to text and tear the pool down again, whatever happened.
//!
//! ## Features
//!
//! - **Never fails**: [`QueryExecutor::run_query`] always resolves to a row
//!   sequence, empty on any failure
//! - **Tagged outcome**: [`QueryExecutor::execute`] keeps the cause
//!   ([`QueryOutcome`])
//! - **Guaranteed teardown**: the pool is closed exactly once per call
//! - **Leveled logging**: [`logging::init`] installs the console and log-file
//!   writers
//!
//! ## Example
//!
//! ```rust,ignore
//! use pooldb_client::{Binds, Config, QueryExecutor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env();
//!     let _logs = pooldb_client::logging::init(&config.logging)?;
//!
//!     let executor = QueryExecutor::from_config(&config, driver);
//!     let rows = executor
//!         .run_query(
//!             "SELECT * FROM invoices WHERE id = :id",
//!             &Binds::new().bind("id", 7),
//!         )
//!         .await;
//!
//!     for row in rows {
//!         println!("{}", row.join(" | "));
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod executor;
pub mod instrumentation;
pub mod logging;
pub mod outcome;
pub mod row;

// Re-export commonly used types
pub use config::{Config, TeardownPolicy};
pub use error::{Error, ErrorKind, Result};
pub use executor::{Database, QueryExecutor};
pub use outcome::QueryOutcome;
pub use pooldb_pool::{ConnectionPoolManager, PoolConfig};
pub use pooldb_types::{Binds, FromSql, SqlValue, ToSql};
pub use row::Row;
