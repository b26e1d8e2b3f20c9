//! # pooldb-testing
//!
//! Test infrastructure for pooldb.
//!
//! - [`ScriptedDriver`]: in-memory [`Driver`](pooldb_pool::Driver) with
//!   canned results, fault injection and call counters
//! - [`LogCapture`]: collects formatted log records for assertions
//! - [`fixtures`]: credentials, result sets and isolated managers
//!
//! ## Example
//!
//! ```rust,ignore
//! use pooldb_testing::{ScriptedDriver, fixtures};
//!
//! let driver = ScriptedDriver::new();
//! driver.respond_any(fixtures::result_set(&["ID"], vec![vec![SqlValue::Int(7)]]));
//!
//! let executor = fixtures::executor(&driver);
//! assert_eq!(executor.run_query("SELECT 7", &Binds::new()).await, vec![vec!["7"]]);
//! assert_eq!(driver.pools_closed(), 1);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod driver;
pub mod fixtures;
pub mod logs;

pub use driver::{ExecutedStatement, Fault, ScriptedDriver};
pub use logs::LogCapture;
