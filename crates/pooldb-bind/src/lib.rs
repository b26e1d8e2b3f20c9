//! # pooldb-bind
//!
//! Rewrites a templated query with named placeholders (`:name`) into a
//! statement with positional placeholders plus the ordered parameter list
//! a driver can bind.
//!
//! The scanner understands just enough SQL lexing to leave placeholders
//! alone where they are not placeholders:
//!
//! - single-quoted string literals (with `''` escapes)
//! - double-quoted identifiers
//! - `--` line comments and `/* */` block comments
//! - PostgreSQL `::` casts
//!
//! ## Example
//!
//! ```
//! use pooldb_bind::{translate, PlaceholderStyle};
//! use pooldb_types::{Binds, SqlValue};
//!
//! let binds = Binds::new().bind("id", 7);
//! let stmt = translate("SELECT * FROM T WHERE ID = :id", &binds, PlaceholderStyle::Dollar)?;
//!
//! assert_eq!(stmt.sql(), "SELECT * FROM T WHERE ID = $1");
//! assert_eq!(stmt.params(), &[SqlValue::Int(7)]);
//! # Ok::<(), pooldb_bind::BindError>(())
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod statement;
pub mod translate;

pub use error::BindError;
pub use statement::{BoundStatement, PlaceholderStyle};
pub use translate::{placeholder_names, translate};
