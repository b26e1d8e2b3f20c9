//! # pooldb-types
//!
//! Value model shared by every pooldb crate.
//!
//! - [`SqlValue`]: a single column or parameter value as it crosses the
//!   driver boundary.
//! - [`ToSql`] / [`FromSql`]: conversions between Rust values and
//!   [`SqlValue`].
//! - [`Binds`]: the named-parameter mapping passed alongside a templated
//!   query.
//!
//! Result rows are normalized to text with [`SqlValue::to_text`], which is
//! the representation returned by the query executor.
//!
//! ## Example
//!
//! ```
//! use pooldb_types::{Binds, SqlValue};
//!
//! let binds = Binds::new().bind("id", 7).bind("name", "X");
//! assert_eq!(binds.get("id"), Some(&SqlValue::Int(7)));
//! assert_eq!(SqlValue::Int(7).to_text(), "7");
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod binds;
pub mod error;
pub mod from_sql;
pub mod to_sql;
pub mod value;

pub use binds::Binds;
pub use error::TypeError;
pub use from_sql::FromSql;
pub use to_sql::ToSql;
pub use value::SqlValue;
