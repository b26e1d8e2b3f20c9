//! Type conversion errors.

use thiserror::Error;

/// Errors that can occur while converting between Rust and SQL values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// The SQL value cannot be represented as the requested Rust type.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Expected type description.
        expected: &'static str,
        /// Description of the value that was found.
        actual: String,
    },

    /// A NULL was found where a value was required.
    #[error("unexpected NULL value")]
    UnexpectedNull,

    /// A numeric value does not fit in the requested type.
    #[error("value out of range for {target}: {value}")]
    OutOfRange {
        /// Target type name.
        target: &'static str,
        /// Offending value rendered as text.
        value: String,
    },

    /// Text could not be parsed into the requested type.
    #[error("invalid {target} text: {value:?}")]
    Parse {
        /// Target type name.
        target: &'static str,
        /// Offending text.
        value: String,
    },
}
