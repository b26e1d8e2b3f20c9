//! Bind translation errors.

use thiserror::Error;

/// Errors that can occur while translating a templated query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// The query text is empty or whitespace.
    #[error("query is empty")]
    EmptyQuery,

    /// A placeholder has no value in the supplied binds.
    #[error("missing value for bind parameter :{name}")]
    MissingParameter {
        /// Placeholder name without the leading colon.
        name: String,
    },

    /// A quoted literal or identifier is never closed.
    #[error("unterminated {kind} starting at byte {position}")]
    Unterminated {
        /// What was left open.
        kind: &'static str,
        /// Byte offset where it starts.
        position: usize,
    },
}
