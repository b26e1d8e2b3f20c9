//! Pool error types.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An error reported by a backend driver.
///
/// The wrapped source, if any, is part of the message.
#[derive(Debug, Error)]
#[error("{message}{}", .source.as_ref().map(|s| format!(": {s}")).unwrap_or_default())]
pub struct DriverError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl DriverError {
    /// Create a driver error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create a driver error wrapping an underlying error.
    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors that can occur during pool operations.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Credentials needed to create the pool are missing.
    #[error("missing database configuration: {}", .missing.join(", "))]
    Configuration {
        /// Names of the missing environment variables.
        missing: Vec<&'static str>,
    },

    /// The driver rejected the pool parameters.
    #[error("failed to create connection pool: {0}")]
    Creation(#[source] DriverError),

    /// A pool is already registered under this alias.
    #[error("connection pool '{alias}' already exists")]
    DuplicateAlias {
        /// Pool alias.
        alias: String,
    },

    /// No pool is registered under this alias.
    #[error("no active connection pool '{alias}'")]
    NoActivePool {
        /// Pool alias.
        alias: String,
    },

    /// A connection could not be obtained from the pool.
    #[error("failed to acquire connection: {0}")]
    Acquisition(#[source] DriverError),

    /// The driver failed to close the pool.
    #[error("failed to close connection pool: {0}")]
    Teardown(#[source] DriverError),
}

impl PoolError {
    /// Whether this error happened while bringing the pool up.
    #[must_use]
    pub fn is_creation(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. } | Self::Creation(_) | Self::DuplicateAlias { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_configuration_message_lists_keys() {
        let err = PoolError::Configuration {
            missing: vec!["DB_URI", "DB_PWD"],
        };
        assert_eq!(
            err.to_string(),
            "missing database configuration: DB_URI, DB_PWD"
        );
        assert!(err.is_creation());
    }

    #[test]
    fn test_driver_error_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = PoolError::Acquisition(DriverError::with_source("connect failed", io));

        assert_eq!(
            err.to_string(),
            "failed to acquire connection: connect failed: refused"
        );
        let driver = err.source().and_then(|e| e.source());
        assert_eq!(driver.map(ToString::to_string).as_deref(), Some("refused"));
        assert!(!err.is_creation());
    }

    #[test]
    fn test_driver_error_without_source() {
        let err = DriverError::new("pool exhausted");
        assert_eq!(err.to_string(), "pool exhausted");
        assert_eq!(err.message(), "pool exhausted");
    }
}
