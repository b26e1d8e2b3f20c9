//! Error types for query execution.

use pooldb_bind::BindError;
use pooldb_pool::{DriverError, PoolError};
use thiserror::Error;

/// Result type for query execution.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a query call produced no rows.
#[derive(Debug, Error)]
pub enum Error {
    /// Credentials are missing.
    #[error("{0}")]
    Configuration(#[source] PoolError),

    /// The driver refused to create the pool.
    #[error("{0}")]
    PoolCreation(#[source] PoolError),

    /// No connection could be leased.
    #[error("{0}")]
    Acquisition(#[source] PoolError),

    /// The query could not be translated for the driver.
    #[error("failed to build query: {0}")]
    Binding(#[from] BindError),

    /// The query ran but returned no rows.
    #[error("no data found for given filters")]
    NoData,

    /// The driver failed to run the statement.
    #[error("query execution failed: {0}")]
    Execution(#[source] DriverError),

    /// The pool could not be closed.
    #[error("{0}")]
    Teardown(#[source] PoolError),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing credentials.
    Configuration,
    /// Pool creation failed.
    PoolCreation,
    /// Connection lease failed.
    Acquisition,
    /// Query translation failed.
    Binding,
    /// Empty result.
    NoData,
    /// Statement execution failed.
    Execution,
    /// Pool close failed.
    Teardown,
}

impl Error {
    /// Classify the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::PoolCreation(_) => ErrorKind::PoolCreation,
            Self::Acquisition(_) => ErrorKind::Acquisition,
            Self::Binding(_) => ErrorKind::Binding,
            Self::NoData => ErrorKind::NoData,
            Self::Execution(_) => ErrorKind::Execution,
            Self::Teardown(_) => ErrorKind::Teardown,
        }
    }

    /// Whether the query simply matched nothing.
    #[must_use]
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }
}

impl From<PoolError> for Error {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::Configuration { .. } => Self::Configuration(err),
            PoolError::Creation(_) | PoolError::DuplicateAlias { .. } => Self::PoolCreation(err),
            PoolError::NoActivePool { .. } | PoolError::Acquisition(_) => Self::Acquisition(err),
            PoolError::Teardown(_) => Self::Teardown(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_errors_are_classified() {
        let missing = PoolError::Configuration {
            missing: vec!["DB_URI"],
        };
        assert_eq!(Error::from(missing).kind(), ErrorKind::Configuration);

        let refused = PoolError::Creation(DriverError::new("listener refused"));
        assert_eq!(Error::from(refused).kind(), ErrorKind::PoolCreation);

        let absent = PoolError::NoActivePool {
            alias: "default".into(),
        };
        assert_eq!(Error::from(absent).kind(), ErrorKind::Acquisition);
    }

    #[test]
    fn test_binding_message() {
        let err = Error::from(BindError::MissingParameter { name: "id".into() });
        assert_eq!(err.kind(), ErrorKind::Binding);
        assert!(err.to_string().starts_with("failed to build query"));
    }

    #[test]
    fn test_no_data_message() {
        assert_eq!(Error::NoData.to_string(), "no data found for given filters");
        assert!(Error::NoData.is_no_data());
    }

    #[test]
    fn test_configuration_message_is_not_prefixed_twice() {
        let err = Error::from(PoolError::Configuration {
            missing: vec!["DB_URI"],
        });
        assert_eq!(err.to_string(), "missing database configuration: DB_URI");
    }

    #[test]
    fn test_execution_message_keeps_driver_cause() {
        let cause = std::io::Error::other("relation \"t\" does not exist");
        let err = Error::Execution(DriverError::with_source("postgres query failed", cause));
        assert_eq!(
            err.to_string(),
            "query execution failed: postgres query failed: relation \"t\" does not exist"
        );
    }
}
