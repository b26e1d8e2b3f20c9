//! Tagged result of one query call.

use crate::error::{Error, ErrorKind, Result};
use crate::row::Row;

/// What a query call produced.
///
/// [`QueryOutcome::into_rows`] collapses every variant to the plain
/// row-of-strings shape callers of [`Database`](crate::Database) see; the
/// tag is there for callers that need to tell "nothing matched" from
/// "something broke".
#[derive(Debug)]
pub enum QueryOutcome {
    /// At least one row.
    Rows(Vec<Row>),
    /// The query ran and matched nothing.
    Empty,
    /// The call failed before rows could be produced.
    Failed(Error),
}

impl QueryOutcome {
    /// Build an outcome from an execution result.
    #[must_use]
    pub fn from_result(result: Result<Vec<Row>>) -> Self {
        match result {
            Ok(rows) if rows.is_empty() => Self::Empty,
            Ok(rows) => Self::Rows(rows),
            Err(Error::NoData) => Self::Empty,
            Err(e) => Self::Failed(e),
        }
    }

    /// Whether there are rows.
    #[must_use]
    pub fn has_rows(&self) -> bool {
        matches!(self, Self::Rows(_))
    }

    /// Whether the call failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The failure, if any.
    #[must_use]
    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Kind of the failure. [`Empty`](Self::Empty) reports
    /// [`ErrorKind::NoData`].
    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Rows(_) => None,
            Self::Empty => Some(ErrorKind::NoData),
            Self::Failed(e) => Some(e.kind()),
        }
    }

    /// Rows, keeping typed values. Empty for every non-row outcome.
    #[must_use]
    pub fn rows(self) -> Vec<Row> {
        match self {
            Self::Rows(rows) => rows,
            Self::Empty | Self::Failed(_) => Vec::new(),
        }
    }

    /// Rows as text, every value rendered with
    /// [`SqlValue::to_text`](pooldb_types::SqlValue::to_text).
    #[must_use]
    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows().iter().map(Row::to_text).collect()
    }

    /// Convert to a `Result`, with [`Empty`](Self::Empty) reported as
    /// [`Error::NoData`].
    pub fn into_result(self) -> Result<Vec<Row>> {
        match self {
            Self::Rows(rows) => Ok(rows),
            Self::Empty => Err(Error::NoData),
            Self::Failed(e) => Err(e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use pooldb_bind::BindError;
    use pooldb_pool::Column;
    use pooldb_types::SqlValue;

    use super::*;

    fn one_row() -> Vec<Row> {
        let columns: Arc<[Column]> = vec![Column::new("N", "INT4")].into();
        vec![Row::new(columns, vec![SqlValue::Int(7)])]
    }

    #[test]
    fn test_no_data_is_empty() {
        let outcome = QueryOutcome::from_result(Err(Error::NoData));
        assert!(matches!(outcome, QueryOutcome::Empty));
        assert_eq!(outcome.error_kind(), Some(ErrorKind::NoData));
        assert!(outcome.into_rows().is_empty());
    }

    #[test]
    fn test_failure_collapses_to_no_rows() {
        let outcome = QueryOutcome::from_result(Err(BindError::EmptyQuery.into()));
        assert!(outcome.is_failed());
        assert_eq!(outcome.error_kind(), Some(ErrorKind::Binding));
        assert!(outcome.into_rows().is_empty());
    }

    #[test]
    fn test_rows_render_as_text() {
        let outcome = QueryOutcome::from_result(Ok(one_row()));
        assert!(outcome.has_rows());
        assert_eq!(outcome.into_rows(), vec![vec!["7".to_string()]]);
    }

    #[test]
    fn test_into_result() {
        assert!(QueryOutcome::Empty.into_result().unwrap_err().is_no_data());
        assert_eq!(QueryOutcome::Rows(one_row()).into_result().unwrap().len(), 1);
    }
}
