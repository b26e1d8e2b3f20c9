//! Row representation for query results.

use std::sync::Arc;

use pooldb_pool::{Column, ResultSet};
use pooldb_types::{FromSql, SqlValue, TypeError};

/// A row from a query result.
///
/// Rows of one result share their column metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[Column]>,
    values: Vec<SqlValue>,
}

impl Row {
    /// Create a row from shared columns and its values.
    #[must_use]
    pub fn new(columns: Arc<[Column]>, values: Vec<SqlValue>) -> Self {
        Self { columns, values }
    }

    /// Split a result set into rows.
    #[must_use]
    pub fn from_result_set(result: ResultSet) -> Vec<Row> {
        let columns: Arc<[Column]> = result.columns.into();
        result
            .rows
            .into_iter()
            .map(|values| Row::new(Arc::clone(&columns), values))
            .collect()
    }

    /// Get a value by column index.
    pub fn get<T: FromSql>(&self, index: usize) -> Result<T, TypeError> {
        self.values
            .get(index)
            .ok_or_else(|| TypeError::TypeMismatch {
                expected: "valid column index",
                actual: format!("index {index} out of bounds"),
            })
            .and_then(T::from_sql)
    }

    /// Get a value by column name, ignoring ASCII case.
    pub fn get_by_name<T: FromSql>(&self, name: &str) -> Result<T, TypeError> {
        let index = self
            .position(name)
            .ok_or_else(|| TypeError::TypeMismatch {
                expected: "valid column name",
                actual: format!("column '{name}' not found"),
            })?;

        self.get(index)
    }

    /// Get a value by column index, returning None if NULL, absent or of
    /// the wrong type.
    pub fn try_get<T: FromSql>(&self, index: usize) -> Option<T> {
        self.values
            .get(index)
            .and_then(|v| T::from_sql_nullable(v).ok().flatten())
    }

    /// Get the raw SQL value by index.
    #[must_use]
    pub fn get_raw(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    /// Get the number of columns in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the column metadata.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Iterate over (column, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Column, &SqlValue)> {
        self.columns.iter().zip(self.values.iter())
    }

    /// Every value as text, in column order. NULL becomes the empty string.
    #[must_use]
    pub fn to_text(&self) -> Vec<String> {
        self.values.iter().map(SqlValue::to_text).collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }
}

impl IntoIterator for Row {
    type Item = SqlValue;
    type IntoIter = std::vec::IntoIter<SqlValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a SqlValue;
    type IntoIter = std::slice::Iter<'a, SqlValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
