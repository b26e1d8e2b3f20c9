//! Translated statements and positional placeholder styles.

use std::fmt::Write as _;

use pooldb_types::SqlValue;

/// How positional placeholders are written in the translated SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceholderStyle {
    /// `$1`, `$2`, ... (PostgreSQL).
    #[default]
    Dollar,
    /// `?` for every parameter (MySQL, SQLite, ODBC).
    Question,
    /// `:1`, `:2`, ... (Oracle positional).
    Colon,
    /// `@p1`, `@p2`, ... (SQL Server).
    AtP,
}

impl PlaceholderStyle {
    /// Whether a repeated name can reuse the same positional slot.
    #[must_use]
    pub fn is_numbered(self) -> bool {
        !matches!(self, Self::Question)
    }

    /// Write the placeholder for the 1-based position `index`.
    pub(crate) fn write(self, out: &mut String, index: usize) {
        // Writing to a String cannot fail.
        let _ = match self {
            Self::Dollar => write!(out, "${index}"),
            Self::Question => write!(out, "?"),
            Self::Colon => write!(out, ":{index}"),
            Self::AtP => write!(out, "@p{index}"),
        };
    }
}

/// A statement ready for a driver: positional SQL plus ordered parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStatement {
    sql: String,
    params: Vec<SqlValue>,
    names: Vec<String>,
    style: PlaceholderStyle,
}

impl BoundStatement {
    pub(crate) fn new(
        sql: String,
        params: Vec<SqlValue>,
        names: Vec<String>,
        style: PlaceholderStyle,
    ) -> Self {
        Self {
            sql,
            params,
            names,
            style,
        }
    }

    /// A statement with no parameters.
    #[must_use]
    pub fn unbound(sql: impl Into<String>) -> Self {
        Self::new(sql.into(), Vec::new(), Vec::new(), PlaceholderStyle::default())
    }

    /// The translated SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Parameters in positional order.
    #[must_use]
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// Names of the parameters, aligned with [`params`](Self::params).
    #[must_use]
    pub fn param_names(&self) -> &[String] {
        &self.names
    }

    /// The placeholder style used in [`sql`](Self::sql).
    #[must_use]
    pub fn style(&self) -> PlaceholderStyle {
        self.style
    }
}
