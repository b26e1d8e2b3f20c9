//! The `SqlValue` enum and its text normalization.

use std::fmt::{self, Write as _};

use bytes::Bytes;

/// A SQL value as it crosses the driver boundary.
///
/// Drivers decode result columns into this enum and bind parameters are
/// encoded from it. Large objects have their own variants so that drivers
/// can honor a "materialize as text" request and callers can tell a CLOB
/// from a short string when they care.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL NULL.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    BigInt(i64),
    /// Double-precision float.
    Float(f64),
    /// Exact numeric carried as its decimal text (NUMERIC/DECIMAL).
    Decimal(String),
    /// Character data.
    String(String),
    /// Character large object, materialized as text.
    Clob(String),
    /// Binary data.
    Binary(Bytes),
    /// Binary large object.
    Blob(Bytes),
    /// UUID value.
    #[cfg(feature = "uuid")]
    Uuid(uuid::Uuid),
    /// Calendar date.
    #[cfg(feature = "chrono")]
    Date(chrono::NaiveDate),
    /// Date and time without zone.
    #[cfg(feature = "chrono")]
    DateTime(chrono::NaiveDateTime),
    /// Date and time with UTC offset.
    #[cfg(feature = "chrono")]
    DateTimeOffset(chrono::DateTime<chrono::FixedOffset>),
}

impl SqlValue {
    /// Check if this value is NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the variant, used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Bool(_) => "BOOL",
            Self::Int(_) => "INT",
            Self::BigInt(_) => "BIGINT",
            Self::Float(_) => "FLOAT",
            Self::Decimal(_) => "DECIMAL",
            Self::String(_) => "STRING",
            Self::Clob(_) => "CLOB",
            Self::Binary(_) => "BINARY",
            Self::Blob(_) => "BLOB",
            #[cfg(feature = "uuid")]
            Self::Uuid(_) => "UUID",
            #[cfg(feature = "chrono")]
            Self::Date(_) => "DATE",
            #[cfg(feature = "chrono")]
            Self::DateTime(_) => "DATETIME",
            #[cfg(feature = "chrono")]
            Self::DateTimeOffset(_) => "DATETIMEOFFSET",
        }
    }

    /// Normalize this value to the text form returned in result rows.
    ///
    /// NULL becomes the empty string and binary data is lower-case hex.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Int(v) => v.to_string(),
            Self::BigInt(v) => v.to_string(),
            Self::Float(v) => v.to_string(),
            Self::Decimal(s) | Self::String(s) | Self::Clob(s) => s.clone(),
            Self::Binary(b) | Self::Blob(b) => hex(b),
            #[cfg(feature = "uuid")]
            Self::Uuid(u) => u.to_string(),
            #[cfg(feature = "chrono")]
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
            #[cfg(feature = "chrono")]
            Self::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
            #[cfg(feature = "chrono")]
            Self::DateTimeOffset(dt) => dt.to_rfc3339(),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        // Writing to a String cannot fail.
        let _ = write!(out, "{b:02x}");
    }
    out
}
