//! Conversions from [`SqlValue`] into Rust values.

use crate::{SqlValue, TypeError};

/// A Rust type that can be read out of a result column.
pub trait FromSql: Sized {
    /// Convert a non-NULL SQL value.
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError>;

    /// Convert a possibly-NULL SQL value, mapping NULL to `None`.
    fn from_sql_nullable(value: &SqlValue) -> Result<Option<Self>, TypeError> {
        if value.is_null() {
            Ok(None)
        } else {
            Self::from_sql(value).map(Some)
        }
    }
}

fn mismatch(expected: &'static str, value: &SqlValue) -> TypeError {
    TypeError::TypeMismatch {
        expected,
        actual: value.type_name().to_string(),
    }
}

impl FromSql for String {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        match value {
            SqlValue::Null => Err(TypeError::UnexpectedNull),
            other => Ok(other.to_text()),
        }
    }
}

impl FromSql for bool {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        match value {
            SqlValue::Bool(b) => Ok(*b),
            SqlValue::Int(v) => Ok(*v != 0),
            SqlValue::BigInt(v) => Ok(*v != 0),
            SqlValue::Null => Err(TypeError::UnexpectedNull),
            other => Err(mismatch("bool", other)),
        }
    }
}

impl FromSql for i64 {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        match value {
            SqlValue::Int(v) => Ok(i64::from(*v)),
            SqlValue::BigInt(v) => Ok(*v),
            SqlValue::Decimal(s) | SqlValue::String(s) => {
                s.trim().parse().map_err(|_| TypeError::Parse {
                    target: "i64",
                    value: s.clone(),
                })
            }
            SqlValue::Null => Err(TypeError::UnexpectedNull),
            other => Err(mismatch("i64", other)),
        }
    }
}

impl FromSql for i32 {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        let wide = i64::from_sql(value)?;
        i32::try_from(wide).map_err(|_| TypeError::OutOfRange {
            target: "i32",
            value: wide.to_string(),
        })
    }
}

impl FromSql for f64 {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        match value {
            SqlValue::Float(v) => Ok(*v),
            SqlValue::Int(v) => Ok(f64::from(*v)),
            SqlValue::BigInt(v) => Ok(*v as f64),
            SqlValue::Decimal(s) | SqlValue::String(s) => {
                s.trim().parse().map_err(|_| TypeError::Parse {
                    target: "f64",
                    value: s.clone(),
                })
            }
            SqlValue::Null => Err(TypeError::UnexpectedNull),
            other => Err(mismatch("f64", other)),
        }
    }
}

impl FromSql for SqlValue {
    fn from_sql(value: &SqlValue) -> Result<Self, TypeError> {
        Ok(value.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_string_from_any_non_null() {
        assert_eq!(String::from_sql(&SqlValue::Int(3)).unwrap(), "3");
        assert_eq!(
            String::from_sql(&SqlValue::Null),
            Err(TypeError::UnexpectedNull)
        );
    }

    #[test]
    fn test_nullable_maps_null_to_none() {
        assert_eq!(i32::from_sql_nullable(&SqlValue::Null).unwrap(), None);
        assert_eq!(i32::from_sql_nullable(&SqlValue::Int(5)).unwrap(), Some(5));
    }

    #[test]
    fn test_decimal_text_parses() {
        assert_eq!(i64::from_sql(&SqlValue::Decimal("12".into())).unwrap(), 12);
        assert!(matches!(
            i64::from_sql(&SqlValue::Decimal("1.5".into())),
            Err(TypeError::Parse { target: "i64", .. })
        ));
    }

    #[test]
    fn test_i32_out_of_range() {
        assert!(matches!(
            i32::from_sql(&SqlValue::BigInt(i64::MAX)),
            Err(TypeError::OutOfRange { target: "i32", .. })
        ));
    }
}
