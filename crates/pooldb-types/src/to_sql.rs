//! Conversions from Rust values into [`SqlValue`].

use bytes::Bytes;

use crate::SqlValue;

/// A Rust value that can be bound as a query parameter.
pub trait ToSql {
    /// Convert this value into a [`SqlValue`].
    fn to_sql(&self) -> SqlValue;
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> SqlValue {
        self.clone()
    }
}

impl<T: ToSql + ?Sized> ToSql for &T {
    fn to_sql(&self) -> SqlValue {
        (**self).to_sql()
    }
}

impl<T: ToSql> ToSql for Option<T> {
    fn to_sql(&self) -> SqlValue {
        match self {
            Some(v) => v.to_sql(),
            None => SqlValue::Null,
        }
    }
}

macro_rules! impl_to_sql {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ToSql for $ty {
                fn to_sql(&self) -> SqlValue {
                    SqlValue::$variant((*self).into())
                }
            }
        )*
    };
}

impl_to_sql! {
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    u8 => Int,
    u16 => Int,
    i64 => BigInt,
    u32 => BigInt,
    f32 => Float,
    f64 => Float,
}

impl ToSql for str {
    fn to_sql(&self) -> SqlValue {
        SqlValue::String(self.to_string())
    }
}

impl ToSql for String {
    fn to_sql(&self) -> SqlValue {
        SqlValue::String(self.clone())
    }
}

impl ToSql for [u8] {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Binary(Bytes::copy_from_slice(self))
    }
}

impl ToSql for Vec<u8> {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Binary(Bytes::copy_from_slice(self))
    }
}

impl ToSql for Bytes {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Binary(self.clone())
    }
}

#[cfg(feature = "uuid")]
impl ToSql for uuid::Uuid {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Uuid(*self)
    }
}

#[cfg(feature = "chrono")]
impl ToSql for chrono::NaiveDate {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Date(*self)
    }
}

#[cfg(feature = "chrono")]
impl ToSql for chrono::NaiveDateTime {
    fn to_sql(&self) -> SqlValue {
        SqlValue::DateTime(*self)
    }
}

#[cfg(feature = "chrono")]
impl ToSql for chrono::DateTime<chrono::FixedOffset> {
    fn to_sql(&self) -> SqlValue {
        SqlValue::DateTimeOffset(*self)
    }
}

#[cfg(feature = "chrono")]
impl ToSql for chrono::DateTime<chrono::Utc> {
    fn to_sql(&self) -> SqlValue {
        SqlValue::DateTimeOffset(self.fixed_offset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_widening() {
        assert_eq!(7u8.to_sql(), SqlValue::Int(7));
        assert_eq!(7i16.to_sql(), SqlValue::Int(7));
        assert_eq!(u32::MAX.to_sql(), SqlValue::BigInt(i64::from(u32::MAX)));
    }

    #[test]
    fn test_option_maps_none_to_null() {
        let none: Option<i32> = None;
        assert_eq!(none.to_sql(), SqlValue::Null);
        assert_eq!(Some("x").to_sql(), SqlValue::String("x".into()));
    }

    #[test]
    fn test_bytes_are_binary() {
        let v = vec![1u8, 2, 3];
        assert_eq!(v.to_sql(), SqlValue::Binary(Bytes::from_static(&[1, 2, 3])));
    }
}
