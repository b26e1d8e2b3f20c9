//! Decoding sqlx rows into `SqlValue`s.

use bytes::Bytes;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use pooldb_pool::{Column, DriverError, ResultSet};
use pooldb_types::SqlValue;
use sqlx::postgres::PgRow;
use sqlx::types::BigDecimal;
use sqlx::{Column as _, Row as _, TypeInfo as _, ValueRef as _};
use uuid::Uuid;

/// Decode every row. Column metadata comes from the first row, so an empty
/// result has no columns.
pub(crate) fn decode_rows(rows: &[PgRow]) -> Result<ResultSet, DriverError> {
    let Some(first) = rows.first() else {
        return Ok(ResultSet::default());
    };

    let columns: Vec<Column> = first
        .columns()
        .iter()
        .map(|c| Column::new(c.name(), c.type_info().name()))
        .collect();

    let values = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .enumerate()
                .map(|(idx, column)| decode_value(row, idx, &column.type_name))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DriverError::with_source("failed to decode postgres row", e))?;

    Ok(ResultSet::new(columns, values))
}

fn decode_value(row: &PgRow, idx: usize, type_name: &str) -> Result<SqlValue, sqlx::Error> {
    let value = match type_name {
        "BOOL" => row.try_get::<Option<bool>, _>(idx)?.map(SqlValue::Bool),
        "INT2" => row
            .try_get::<Option<i16>, _>(idx)?
            .map(|v| SqlValue::Int(v.into())),
        "INT4" => row.try_get::<Option<i32>, _>(idx)?.map(SqlValue::Int),
        "INT8" => row.try_get::<Option<i64>, _>(idx)?.map(SqlValue::BigInt),
        "FLOAT4" => row
            .try_get::<Option<f32>, _>(idx)?
            .map(|v| SqlValue::Float(v.into())),
        "FLOAT8" => row.try_get::<Option<f64>, _>(idx)?.map(SqlValue::Float),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => {
            row.try_get::<Option<String>, _>(idx)?.map(SqlValue::String)
        }
        "BYTEA" => row
            .try_get::<Option<Vec<u8>>, _>(idx)?
            .map(|v| SqlValue::Binary(Bytes::from(v))),
        "UUID" => row.try_get::<Option<Uuid>, _>(idx)?.map(SqlValue::Uuid),
        "DATE" => row.try_get::<Option<NaiveDate>, _>(idx)?.map(SqlValue::Date),
        "TIMESTAMP" => row
            .try_get::<Option<NaiveDateTime>, _>(idx)?
            .map(SqlValue::DateTime),
        "TIMESTAMPTZ" => row
            .try_get::<Option<DateTime<Utc>>, _>(idx)?
            .map(|v| SqlValue::DateTimeOffset(v.fixed_offset())),
        "NUMERIC" => row
            .try_get::<Option<BigDecimal>, _>(idx)?
            .map(|d| SqlValue::Decimal(decimal_text(&d))),
        _ => decode_fallback(row, idx)?,
    };
    Ok(value.unwrap_or(SqlValue::Null))
}

/// Plain decimal text keeping the column's scale, never exponent notation.
fn decimal_text(value: &BigDecimal) -> String {
    value.to_plain_string()
}

/// Types without a dedicated mapping: UTF-8 payloads become strings, the
/// rest raw bytes.
fn decode_fallback(row: &PgRow, idx: usize) -> Result<Option<SqlValue>, sqlx::Error> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(None);
    }
    let bytes = raw.as_bytes().map_err(sqlx::Error::Decode)?;
    Ok(Some(match std::str::from_utf8(bytes) {
        Ok(text) => SqlValue::String(text.to_string()),
        Err(_) => SqlValue::Binary(Bytes::copy_from_slice(bytes)),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn text(s: &str) -> String {
        decimal_text(&BigDecimal::from_str(s).unwrap())
    }

    #[test]
    fn test_decimal_keeps_scale() {
        assert_eq!(text("12.50"), "12.50");
        assert_eq!(text("-7.5"), "-7.5");
        assert_eq!(text("0"), "0");
    }

    #[test]
    fn test_decimal_small_fraction_is_plain() {
        assert_eq!(text("0.00000001"), "0.00000001");
    }

    #[test]
    fn test_decimal_beyond_native_precision() {
        let wide = "123456789012345678901234567890.123456789";
        assert_eq!(text(wide), wide);
    }
}
