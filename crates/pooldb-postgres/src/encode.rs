//! Binding `SqlValue` parameters to sqlx queries.

use pooldb_types::SqlValue;
use sqlx::Postgres;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;

pub(crate) type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// Bind one positional parameter.
///
/// NULL is sent as a text NULL and decimals as text; statements comparing
/// them against other types need an explicit cast such as `:amount::numeric`.
pub(crate) fn bind_value<'q>(query: PgQuery<'q>, value: &SqlValue) -> PgQuery<'q> {
    match value {
        SqlValue::Null => query.bind(None::<String>),
        SqlValue::Bool(v) => query.bind(*v),
        SqlValue::Int(v) => query.bind(*v),
        SqlValue::BigInt(v) => query.bind(*v),
        SqlValue::Float(v) => query.bind(*v),
        SqlValue::Decimal(s) | SqlValue::String(s) | SqlValue::Clob(s) => query.bind(s.clone()),
        SqlValue::Binary(b) | SqlValue::Blob(b) => query.bind(b.to_vec()),
        SqlValue::Uuid(u) => query.bind(*u),
        SqlValue::Date(d) => query.bind(*d),
        SqlValue::DateTime(dt) => query.bind(*dt),
        SqlValue::DateTimeOffset(dt) => query.bind(*dt),
    }
}
