//! Live PostgreSQL tests.
//!
//! These tests need a reachable server:
//!
//! ```bash
//! export DB_URI=localhost:5432/postgres
//! export DB_USER=postgres
//! export DB_PWD=postgres
//!
//! cargo test -p pooldb-postgres --test live -- --ignored
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use pooldb_client::{Binds, Config, Database, ErrorKind, QueryExecutor, QueryOutcome, SqlValue};
use pooldb_pool::{ConnectionPoolManager, PoolConfig, PoolRegistry};
use pooldb_postgres::PgDriver;

fn executor() -> QueryExecutor {
    let manager = ConnectionPoolManager::builder(Arc::new(PgDriver::new()))
        .config(PoolConfig::from_env())
        .registry(Arc::new(PoolRegistry::new()))
        .build();
    QueryExecutor::with_pool(&Config::new(), manager)
}

#[tokio::test]
#[ignore = "requires a PostgreSQL server"]
async fn test_select_with_named_binds() {
    let rows = executor()
        .run_query(
            "SELECT :id::int4 AS id, :name::text AS name",
            &Binds::new().bind("id", 7).bind("name", "X"),
        )
        .await;

    assert_eq!(rows, vec![vec!["7", "X"]]);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL server"]
async fn test_value_types() {
    let outcome = executor()
        .execute(
            "SELECT 12.50::numeric AS amount, NULL::text AS note, '\\xcafe'::bytea AS raw, \
             true AS flag, 9000000000::int8 AS big",
            &Binds::new(),
        )
        .await;

    let rows = outcome.into_result().expect("one row");
    assert_eq!(rows[0].get_raw(0), Some(&SqlValue::Decimal("12.50".into())));
    assert_eq!(rows[0].to_text(), vec!["12.50", "", "cafe", "true", "9000000000"]);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL server"]
async fn test_no_rows_is_empty() {
    let outcome = executor()
        .execute("SELECT 1 WHERE 1 = :n::int4", &Binds::new().bind("n", 2))
        .await;

    assert!(matches!(outcome, QueryOutcome::Empty));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL server"]
async fn test_bad_sql_is_execution_error() {
    let outcome = executor()
        .execute("SELECT * FROM pooldb_missing_table", &Binds::new())
        .await;

    assert_eq!(outcome.error_kind(), Some(ErrorKind::Execution));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL server"]
async fn test_pool_is_closed_after_each_call() {
    let executor = executor();

    for _ in 0..3 {
        assert_eq!(executor.run_query("SELECT 1", &Binds::new()).await.len(), 1);
        assert!(!executor.pool().status().active);
    }
    assert_eq!(executor.pool().metrics().pools_closed, 3);
}
