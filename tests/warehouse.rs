//! Runs against a real Postgres-compatible database when
//! `CLAIMS_API_TEST_DATABASE_URL` is set, and is skipped otherwise.

use chrono::NaiveDate;
use serde_json::{Value, json};
use sqlx::postgres::{PgPool, PgPoolOptions};

use claims_api::db::ClaimStore;
use claims_api::db::row_json::row_to_json;
use claims_api::db::services::RedshiftStore;
use claims_api::server::config::ServerConfig;

async fn test_pool() -> Option<PgPool> {
    let url = std::env::var("CLAIMS_API_TEST_DATABASE_URL").ok()?;
    // One connection, so session settings hold for every statement.
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&url)
        .await
        .expect("connect to test database");
    Some(pool)
}

#[tokio::test]
async fn row_to_json_renders_warehouse_types() {
    let Some(pool) = test_pool().await else {
        eprintln!("CLAIMS_API_TEST_DATABASE_URL not set, skipping");
        return;
    };

    let row = sqlx::query(
        r#"
        SELECT 41::int4 AS age,
               1250.50::numeric AS amount,
               true AS approved,
               9007199254740993::int8 AS big,
               '{"a":1}'::jsonb AS meta,
               NULL::text AS notes,
               0.5::float8 AS score,
               'C-100'::varchar AS claim_id,
               '2024-03-01'::date AS filed_on,
               '2024-03-01 09:30:00'::timestamp AS at,
               '2024-03-01 09:30:00+00'::timestamptz AS at_tz,
               '6f1c2a3e-9b7d-4c5e-8f10-2a3b4c5d6e7f'::uuid AS ext_id,
               interval '1 day 90 seconds' AS span
        "#,
    )
    .fetch_one(&pool)
    .await
    .unwrap();

    let record = Value::Object(row_to_json(&row));
    assert_eq!(
        record,
        json!({
            "age": 41,
            "amount": "1250.50",
            "approved": true,
            "big": 9_007_199_254_740_993_i64,
            "meta": { "a": 1 },
            "notes": null,
            "score": 0.5,
            "claim_id": "C-100",
            "filed_on": "2024-03-01",
            "at": "2024-03-01T09:30:00",
            "at_tz": "2024-03-01T09:30:00+00:00",
            "ext_id": "6f1c2a3e-9b7d-4c5e-8f10-2a3b4c5d6e7f",
            "span": "P0M1DT90S",
        })
    );
    pool.close().await;
}

#[tokio::test]
async fn store_reads_null_ids_and_zoned_timestamps() {
    let Some(pool) = test_pool().await else {
        eprintln!("CLAIMS_API_TEST_DATABASE_URL not set, skipping");
        return;
    };

    for statement in [
        "SET TIME ZONE 'UTC'",
        "CREATE SCHEMA IF NOT EXISTS aicp_insurance",
        "DROP TABLE IF EXISTS aicp_insurance.claims_processed",
        "CREATE TABLE aicp_insurance.claims_processed (
             claim_id varchar(32),
             claim_status varchar(16) NOT NULL,
             amount numeric(12, 2),
             inserted_at timestamptz
         )",
        "INSERT INTO aicp_insurance.claims_processed VALUES
             ('C-1', 'APPROVED', 100.00, '2024-03-01 09:30:00+00'),
             (NULL, 'APPROVED', 50.00, '2024-03-02 08:00:00+00'),
             ('C-2', 'DENIED', 75.25, '2024-03-03 10:00:00+00')",
    ] {
        sqlx::query(statement).execute(&pool).await.unwrap();
    }

    let store = RedshiftStore::with_pool(pool, &ServerConfig::default());
    store.ping().await.unwrap();

    let listed = store.list_claims_by_status("APPROVED", None, 10).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["claim_id"], Value::Null);
    assert_eq!(listed[0]["inserted_at"], "2024-03-02T08:00:00+00:00");
    assert_eq!(listed[1]["claim_id"], "C-1");
    assert_eq!(listed[1].len(), 3);

    let since = NaiveDate::from_ymd_opt(2024, 3, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let recent = store.list_claims_by_status("APPROVED", Some(since), 10).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0]["claim_id"], Value::Null);

    let limited = store.list_claims_by_status("APPROVED", None, 1).await.unwrap();
    assert_eq!(limited.len(), 1);

    let claim = store.fetch_claim("C-2").await.unwrap().unwrap();
    assert_eq!(claim["amount"], "75.25");
    assert_eq!(claim["claim_status"], "DENIED");
    assert!(store.fetch_claim("C-404").await.unwrap().is_none());

    store.close().await;
}
