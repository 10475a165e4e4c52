use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, Postgres};
use std::time::Duration;
use tracing::{debug, info};

use crate::db::models::ClaimRecord;
use crate::db::retry::{RetryPolicy, retry_with_backoff};
use crate::db::row_json::row_to_json;
use crate::db::{ClaimStore, StoreError};
use crate::server::config::ServerConfig;

const APPLICATION_NAME: &str = "claims-api";

const CLAIM_BY_ID_SQL: &str = r#"
    SELECT *
    FROM aicp_insurance.claims_processed
    WHERE claim_id = $1
    LIMIT 1
"#;

const CLAIMS_BY_STATUS_SQL: &str = r#"
    SELECT claim_id, claim_status, inserted_at
    FROM aicp_insurance.claims_processed
    WHERE claim_status = $1
    ORDER BY inserted_at DESC
    LIMIT $2
"#;

const RECENT_CLAIMS_BY_STATUS_SQL: &str = r#"
    SELECT claim_id, claim_status, inserted_at
    FROM aicp_insurance.claims_processed
    WHERE claim_status = $1
      AND inserted_at >= $2
    ORDER BY inserted_at DESC
    LIMIT $3
"#;

/// Redshift-backed [`ClaimStore`].
///
/// The pool connects lazily, so the service starts and answers liveness
/// checks while the cluster is paused or unreachable. Without a configured
/// host there is no pool at all and every call reports `NotConfigured`.
pub struct RedshiftStore {
    pool: Option<PgPool>,
    retry: RetryPolicy,
    ready_timeout: Duration,
}

impl RedshiftStore {
    pub fn new(config: &ServerConfig) -> Self {
        let pool = config.redshift_host.as_deref().map(|host| {
            let mut options = PgConnectOptions::new()
                .host(host)
                .port(config.redshift_port)
                .database(&config.redshift_db)
                .application_name(APPLICATION_NAME);
            if let Some(user) = config.redshift_user.as_deref() {
                options = options.username(user);
            }
            if let Some(password) = config.redshift_password.as_deref() {
                options = options.password(password);
            }

            info!(
                host,
                port = config.redshift_port,
                database = %config.redshift_db,
                max_connections = config.max_connections,
                "Configured Redshift connection pool (lazy)."
            );

            PgPoolOptions::new()
                .max_connections(config.max_connections)
                .acquire_timeout(config.connect_timeout())
                .test_before_acquire(true)
                .connect_lazy_with(options)
        });

        if pool.is_none() {
            info!("REDSHIFT_HOST is not set; data endpoints will report the database as unavailable.");
        }

        Self {
            pool,
            retry: config.retry_policy(),
            ready_timeout: config.ready_timeout(),
        }
    }

    /// Store over an already built pool, such as one opened from a connection URL.
    pub fn with_pool(pool: PgPool, config: &ServerConfig) -> Self {
        Self {
            pool: Some(pool),
            retry: config.retry_policy(),
            ready_timeout: config.ready_timeout(),
        }
    }

    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }

    fn pool(&self) -> Result<&PgPool, StoreError> {
        self.pool.as_ref().ok_or(StoreError::NotConfigured)
    }

    async fn acquire_with_retry(&self) -> Result<PoolConnection<Postgres>, StoreError> {
        let pool = self.pool()?;
        retry_with_backoff(&self.retry, "Redshift connect", move || pool.acquire())
            .await
            .map_err(StoreError::Connect)
    }
}

#[async_trait]
impl ClaimStore for RedshiftStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let pool = self.pool()?;
        let check = async {
            let mut conn = pool.acquire().await.map_err(StoreError::Connect)?;
            sqlx::query_scalar::<_, i32>("SELECT 1")
                .fetch_one(&mut *conn)
                .await
                .map_err(StoreError::Query)?;
            Ok::<(), StoreError>(())
        };

        tokio::time::timeout(self.ready_timeout, check)
            .await
            .map_err(|_| StoreError::Timeout(self.ready_timeout))?
    }

    async fn fetch_claim(&self, claim_id: &str) -> Result<Option<ClaimRecord>, StoreError> {
        let mut conn = self.acquire_with_retry().await?;
        let row = sqlx::query(CLAIM_BY_ID_SQL)
            .bind(claim_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(StoreError::Query)?;

        debug!(claim_id, found = row.is_some(), "Fetched claim by id.");
        Ok(row.as_ref().map(row_to_json))
    }

    async fn list_claims_by_status(
        &self,
        claim_status: &str,
        since: Option<NaiveDateTime>,
        limit: i64,
    ) -> Result<Vec<ClaimRecord>, StoreError> {
        let mut conn = self.acquire_with_retry().await?;
        let rows = match since {
            Some(since) => {
                sqlx::query(RECENT_CLAIMS_BY_STATUS_SQL)
                    .bind(claim_status)
                    .bind(since)
                    .bind(limit)
                    .fetch_all(&mut *conn)
                    .await
            }
            None => {
                sqlx::query(CLAIMS_BY_STATUS_SQL)
                    .bind(claim_status)
                    .bind(limit)
                    .fetch_all(&mut *conn)
                    .await
            }
        }
        .map_err(StoreError::Query)?;

        debug!(claim_status, count = rows.len(), ?since, "Listed claims by status.");
        Ok(rows.iter().map(row_to_json).collect())
    }
}
