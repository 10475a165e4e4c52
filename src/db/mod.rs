pub mod models;
pub mod retry;
pub mod row_json;
pub mod services;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::time::Duration;
use thiserror::Error;

use self::models::ClaimRecord;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("REDSHIFT_HOST is not configured")]
    NotConfigured,
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("connection failed: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),
}

/// Read access to the claims warehouse. HTTP handlers only see this trait.
#[async_trait]
pub trait ClaimStore: Send + Sync {
    /// Single connection attempt plus `SELECT 1`, bounded by the readiness timeout.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn fetch_claim(&self, claim_id: &str) -> Result<Option<ClaimRecord>, StoreError>;

    /// `claim_id`, `claim_status` and `inserted_at` of matching rows, newest
    /// first. `since` restricts to rows inserted at or after that instant (UTC).
    async fn list_claims_by_status(
        &self,
        claim_status: &str,
        since: Option<NaiveDateTime>,
        limit: i64,
    ) -> Result<Vec<ClaimRecord>, StoreError>;
}
