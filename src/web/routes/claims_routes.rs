use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::QueryRejection},
    routing::get,
};
use chrono::{NaiveDateTime, TimeDelta, Utc};
use std::sync::Arc;

use crate::db::models::ClaimRecord;
use crate::server::config::ServerConfig;
use crate::web::models::ListClaimsParams;
use crate::web::{AppError, AppState};

async fn get_claim_handler(
    State(app_state): State<Arc<AppState>>,
    Path(claim_id): Path<String>,
) -> Result<Json<ClaimRecord>, AppError> {
    app_state
        .store
        .fetch_claim(&claim_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Claim not found".to_string()))
}

async fn list_claims_by_status_handler(
    State(app_state): State<Arc<AppState>>,
    Path(claim_status): Path<String>,
    query: Result<Query<ListClaimsParams>, QueryRejection>,
) -> Result<Json<Vec<ClaimRecord>>, AppError> {
    let Query(params) = query?;
    let limit = resolve_limit(params.limit, &app_state.config)?;
    let since = inserted_since(Utc::now().naive_utc(), params.days)?;

    let claims = app_state
        .store
        .list_claims_by_status(&claim_status, since, limit)
        .await?;
    Ok(Json(claims))
}

fn resolve_limit(requested: Option<i64>, config: &ServerConfig) -> Result<i64, AppError> {
    let limit = requested.unwrap_or(config.default_list_limit);
    if !(1..=config.max_list_limit).contains(&limit) {
        return Err(AppError::InvalidInput(format!(
            "limit must be between 1 and {}",
            config.max_list_limit
        )));
    }
    Ok(limit)
}

/// `days` absent or zero means no time filter.
fn inserted_since(now: NaiveDateTime, days: Option<i64>) -> Result<Option<NaiveDateTime>, AppError> {
    match days {
        None | Some(0) => Ok(None),
        Some(days) if days < 0 => Err(AppError::InvalidInput(
            "days must not be negative".to_string(),
        )),
        Some(days) => TimeDelta::try_days(days)
            .and_then(|window| now.checked_sub_signed(window))
            .map(Some)
            .ok_or_else(|| AppError::InvalidInput(format!("days={days} is out of range"))),
    }
}

pub fn claims_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/{claim_id}", get(get_claim_handler))
        .route("/status/{claim_status}", get(list_claims_by_status_handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn zero_or_missing_days_disables_the_filter() {
        assert_eq!(inserted_since(noon(), None).unwrap(), None);
        assert_eq!(inserted_since(noon(), Some(0)).unwrap(), None);
    }

    #[test]
    fn positive_days_subtracts_whole_days() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 8)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(inserted_since(noon(), Some(7)).unwrap(), Some(expected));
    }

    #[test]
    fn negative_or_huge_days_are_rejected() {
        assert!(matches!(inserted_since(noon(), Some(-1)), Err(AppError::InvalidInput(_))));
        assert!(matches!(inserted_since(noon(), Some(i64::MAX)), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn limit_defaults_and_bounds() {
        let config = ServerConfig::default();
        assert_eq!(resolve_limit(None, &config).unwrap(), 50);
        assert_eq!(resolve_limit(Some(1), &config).unwrap(), 1);
        assert_eq!(resolve_limit(Some(1_000), &config).unwrap(), 1_000);
        assert!(resolve_limit(Some(0), &config).is_err());
        assert!(resolve_limit(Some(1_001), &config).is_err());
    }
}
