use axum::{Json, Router, extract::State, routing::get};
use std::sync::Arc;
use tracing::warn;

use crate::web::AppState;
use crate::web::models::{Liveness, Readiness};

// Liveness only: never touches the warehouse.
async fn health_handler() -> Json<Liveness> {
    Json(Liveness { ok: true })
}

// Readiness reports warehouse trouble in the body and always answers 200,
// so a paused cluster never gets the container restarted.
async fn ready_handler(State(app_state): State<Arc<AppState>>) -> Json<Readiness> {
    match app_state.store.ping().await {
        Ok(()) => Json(Readiness::ready()),
        Err(e) => {
            warn!(error = %e, "Readiness check failed.");
            Json(Readiness::not_ready(e.to_string()))
        }
    }
}

pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
}
