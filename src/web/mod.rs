use axum::Router;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::db::ClaimStore;
use crate::server::config::ServerConfig;
use crate::web::routes::{claims_routes, health_routes};

pub use self::error::AppError;

pub mod error;
pub mod models;
pub mod routes;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ClaimStore>,
    pub config: Arc<ServerConfig>,
}

pub fn create_axum_router(store: Arc<dyn ClaimStore>, config: Arc<ServerConfig>) -> Router {
    let app_state = Arc::new(AppState { store, config });

    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .merge(health_routes::health_router())
        .nest("/v1/claims", claims_routes::claims_router())
        .with_state(app_state)
        .layer(trace)
}
