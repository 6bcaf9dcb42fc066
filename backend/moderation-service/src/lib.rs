pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::db::ModerationStore;
use crate::services::{AccessPolicy, ModerationPipeline};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ModerationStore>,
    pub pipeline: ModerationPipeline,
    pub access: Arc<dyn AccessPolicy>,
    pub config: Arc<Config>,
}

/// Full HTTP application: health check plus the versioned API.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api::routes(state.clone()))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
