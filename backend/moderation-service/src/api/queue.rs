use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::error::Result;
use crate::models::{ChatReportEntry, PlatformStatistics, ResourceFlagEntry};
use crate::services::{FlaggedQueue, QueueService};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/flagged", get(get_flagged))
        .route("/resource-reports", get(get_resource_reports))
        .route("/chat-reports", get(get_chat_reports))
        .route("/statistics", get(get_statistics))
}

#[derive(Debug, Serialize)]
pub struct ResourceReportsResponse {
    pub flags: Vec<ResourceFlagEntry>,
}

#[derive(Debug, Serialize)]
pub struct ChatReportsResponse {
    pub reports: Vec<ChatReportEntry>,
}

async fn get_flagged(State(state): State<AppState>) -> Result<Json<FlaggedQueue>> {
    let queue = QueueService::new(state.store.clone()).flagged_content().await?;
    Ok(Json(queue))
}

async fn get_resource_reports(
    State(state): State<AppState>,
) -> Result<Json<ResourceReportsResponse>> {
    let flags = QueueService::new(state.store.clone()).resource_flags().await?;
    Ok(Json(ResourceReportsResponse { flags }))
}

async fn get_chat_reports(State(state): State<AppState>) -> Result<Json<ChatReportsResponse>> {
    let reports = QueueService::new(state.store.clone()).chat_reports().await?;
    Ok(Json(ChatReportsResponse { reports }))
}

async fn get_statistics(State(state): State<AppState>) -> Result<Json<PlatformStatistics>> {
    let stats = QueueService::new(state.store.clone()).statistics().await?;
    Ok(Json(stats))
}
