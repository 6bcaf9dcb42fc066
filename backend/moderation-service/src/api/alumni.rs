use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{parse_id, ValidatedJson};
use crate::error::{AppError, Result};
use crate::models::{ApprovalStatus, PendingAlumnus};
use crate::services::{AlumniAction, AlumniService};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pending-alumni", get(list_pending))
        .route("/approve-alumni", post(review_alumni))
}

#[derive(Debug, Serialize)]
pub struct PendingAlumniResponse {
    pub alumni: Vec<PendingAlumnus>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReviewAlumniRequest {
    #[validate(required)]
    pub alumni_id: Option<String>,
    #[validate(required)]
    pub action: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReviewAlumniResponse {
    pub success: bool,
    pub alumni_id: Uuid,
    pub approval_status: ApprovalStatus,
}

async fn list_pending(State(state): State<AppState>) -> Result<Json<PendingAlumniResponse>> {
    let alumni = AlumniService::new(state.store.clone()).pending().await?;
    Ok(Json(PendingAlumniResponse { alumni }))
}

async fn review_alumni(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ReviewAlumniRequest>,
) -> Result<Json<ReviewAlumniResponse>> {
    let alumni_id = parse_id("alumni_id", req.alumni_id.as_deref())?;
    let action = match req.action.as_deref() {
        Some("approve") => AlumniAction::Approve,
        Some("reject") => AlumniAction::Reject,
        _ => return Err(AppError::BadRequest("Invalid action".to_string())),
    };

    let approval_status = AlumniService::new(state.store.clone())
        .review(alumni_id, action)
        .await?;

    Ok(Json(ReviewAlumniResponse {
        success: true,
        alumni_id,
        approval_status,
    }))
}
