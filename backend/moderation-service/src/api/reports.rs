use axum::{extract::State, routing::post, Extension, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{parse_id, ValidatedJson};
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::services::ReportService;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/chat/reports", post(report_chat))
        .route("/resources/flag", post(flag_resource))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChatReportRequest {
    #[validate(required)]
    pub conversation_id: Option<String>,
    #[validate(required)]
    pub reported_user_id: Option<String>,
    #[validate(required)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct FlagResourceRequest {
    #[validate(required)]
    pub resource_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub success: bool,
    pub id: Uuid,
    pub message: String,
}

async fn report_chat(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(req): ValidatedJson<ChatReportRequest>,
) -> Result<Json<ReportResponse>> {
    let conversation_id = parse_id("conversation_id", req.conversation_id.as_deref())?;
    let reported_user_id = parse_id("reported_user_id", req.reported_user_id.as_deref())?;

    let report = ReportService::new(state.store.clone())
        .report_chat(
            user.id,
            conversation_id,
            reported_user_id,
            req.reason.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Json(ReportResponse {
        success: true,
        id: report.id,
        message: "Chat reported successfully".to_string(),
    }))
}

async fn flag_resource(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(req): ValidatedJson<FlagResourceRequest>,
) -> Result<Json<ReportResponse>> {
    let resource_id = parse_id("resource_id", req.resource_id.as_deref())?;

    let flag = ReportService::new(state.store.clone())
        .flag_resource(user.id, resource_id)
        .await?;

    Ok(Json(ReportResponse {
        success: true,
        id: flag.id,
        message: "Resource flagged for review".to_string(),
    }))
}
