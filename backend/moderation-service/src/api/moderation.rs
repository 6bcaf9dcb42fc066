use axum::{extract::State, routing::post, Extension, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{parse_id, ValidatedJson};
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::{ContentKind, ContentStatus};
use crate::services::{Decision, DecisionAction, DecisionService};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/moderate", post(moderate))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ModerateRequest {
    #[validate(required)]
    pub target_type: Option<String>,
    #[validate(required)]
    pub target_id: Option<String>,
    #[validate(required)]
    pub action: Option<String>,
    /// Version the admin was shown. Without it, decisions from separate
    /// requests apply in arrival order and only a read/write race inside one
    /// request is detected.
    pub expected_version: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct ModerateResponse {
    pub success: bool,
    pub target_type: ContentKind,
    pub target_id: Uuid,
    pub status: ContentStatus,
    pub version: i32,
    pub changed: bool,
}

fn parse_action(value: &str) -> Result<DecisionAction> {
    match value {
        "approve" => Ok(DecisionAction::Approve),
        "reject" => Ok(DecisionAction::Reject),
        other => Err(AppError::BadRequest(format!("Invalid action: {}", other))),
    }
}

/// Approve or reject a post or comment. Send `expected_version` to get 409
/// when another admin decided the item after it was loaded.
async fn moderate(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
    ValidatedJson(req): ValidatedJson<ModerateRequest>,
) -> Result<Json<ModerateResponse>> {
    let kind: ContentKind = req
        .target_type
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(AppError::BadRequest)?;
    let id = parse_id("target_id", req.target_id.as_deref())?;
    let action = parse_action(req.action.as_deref().unwrap_or_default())?;

    let outcome = DecisionService::new(state.store.clone(), state.config.moderation.decision_policy)
        .decide(Decision {
            kind,
            id,
            action,
            expected_version: req.expected_version,
        })
        .await?;

    tracing::info!(admin_id = %admin.id, target_id = %id, action = %action, "Admin moderation request handled");

    Ok(Json(ModerateResponse {
        success: true,
        target_type: kind,
        target_id: id,
        status: outcome.item.status,
        version: outcome.item.version,
        changed: outcome.changed,
    }))
}
