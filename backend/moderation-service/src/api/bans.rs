use axum::{extract::State, routing::post, Extension, Json, Router};
use serde::Deserialize;
use validator::Validate;

use super::{parse_id, ValidatedJson};
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::BanOutcome;
use crate::services::BanService;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ban-user", post(ban_user))
        .route("/unban-user", post(unban_user))
}

#[derive(Debug, Deserialize, Validate)]
pub struct BanRequest {
    #[validate(required)]
    pub user_id: Option<String>,
}

async fn ban_user(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
    ValidatedJson(req): ValidatedJson<BanRequest>,
) -> Result<Json<BanOutcome>> {
    let user_id = parse_id("user_id", req.user_id.as_deref())?;
    tracing::info!(admin_id = %admin.id, user_id = %user_id, "Ban requested");

    let outcome = BanService::new(state.store.clone()).ban(user_id).await?;
    Ok(Json(outcome))
}

async fn unban_user(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
    ValidatedJson(req): ValidatedJson<BanRequest>,
) -> Result<Json<BanOutcome>> {
    let user_id = parse_id("user_id", req.user_id.as_deref())?;
    tracing::info!(admin_id = %admin.id, user_id = %user_id, "Unban requested");

    let outcome = BanService::new(state.store.clone()).unban(user_id).await?;
    Ok(Json(outcome))
}
