use axum::{extract::State, routing::get, Extension, Json, Router};
use serde::Serialize;

use crate::middleware::CurrentUser;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/access/check", get(check_access))
        .route("/admin/check", get(check_admin))
}

#[derive(Debug, Serialize)]
pub struct AccessCheckResponse {
    pub has_access: bool,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct AdminCheckResponse {
    pub is_admin: bool,
}

async fn check_access(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Json<AccessCheckResponse> {
    let has_access = state.access.has_access(&user.email);
    if !has_access {
        tracing::info!(user_id = %user.id, "Access denied for email outside allow-lists");
    }

    Json(AccessCheckResponse {
        has_access,
        email: user.email,
    })
}

async fn check_admin(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Json<AdminCheckResponse> {
    Json(AdminCheckResponse {
        is_admin: state.access.is_privileged(&user.email),
    })
}
