use axum::{
    extract::{Path, State},
    routing::post,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::ValidatedJson;
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::ContentStatus;
use crate::services::{ContentService, CreatedContent};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/posts", post(create_post))
        .route("/posts/:id/comments", post(create_comment))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(required)]
    pub content: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(required)]
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateContentResponse {
    pub success: bool,
    pub id: Uuid,
    pub status: ContentStatus,
    pub message: String,
}

impl CreateContentResponse {
    fn new(created: CreatedContent, noun: &str) -> Self {
        let message = match created.item.status {
            ContentStatus::Flagged => format!(
                "Your {} has been flagged for review due to potentially inappropriate content",
                noun
            ),
            _ => format!("{} created successfully", capitalize(noun)),
        };

        Self {
            success: true,
            id: created.item.id,
            status: created.item.status,
            message,
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn service(state: &AppState) -> ContentService {
    ContentService::new(state.store.clone(), state.pipeline.clone())
}

async fn create_post(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(req): ValidatedJson<CreatePostRequest>,
) -> Result<Json<CreateContentResponse>> {
    let content = req.content.unwrap_or_default();
    let created = service(&state).create_post(user.id, &content, req.tags).await?;

    Ok(Json(CreateContentResponse::new(created, "post")))
}

async fn create_comment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(post_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<CreateCommentRequest>,
) -> Result<Json<CreateContentResponse>> {
    let content = req.content.unwrap_or_default();
    let created = service(&state)
        .create_comment(user.id, post_id, &content)
        .await?;

    Ok(Json(CreateContentResponse::new(created, "comment")))
}
