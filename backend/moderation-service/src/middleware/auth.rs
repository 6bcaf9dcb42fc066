use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub email: String,
    pub exp: usize,
    #[serde(default)]
    pub iat: usize,
}

/// Authenticated caller, inserted into request extensions by [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request).ok_or(AppError::Unauthorized)?;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.config.jwt.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        AppError::Unauthorized
    })?
    .claims;

    let id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::Unauthorized)?;

    // Token must still resolve to a known identity; the stored email wins over the claim.
    let user = state
        .store
        .find_user(id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if user.email != claims.email {
        tracing::debug!(user_id = %id, "Token email differs from stored identity");
    }

    request.extensions_mut().insert(CurrentUser {
        id,
        email: user.email,
    });

    Ok(next.run(request).await)
}

/// Must run after [`require_auth`]. Privilege is decided by the access policy
/// at request time, never carried in the token.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let current_user = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::Unauthorized)?;

    if !state.access.is_privileged(&current_user.email) {
        tracing::warn!(user_id = %current_user.id, "Non-admin attempted admin action");
        return Err(AppError::Forbidden);
    }

    Ok(next.run(request).await)
}
