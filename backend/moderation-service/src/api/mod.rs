mod access;
mod alumni;
mod bans;
mod content;
mod moderation;
mod queue;
mod reports;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    middleware::from_fn_with_state,
    Json, Router,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::middleware::{require_admin, require_auth};
use crate::AppState;

/// Every route here requires a bearer token; everything under `/admin`
/// additionally requires an admin identity.
pub fn routes(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .merge(queue::routes())
        .merge(moderation::routes())
        .merge(bans::routes())
        .merge(alumni::routes())
        .route_layer(from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .merge(access::routes())
        .merge(content::routes())
        .merge(reports::routes())
        .nest("/admin", admin)
        .route_layer(from_fn_with_state(state, require_auth))
}

/// JSON body that has passed `validator` checks. Malformed bodies and
/// failed validation both surface as 400.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Parse a required id field that `validator` has already checked is present.
fn parse_id(field: &str, value: Option<&str>) -> Result<Uuid, AppError> {
    let value = value.ok_or_else(|| AppError::BadRequest(format!("{} is required", field)))?;
    Uuid::parse_str(value.trim())
        .map_err(|_| AppError::BadRequest(format!("{} is not a valid id", field)))
}
