// Ban service - toggles a user's ban flag and cascades rejection to flagged content
use std::sync::Arc;
use uuid::Uuid;

use crate::db::ModerationStore;
use crate::error::{AppError, Result};
use crate::models::BanOutcome;

pub struct BanService {
    store: Arc<dyn ModerationStore>,
}

impl BanService {
    pub fn new(store: Arc<dyn ModerationStore>) -> Self {
        Self { store }
    }

    /// Ban the user and reject their currently flagged posts and comments.
    /// Published and already rejected content is left alone.
    pub async fn ban(&self, user_id: Uuid) -> Result<BanOutcome> {
        let outcome = self
            .store
            .ban_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        tracing::warn!(
            user_id = %user_id,
            rejected_posts = outcome.rejected_posts,
            rejected_comments = outcome.rejected_comments,
            "User banned"
        );

        Ok(outcome)
    }

    /// Restore platform access. Content rejected earlier stays rejected.
    pub async fn unban(&self, user_id: Uuid) -> Result<BanOutcome> {
        let outcome = self
            .store
            .unban_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        tracing::info!(user_id = %user_id, "User unbanned");

        Ok(outcome)
    }
}
