// Report service - user-initiated reports against chats and shared resources
use std::sync::Arc;
use uuid::Uuid;

use crate::db::ModerationStore;
use crate::error::{AppError, Result};
use crate::models::{ChatReport, NewChatReport, ResourceFlag};

pub struct ReportService {
    store: Arc<dyn ModerationStore>,
}

impl ReportService {
    pub fn new(store: Arc<dyn ModerationStore>) -> Self {
        Self { store }
    }

    /// Queue a chat conversation for admin attention. Nothing about the
    /// reported user or the conversation changes here.
    pub async fn report_chat(
        &self,
        reporter_id: Uuid,
        conversation_id: Uuid,
        reported_user_id: Uuid,
        reason: &str,
    ) -> Result<ChatReport> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::BadRequest("Missing required fields".to_string()));
        }

        let report = self
            .store
            .insert_chat_report(NewChatReport {
                conversation_id,
                reporter_id,
                reported_user_id,
                reason: reason.to_string(),
            })
            .await?;

        tracing::info!(
            report_id = %report.id,
            conversation_id = %conversation_id,
            reporter_id = %reporter_id,
            reported_user_id = %reported_user_id,
            "Chat reported"
        );

        Ok(report)
    }

    /// Record a pending flag and hold the resource for review.
    pub async fn flag_resource(&self, reporter_id: Uuid, resource_id: Uuid) -> Result<ResourceFlag> {
        let flag = self
            .store
            .flag_resource(resource_id, reporter_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Resource {} not found", resource_id)))?;

        tracing::info!(
            flag_id = %flag.id,
            resource_id = %resource_id,
            flagger_id = %reporter_id,
            "Resource flagged"
        );

        Ok(flag)
    }
}
