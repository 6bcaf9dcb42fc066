// Queue service - read-only views feeding the admin moderation screens
use serde::Serialize;
use std::sync::Arc;

use crate::db::ModerationStore;
use crate::error::Result;
use crate::models::{
    ChatReportEntry, ContentKind, FlaggedContent, PlatformStatistics, ResourceFlagEntry,
};

pub struct QueueService {
    store: Arc<dyn ModerationStore>,
}

#[derive(Debug, Serialize)]
pub struct FlaggedQueue {
    pub posts: Vec<FlaggedContent>,
    pub comments: Vec<FlaggedContent>,
}

impl QueueService {
    pub fn new(store: Arc<dyn ModerationStore>) -> Self {
        Self { store }
    }

    /// Flagged posts and comments with their authors, newest first.
    pub async fn flagged_content(&self) -> Result<FlaggedQueue> {
        let posts = self.store.list_flagged_content(ContentKind::Post).await?;
        let comments = self.store.list_flagged_content(ContentKind::Comment).await?;

        Ok(FlaggedQueue { posts, comments })
    }

    /// Every resource flag regardless of status; flags have no resolution lifecycle.
    pub async fn resource_flags(&self) -> Result<Vec<ResourceFlagEntry>> {
        self.store.list_resource_flags().await
    }

    pub async fn chat_reports(&self) -> Result<Vec<ChatReportEntry>> {
        self.store.list_chat_reports().await
    }

    pub async fn statistics(&self) -> Result<PlatformStatistics> {
        self.store.statistics().await
    }
}
