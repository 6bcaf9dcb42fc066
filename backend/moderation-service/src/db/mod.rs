//! Storage seam for the moderation core.
//!
//! The service treats its relational store as opaque: everything it needs is
//! expressed by [`ModerationStore`]. Operations that touch more than one row
//! or table (ban cascade, resource flagging, comment counters) are single
//! trait calls so that each backend can apply them atomically.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    ApprovalStatus, BanOutcome, ChatReport, ChatReportEntry, ContentItem, ContentKind,
    ContentStatus, FlaggedContent, NewChatReport, NewContent, PendingAlumnus,
    PlatformStatistics, ResourceFlag, ResourceFlagEntry, UserRecord,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModerationStore: Send + Sync {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<UserRecord>>;

    async fn find_content(&self, kind: ContentKind, id: Uuid) -> Result<Option<ContentItem>>;

    /// Insert a post or comment. Publishing a comment also bumps the parent
    /// post's `comments_count` within the same write.
    async fn insert_content(&self, content: NewContent) -> Result<ContentItem>;

    /// Compare-and-swap on `(id, version)`. Returns `None` when no row matched,
    /// either because the item is gone or because its version moved on.
    async fn update_content_status(
        &self,
        kind: ContentKind,
        id: Uuid,
        status: ContentStatus,
        expected_version: i32,
    ) -> Result<Option<ContentItem>>;

    /// Flagged items of one kind joined with their authors, newest first.
    async fn list_flagged_content(&self, kind: ContentKind) -> Result<Vec<FlaggedContent>>;

    async fn insert_chat_report(&self, report: NewChatReport) -> Result<ChatReport>;

    /// Write a pending flag row and flip the resource to `flagged` as one unit.
    /// Returns `None` if the resource does not exist; nothing is written then.
    async fn flag_resource(&self, resource_id: Uuid, flagger_id: Uuid)
        -> Result<Option<ResourceFlag>>;

    async fn list_resource_flags(&self) -> Result<Vec<ResourceFlagEntry>>;

    async fn list_chat_reports(&self) -> Result<Vec<ChatReportEntry>>;

    async fn statistics(&self) -> Result<PlatformStatistics>;

    /// Set `is_banned` and reject every currently flagged post and comment of
    /// the user, atomically. `None` if the user does not exist.
    async fn ban_user(&self, user_id: Uuid) -> Result<Option<BanOutcome>>;

    /// Clear `is_banned` only. `None` if the user does not exist.
    async fn unban_user(&self, user_id: Uuid) -> Result<Option<BanOutcome>>;

    async fn list_pending_alumni(&self) -> Result<Vec<PendingAlumnus>>;

    /// Returns `false` when no alumni row with that id exists.
    async fn set_alumni_approval(&self, user_id: Uuid, status: ApprovalStatus) -> Result<bool>;
}
