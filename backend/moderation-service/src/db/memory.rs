use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::ModerationStore;
use crate::error::Result;
use crate::models::{
    ApprovalStatus, BanOutcome, ChatReport, ChatReportEntry, ContentItem, ContentKind,
    ContentStatus, FlaggedContent, FlaggedResource, NewChatReport, NewContent, PendingAlumnus,
    PlatformStatistics, Resource, ResourceFlag, ResourceFlagEntry, UserRecord, ALUMNI_ROLE,
    REPORT_STATUS_PENDING, RESOURCE_FLAG_REASON,
};

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<Uuid, UserRecord>,
    posts: HashMap<Uuid, ContentItem>,
    comments: HashMap<Uuid, ContentItem>,
    resources: HashMap<Uuid, Resource>,
    resource_flags: Vec<ResourceFlag>,
    chat_reports: Vec<ChatReport>,
}

impl MemoryState {
    fn table(&self, kind: ContentKind) -> &HashMap<Uuid, ContentItem> {
        match kind {
            ContentKind::Post => &self.posts,
            ContentKind::Comment => &self.comments,
        }
    }

    fn table_mut(&mut self, kind: ContentKind) -> &mut HashMap<Uuid, ContentItem> {
        match kind {
            ContentKind::Post => &mut self.posts,
            ContentKind::Comment => &mut self.comments,
        }
    }

    fn reject_flagged(&mut self, kind: ContentKind, user_id: Uuid) -> u64 {
        let now = Utc::now();
        let mut rejected = 0;
        for item in self.table_mut(kind).values_mut() {
            if item.user_id == user_id && item.status == ContentStatus::Flagged {
                item.status = ContentStatus::Rejected;
                item.version += 1;
                item.updated_at = now;
                rejected += 1;
            }
        }
        rejected
    }
}

/// In-process store for local development and tests.
///
/// Every operation takes the write lock for its full duration, so multi-row
/// operations are observed all-or-nothing just like the PostgreSQL
/// transactions in [`super::PgStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: UserRecord) {
        self.state.write().await.users.insert(user.id, user);
    }

    pub async fn insert_resource(&self, resource: Resource) {
        self.state.write().await.resources.insert(resource.id, resource);
    }

    /// Store a content row as-is, bypassing the moderation pipeline.
    pub async fn put_content(&self, item: ContentItem) {
        self.state
            .write()
            .await
            .table_mut(item.kind)
            .insert(item.id, item);
    }

    pub async fn resource(&self, id: Uuid) -> Option<Resource> {
        self.state.read().await.resources.get(&id).cloned()
    }

    pub async fn resource_flags(&self) -> Vec<ResourceFlag> {
        self.state.read().await.resource_flags.clone()
    }

    pub async fn chat_reports(&self) -> Vec<ChatReport> {
        self.state.read().await.chat_reports.clone()
    }

    /// All posts and comments authored by `user_id`, ordered by id.
    pub async fn content_by_author(&self, user_id: Uuid) -> Vec<ContentItem> {
        let state = self.state.read().await;
        let mut items: Vec<ContentItem> = state
            .posts
            .values()
            .chain(state.comments.values())
            .filter(|item| item.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by_key(|item| item.id);
        items
    }
}

#[async_trait]
impl ModerationStore for MemoryStore {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<UserRecord>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn find_content(&self, kind: ContentKind, id: Uuid) -> Result<Option<ContentItem>> {
        Ok(self.state.read().await.table(kind).get(&id).cloned())
    }

    async fn insert_content(&self, content: NewContent) -> Result<ContentItem> {
        let mut state = self.state.write().await;
        let now = Utc::now();

        let item = ContentItem {
            id: Uuid::new_v4(),
            kind: content.kind,
            user_id: content.user_id,
            post_id: content.post_id,
            content: content.content,
            status: content.status,
            flagged_reason: content.flagged_reason,
            toxicity_scores: content.toxicity_scores,
            tags: content.tags,
            comments_count: 0,
            version: 0,
            created_at: now,
            updated_at: now,
        };

        if item.kind == ContentKind::Comment && item.status == ContentStatus::Published {
            if let Some(post) = item.post_id.and_then(|id| state.posts.get_mut(&id)) {
                post.comments_count += 1;
            }
        }

        state.table_mut(item.kind).insert(item.id, item.clone());
        Ok(item)
    }

    async fn update_content_status(
        &self,
        kind: ContentKind,
        id: Uuid,
        status: ContentStatus,
        expected_version: i32,
    ) -> Result<Option<ContentItem>> {
        let mut state = self.state.write().await;

        match state.table_mut(kind).get_mut(&id) {
            Some(item) if item.version == expected_version => {
                item.status = status;
                item.version += 1;
                item.updated_at = Utc::now();
                Ok(Some(item.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn list_flagged_content(&self, kind: ContentKind) -> Result<Vec<FlaggedContent>> {
        let state = self.state.read().await;

        let mut flagged: Vec<FlaggedContent> = state
            .table(kind)
            .values()
            .filter(|item| item.status == ContentStatus::Flagged)
            .map(|item| FlaggedContent {
                id: item.id,
                post_id: item.post_id,
                content: item.content.clone(),
                status: item.status,
                flagged_reason: item.flagged_reason.clone(),
                version: item.version,
                created_at: item.created_at,
                user: state.users.get(&item.user_id).map(UserRecord::public_profile),
            })
            .collect();

        flagged.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(flagged)
    }

    async fn insert_chat_report(&self, report: NewChatReport) -> Result<ChatReport> {
        let report = ChatReport {
            id: Uuid::new_v4(),
            conversation_id: report.conversation_id,
            reporter_id: report.reporter_id,
            reported_user_id: report.reported_user_id,
            reason: report.reason,
            status: REPORT_STATUS_PENDING.to_string(),
            created_at: Utc::now(),
        };

        self.state.write().await.chat_reports.push(report.clone());
        Ok(report)
    }

    async fn flag_resource(
        &self,
        resource_id: Uuid,
        flagger_id: Uuid,
    ) -> Result<Option<ResourceFlag>> {
        let mut state = self.state.write().await;

        let Some(resource) = state.resources.get_mut(&resource_id) else {
            return Ok(None);
        };
        resource.status = ContentStatus::Flagged;

        let flag = ResourceFlag {
            id: Uuid::new_v4(),
            resource_id,
            flagger_id,
            reason: RESOURCE_FLAG_REASON.to_string(),
            status: REPORT_STATUS_PENDING.to_string(),
            created_at: Utc::now(),
        };
        state.resource_flags.push(flag.clone());

        Ok(Some(flag))
    }

    async fn list_resource_flags(&self) -> Result<Vec<ResourceFlagEntry>> {
        let state = self.state.read().await;

        // Reverse first so the stable sort keeps later inserts ahead on timestamp ties.
        let mut entries: Vec<ResourceFlagEntry> = state
            .resource_flags
            .iter()
            .rev()
            .map(|flag| ResourceFlagEntry {
                flag: flag.clone(),
                resource: state.resources.get(&flag.resource_id).map(|r| FlaggedResource {
                    resource: r.clone(),
                    user: state.users.get(&r.user_id).map(UserRecord::public_profile),
                }),
                flagger: state.users.get(&flag.flagger_id).map(UserRecord::public_profile),
            })
            .collect();

        entries.sort_by(|a, b| b.flag.created_at.cmp(&a.flag.created_at));
        Ok(entries)
    }

    async fn list_chat_reports(&self) -> Result<Vec<ChatReportEntry>> {
        let state = self.state.read().await;

        let mut entries: Vec<ChatReportEntry> = state
            .chat_reports
            .iter()
            .rev()
            .map(|report| ChatReportEntry {
                report: report.clone(),
                reporter: state.users.get(&report.reporter_id).map(UserRecord::report_party),
                reported_user: state
                    .users
                    .get(&report.reported_user_id)
                    .map(UserRecord::report_party),
            })
            .collect();

        entries.sort_by(|a, b| b.report.created_at.cmp(&a.report.created_at));
        Ok(entries)
    }

    async fn statistics(&self) -> Result<PlatformStatistics> {
        let state = self.state.read().await;
        let count_flagged = |table: &HashMap<Uuid, ContentItem>| {
            table
                .values()
                .filter(|item| item.status == ContentStatus::Flagged)
                .count() as i64
        };

        Ok(PlatformStatistics {
            total_users: state.users.len() as i64,
            total_posts: state.posts.len() as i64,
            total_comments: state.comments.len() as i64,
            flagged_posts: count_flagged(&state.posts),
            flagged_comments: count_flagged(&state.comments),
            banned_users: state.users.values().filter(|u| u.is_banned).count() as i64,
        })
    }

    async fn ban_user(&self, user_id: Uuid) -> Result<Option<BanOutcome>> {
        let mut state = self.state.write().await;

        let Some(user) = state.users.get_mut(&user_id) else {
            return Ok(None);
        };
        user.is_banned = true;

        let rejected_posts = state.reject_flagged(ContentKind::Post, user_id);
        let rejected_comments = state.reject_flagged(ContentKind::Comment, user_id);

        Ok(Some(BanOutcome {
            user_id,
            is_banned: true,
            rejected_posts,
            rejected_comments,
        }))
    }

    async fn unban_user(&self, user_id: Uuid) -> Result<Option<BanOutcome>> {
        let mut state = self.state.write().await;

        let Some(user) = state.users.get_mut(&user_id) else {
            return Ok(None);
        };
        user.is_banned = false;

        Ok(Some(BanOutcome {
            user_id,
            is_banned: false,
            rejected_posts: 0,
            rejected_comments: 0,
        }))
    }

    async fn list_pending_alumni(&self) -> Result<Vec<PendingAlumnus>> {
        let state = self.state.read().await;

        let mut alumni: Vec<PendingAlumnus> = state
            .users
            .values()
            .filter(|u| u.role == ALUMNI_ROLE && u.approval_status == Some(ApprovalStatus::Pending))
            .map(UserRecord::pending_alumnus)
            .collect();

        alumni.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(alumni)
    }

    async fn set_alumni_approval(&self, user_id: Uuid, status: ApprovalStatus) -> Result<bool> {
        let mut state = self.state.write().await;

        match state.users.get_mut(&user_id) {
            Some(user) if user.role == ALUMNI_ROLE => {
                user.approval_status = Some(status);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
