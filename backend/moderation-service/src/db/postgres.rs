use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::ModerationStore;
use crate::config::DatabaseConfig;
use crate::error::{AppError, Result};
use crate::models::{
    ApprovalStatus, BanOutcome, ChatReport, ChatReportEntry, ContentItem, ContentKind,
    ContentStatus, FlaggedContent, FlaggedResource, NewChatReport, NewContent, PendingAlumnus,
    PlatformStatistics, PublicProfile, ReportParty, Resource, ResourceFlag, ResourceFlagEntry,
    UserRecord, ALUMNI_ROLE, REPORT_STATUS_PENDING, RESOURCE_FLAG_REASON,
};

const POST_COLUMNS: &str = r#"
    id,
    user_id,
    NULL::uuid AS post_id,
    content,
    COALESCE(status, 'published') AS status,
    flagged_reason,
    toxicity_scores,
    COALESCE(tags, '{}'::text[]) AS tags,
    COALESCE(comments_count, 0)::bigint AS comments_count,
    version,
    COALESCE(created_at, NOW()) AS created_at,
    COALESCE(updated_at, created_at, NOW()) AS updated_at
"#;

const COMMENT_COLUMNS: &str = r#"
    id,
    user_id,
    post_id,
    content,
    COALESCE(status, 'published') AS status,
    flagged_reason,
    toxicity_scores,
    '{}'::text[] AS tags,
    0::bigint AS comments_count,
    version,
    COALESCE(created_at, NOW()) AS created_at,
    COALESCE(updated_at, created_at, NOW()) AS updated_at
"#;

const USER_COLUMNS: &str = r#"
    id,
    email,
    full_name,
    avatar_url,
    role,
    approval_status,
    graduating_batch,
    current_company,
    current_job_title,
    COALESCE(is_banned, false) AS is_banned,
    COALESCE(is_chat_banned, false) AS is_chat_banned,
    COALESCE(created_at, NOW()) AS created_at
"#;

fn columns(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Post => POST_COLUMNS,
        ContentKind::Comment => COMMENT_COLUMNS,
    }
}

fn parse_status(raw: &str) -> Result<ContentStatus> {
    raw.parse()
        .map_err(|e: String| AppError::Internal(anyhow::anyhow!(e)))
}

#[derive(Debug, FromRow)]
struct ContentRow {
    id: Uuid,
    user_id: Uuid,
    post_id: Option<Uuid>,
    content: String,
    status: String,
    flagged_reason: Option<String>,
    toxicity_scores: Option<serde_json::Value>,
    tags: Vec<String>,
    comments_count: i64,
    version: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ContentRow {
    fn into_item(self, kind: ContentKind) -> Result<ContentItem> {
        Ok(ContentItem {
            id: self.id,
            kind,
            user_id: self.user_id,
            post_id: self.post_id,
            content: self.content,
            status: parse_status(&self.status)?,
            flagged_reason: self.flagged_reason,
            toxicity_scores: self.toxicity_scores,
            tags: self.tags,
            comments_count: self.comments_count,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    full_name: Option<String>,
    avatar_url: Option<String>,
    role: String,
    approval_status: Option<String>,
    graduating_batch: Option<String>,
    current_company: Option<String>,
    current_job_title: Option<String>,
    is_banned: bool,
    is_chat_banned: bool,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        UserRecord {
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            avatar_url: row.avatar_url,
            role: row.role,
            // Unknown approval values are treated as absent rather than failing the lookup.
            approval_status: row.approval_status.and_then(|s| s.parse().ok()),
            graduating_batch: row.graduating_batch,
            current_company: row.current_company,
            current_job_title: row.current_job_title,
            is_banned: row.is_banned,
            is_chat_banned: row.is_chat_banned,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct FlaggedRow {
    id: Uuid,
    post_id: Option<Uuid>,
    content: String,
    status: String,
    flagged_reason: Option<String>,
    version: i32,
    created_at: DateTime<Utc>,
    author_id: Option<Uuid>,
    author_name: Option<String>,
    author_email: Option<String>,
    author_avatar: Option<String>,
}

fn profile(
    id: Option<Uuid>,
    full_name: Option<String>,
    email: Option<String>,
    avatar_url: Option<String>,
) -> Option<PublicProfile> {
    Some(PublicProfile {
        id: id?,
        full_name,
        email: email.unwrap_or_default(),
        avatar_url,
    })
}

#[derive(Debug, FromRow)]
struct ResourceFlagRow {
    id: Uuid,
    resource_id: Uuid,
    flagger_id: Uuid,
    reason: String,
    status: String,
    created_at: DateTime<Utc>,
    r_id: Option<Uuid>,
    r_user_id: Option<Uuid>,
    r_title: Option<String>,
    r_description: Option<String>,
    r_file_url: Option<String>,
    r_file_name: Option<String>,
    r_status: Option<String>,
    r_created_at: Option<DateTime<Utc>>,
    ru_id: Option<Uuid>,
    ru_full_name: Option<String>,
    ru_email: Option<String>,
    ru_avatar_url: Option<String>,
    fu_id: Option<Uuid>,
    fu_full_name: Option<String>,
    fu_email: Option<String>,
    fu_avatar_url: Option<String>,
}

impl ResourceFlagRow {
    fn into_entry(self) -> Result<ResourceFlagEntry> {
        let resource = match (self.r_id, self.r_user_id) {
            (Some(id), Some(user_id)) => Some(FlaggedResource {
                resource: Resource {
                    id,
                    user_id,
                    title: self.r_title.unwrap_or_default(),
                    description: self.r_description,
                    file_url: self.r_file_url.unwrap_or_default(),
                    file_name: self.r_file_name,
                    status: parse_status(self.r_status.as_deref().unwrap_or("published"))?,
                    created_at: self.r_created_at.unwrap_or(self.created_at),
                },
                user: profile(self.ru_id, self.ru_full_name, self.ru_email, self.ru_avatar_url),
            }),
            _ => None,
        };

        Ok(ResourceFlagEntry {
            flag: ResourceFlag {
                id: self.id,
                resource_id: self.resource_id,
                flagger_id: self.flagger_id,
                reason: self.reason,
                status: self.status,
                created_at: self.created_at,
            },
            resource,
            flagger: profile(self.fu_id, self.fu_full_name, self.fu_email, self.fu_avatar_url),
        })
    }
}

#[derive(Debug, FromRow)]
struct ChatReportRow {
    id: Uuid,
    conversation_id: Uuid,
    reporter_id: Uuid,
    reported_user_id: Uuid,
    reason: String,
    status: String,
    created_at: DateTime<Utc>,
    rp_id: Option<Uuid>,
    rp_full_name: Option<String>,
    rp_email: Option<String>,
    rp_avatar_url: Option<String>,
    rp_is_banned: Option<bool>,
    rp_is_chat_banned: Option<bool>,
    ru_id: Option<Uuid>,
    ru_full_name: Option<String>,
    ru_email: Option<String>,
    ru_avatar_url: Option<String>,
    ru_is_banned: Option<bool>,
    ru_is_chat_banned: Option<bool>,
}

impl From<ChatReportRow> for ChatReportEntry {
    fn from(row: ChatReportRow) -> Self {
        let reporter = row.rp_id.map(|id| ReportParty {
            id,
            full_name: row.rp_full_name,
            email: row.rp_email.unwrap_or_default(),
            avatar_url: row.rp_avatar_url,
            is_banned: row.rp_is_banned.unwrap_or(false),
            is_chat_banned: row.rp_is_chat_banned.unwrap_or(false),
        });
        let reported_user = row.ru_id.map(|id| ReportParty {
            id,
            full_name: row.ru_full_name,
            email: row.ru_email.unwrap_or_default(),
            avatar_url: row.ru_avatar_url,
            is_banned: row.ru_is_banned.unwrap_or(false),
            is_chat_banned: row.ru_is_chat_banned.unwrap_or(false),
        });

        ChatReportEntry {
            report: ChatReport {
                id: row.id,
                conversation_id: row.conversation_id,
                reporter_id: row.reporter_id,
                reported_user_id: row.reported_user_id,
                reason: row.reason,
                status: row.status,
                created_at: row.created_at,
            },
            reporter,
            reported_user,
        }
    }
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;

        tracing::info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    async fn set_banned_flag(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: Uuid,
        banned: bool,
    ) -> Result<bool> {
        let updated = sqlx::query("UPDATE users SET is_banned = $1, updated_at = NOW() WHERE id = $2")
            .bind(banned)
            .bind(user_id)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(updated > 0)
    }
}

#[async_trait]
impl ModerationStore for PgStore {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<UserRecord>> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, UserRow>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user.map(UserRecord::from))
    }

    async fn find_content(&self, kind: ContentKind, id: Uuid) -> Result<Option<ContentItem>> {
        let query = format!("SELECT {} FROM {} WHERE id = $1", columns(kind), kind.table());
        let row = sqlx::query_as::<_, ContentRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_item(kind)).transpose()
    }

    async fn insert_content(&self, content: NewContent) -> Result<ContentItem> {
        let mut tx = self.pool.begin().await?;

        let row = match content.kind {
            ContentKind::Post => {
                let query = format!(
                    r#"
                    INSERT INTO posts (user_id, content, tags, status, flagged_reason, toxicity_scores, version)
                    VALUES ($1, $2, $3, $4, $5, $6, 0)
                    RETURNING {}
                    "#,
                    POST_COLUMNS
                );
                sqlx::query_as::<_, ContentRow>(&query)
                    .bind(content.user_id)
                    .bind(&content.content)
                    .bind(&content.tags)
                    .bind(content.status.as_str())
                    .bind(&content.flagged_reason)
                    .bind(&content.toxicity_scores)
                    .fetch_one(&mut *tx)
                    .await?
            }
            ContentKind::Comment => {
                let post_id = content.post_id.ok_or_else(|| {
                    AppError::BadRequest("Comment requires a post id".to_string())
                })?;
                let query = format!(
                    r#"
                    INSERT INTO comments (post_id, user_id, content, status, flagged_reason, toxicity_scores, version)
                    VALUES ($1, $2, $3, $4, $5, $6, 0)
                    RETURNING {}
                    "#,
                    COMMENT_COLUMNS
                );
                let row = sqlx::query_as::<_, ContentRow>(&query)
                    .bind(post_id)
                    .bind(content.user_id)
                    .bind(&content.content)
                    .bind(content.status.as_str())
                    .bind(&content.flagged_reason)
                    .bind(&content.toxicity_scores)
                    .fetch_one(&mut *tx)
                    .await?;

                if content.status == ContentStatus::Published {
                    sqlx::query(
                        "UPDATE posts SET comments_count = COALESCE(comments_count, 0) + 1 WHERE id = $1",
                    )
                    .bind(post_id)
                    .execute(&mut *tx)
                    .await?;
                }

                row
            }
        };

        tx.commit().await?;

        row.into_item(content.kind)
    }

    async fn update_content_status(
        &self,
        kind: ContentKind,
        id: Uuid,
        status: ContentStatus,
        expected_version: i32,
    ) -> Result<Option<ContentItem>> {
        let query = format!(
            r#"
            UPDATE {}
            SET status = $1, version = version + 1, updated_at = NOW()
            WHERE id = $2 AND version = $3
            RETURNING {}
            "#,
            kind.table(),
            columns(kind)
        );

        let row = sqlx::query_as::<_, ContentRow>(&query)
            .bind(status.as_str())
            .bind(id)
            .bind(expected_version)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_item(kind)).transpose()
    }

    async fn list_flagged_content(&self, kind: ContentKind) -> Result<Vec<FlaggedContent>> {
        let post_id = match kind {
            ContentKind::Post => "NULL::uuid",
            ContentKind::Comment => "c.post_id",
        };
        let query = format!(
            r#"
            SELECT
                c.id,
                {} AS post_id,
                c.content,
                c.status,
                c.flagged_reason,
                c.version,
                COALESCE(c.created_at, NOW()) AS created_at,
                u.id AS author_id,
                u.full_name AS author_name,
                u.email AS author_email,
                u.avatar_url AS author_avatar
            FROM {} c
            LEFT JOIN users u ON u.id = c.user_id
            WHERE c.status = 'flagged'
            ORDER BY c.created_at DESC
            "#,
            post_id,
            kind.table()
        );

        let rows = sqlx::query_as::<_, FlaggedRow>(&query)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                Ok(FlaggedContent {
                    id: row.id,
                    post_id: row.post_id,
                    content: row.content,
                    status: parse_status(&row.status)?,
                    flagged_reason: row.flagged_reason,
                    version: row.version,
                    created_at: row.created_at,
                    user: profile(
                        row.author_id,
                        row.author_name,
                        row.author_email,
                        row.author_avatar,
                    ),
                })
            })
            .collect()
    }

    async fn insert_chat_report(&self, report: NewChatReport) -> Result<ChatReport> {
        let row: (Uuid, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO chat_reports (conversation_id, reporter_id, reported_user_id, reason, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, created_at
            "#,
        )
        .bind(report.conversation_id)
        .bind(report.reporter_id)
        .bind(report.reported_user_id)
        .bind(&report.reason)
        .bind(REPORT_STATUS_PENDING)
        .fetch_one(&self.pool)
        .await?;

        Ok(ChatReport {
            id: row.0,
            conversation_id: report.conversation_id,
            reporter_id: report.reporter_id,
            reported_user_id: report.reported_user_id,
            reason: report.reason,
            status: REPORT_STATUS_PENDING.to_string(),
            created_at: row.1,
        })
    }

    async fn flag_resource(
        &self,
        resource_id: Uuid,
        flagger_id: Uuid,
    ) -> Result<Option<ResourceFlag>> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM resources WHERE id = $1 FOR UPDATE")
                .bind(resource_id)
                .fetch_optional(&mut *tx)
                .await?;

        if exists.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let (id, created_at): (Uuid, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO resource_flags (resource_id, flagger_id, reason, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id, created_at
            "#,
        )
        .bind(resource_id)
        .bind(flagger_id)
        .bind(RESOURCE_FLAG_REASON)
        .bind(REPORT_STATUS_PENDING)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE resources SET status = 'flagged' WHERE id = $1")
            .bind(resource_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(ResourceFlag {
            id,
            resource_id,
            flagger_id,
            reason: RESOURCE_FLAG_REASON.to_string(),
            status: REPORT_STATUS_PENDING.to_string(),
            created_at,
        }))
    }

    async fn list_resource_flags(&self) -> Result<Vec<ResourceFlagEntry>> {
        let rows = sqlx::query_as::<_, ResourceFlagRow>(
            r#"
            SELECT
                f.id, f.resource_id, f.flagger_id, f.reason, f.status,
                COALESCE(f.created_at, NOW()) AS created_at,
                r.id AS r_id, r.user_id AS r_user_id, r.title AS r_title,
                r.description AS r_description, r.file_url AS r_file_url,
                r.file_name AS r_file_name, r.status AS r_status, r.created_at AS r_created_at,
                ru.id AS ru_id, ru.full_name AS ru_full_name, ru.email AS ru_email,
                ru.avatar_url AS ru_avatar_url,
                fu.id AS fu_id, fu.full_name AS fu_full_name, fu.email AS fu_email,
                fu.avatar_url AS fu_avatar_url
            FROM resource_flags f
            LEFT JOIN resources r ON r.id = f.resource_id
            LEFT JOIN users ru ON ru.id = r.user_id
            LEFT JOIN users fu ON fu.id = f.flagger_id
            ORDER BY f.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ResourceFlagRow::into_entry).collect()
    }

    async fn list_chat_reports(&self) -> Result<Vec<ChatReportEntry>> {
        let rows = sqlx::query_as::<_, ChatReportRow>(
            r#"
            SELECT
                cr.id, cr.conversation_id, cr.reporter_id, cr.reported_user_id,
                cr.reason, cr.status, COALESCE(cr.created_at, NOW()) AS created_at,
                rp.id AS rp_id, rp.full_name AS rp_full_name, rp.email AS rp_email,
                rp.avatar_url AS rp_avatar_url, rp.is_banned AS rp_is_banned,
                rp.is_chat_banned AS rp_is_chat_banned,
                ru.id AS ru_id, ru.full_name AS ru_full_name, ru.email AS ru_email,
                ru.avatar_url AS ru_avatar_url, ru.is_banned AS ru_is_banned,
                ru.is_chat_banned AS ru_is_chat_banned
            FROM chat_reports cr
            LEFT JOIN users rp ON rp.id = cr.reporter_id
            LEFT JOIN users ru ON ru.id = cr.reported_user_id
            ORDER BY cr.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ChatReportEntry::from).collect())
    }

    async fn statistics(&self) -> Result<PlatformStatistics> {
        let stats = sqlx::query_as::<_, PlatformStatistics>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM posts) AS total_posts,
                (SELECT COUNT(*) FROM comments) AS total_comments,
                (SELECT COUNT(*) FROM posts WHERE status = 'flagged') AS flagged_posts,
                (SELECT COUNT(*) FROM comments WHERE status = 'flagged') AS flagged_comments,
                (SELECT COUNT(*) FROM users WHERE is_banned = true) AS banned_users
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }

    async fn ban_user(&self, user_id: Uuid) -> Result<Option<BanOutcome>> {
        let mut tx = self.pool.begin().await?;

        if !Self::set_banned_flag(&mut tx, user_id, true).await? {
            tx.rollback().await?;
            return Ok(None);
        }

        let rejected_posts = sqlx::query(
            r#"
            UPDATE posts
            SET status = 'rejected', version = version + 1, updated_at = NOW()
            WHERE user_id = $1 AND status = 'flagged'
            "#,
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let rejected_comments = sqlx::query(
            r#"
            UPDATE comments
            SET status = 'rejected', version = version + 1, updated_at = NOW()
            WHERE user_id = $1 AND status = 'flagged'
            "#,
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        Ok(Some(BanOutcome {
            user_id,
            is_banned: true,
            rejected_posts,
            rejected_comments,
        }))
    }

    async fn unban_user(&self, user_id: Uuid) -> Result<Option<BanOutcome>> {
        let mut tx = self.pool.begin().await?;

        if !Self::set_banned_flag(&mut tx, user_id, false).await? {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;

        Ok(Some(BanOutcome {
            user_id,
            is_banned: false,
            rejected_posts: 0,
            rejected_comments: 0,
        }))
    }

    async fn list_pending_alumni(&self) -> Result<Vec<PendingAlumnus>> {
        let query = format!(
            r#"
            SELECT {} FROM users
            WHERE role = $1 AND approval_status = $2
            ORDER BY created_at DESC
            "#,
            USER_COLUMNS
        );

        let rows = sqlx::query_as::<_, UserRow>(&query)
            .bind(ALUMNI_ROLE)
            .bind(ApprovalStatus::Pending.as_str())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| UserRecord::from(row).pending_alumnus())
            .collect())
    }

    async fn set_alumni_approval(&self, user_id: Uuid, status: ApprovalStatus) -> Result<bool> {
        let updated = sqlx::query(
            "UPDATE users SET approval_status = $1, updated_at = NOW() WHERE id = $2 AND role = $3",
        )
        .bind(status.as_str())
        .bind(user_id)
        .bind(ALUMNI_ROLE)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }
}
