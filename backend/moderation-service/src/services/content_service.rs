// Content service - runs new posts and comments through the moderation pipeline
use std::sync::Arc;
use uuid::Uuid;

use super::moderation::{ModerationOutcome, ModerationPipeline};
use crate::db::ModerationStore;
use crate::error::{AppError, Result};
use crate::models::{ContentItem, ContentKind, NewContent};

/// Measured in UTF-16 code units, the length browser clients enforce.
pub const MAX_POST_LENGTH: usize = 5000;

pub struct ContentService {
    store: Arc<dyn ModerationStore>,
    pipeline: ModerationPipeline,
}

/// Stored item together with the moderation outcome that decided its status.
#[derive(Debug, Clone)]
pub struct CreatedContent {
    pub item: ContentItem,
    pub outcome: ModerationOutcome,
}

impl ContentService {
    pub fn new(store: Arc<dyn ModerationStore>, pipeline: ModerationPipeline) -> Self {
        Self { store, pipeline }
    }

    /// Authors that are banned or unknown to the identity store may not post.
    async fn ensure_can_author(&self, author_id: Uuid, activity: &str) -> Result<()> {
        match self.store.find_user(author_id).await? {
            Some(user) if !user.is_banned => Ok(()),
            Some(_) => {
                tracing::info!(user_id = %author_id, "Banned user attempted {}", activity);
                Err(AppError::Banned(format!("You have been banned from {}", activity)))
            }
            None => Err(AppError::Banned(format!("You have been banned from {}", activity))),
        }
    }

    pub async fn create_post(
        &self,
        author_id: Uuid,
        content: &str,
        tags: Vec<String>,
    ) -> Result<CreatedContent> {
        self.ensure_can_author(author_id, "posting").await?;

        if content.trim().is_empty() {
            return Err(AppError::BadRequest("Content is required".to_string()));
        }
        if content.encode_utf16().count() > MAX_POST_LENGTH {
            return Err(AppError::BadRequest(format!(
                "Content must be less than {} characters",
                MAX_POST_LENGTH
            )));
        }

        let outcome = self.pipeline.score(content).await;
        let item = self
            .store
            .insert_content(Self::new_content(
                ContentKind::Post,
                author_id,
                None,
                content,
                tags,
                &outcome,
            ))
            .await?;

        tracing::info!(
            post_id = %item.id,
            user_id = %author_id,
            status = %item.status,
            classifier_available = outcome.is_available(),
            "Post created"
        );

        Ok(CreatedContent { item, outcome })
    }

    pub async fn create_comment(
        &self,
        author_id: Uuid,
        post_id: Uuid,
        content: &str,
    ) -> Result<CreatedContent> {
        self.ensure_can_author(author_id, "commenting").await?;

        if content.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Post ID and content are required".to_string(),
            ));
        }

        if self
            .store
            .find_content(ContentKind::Post, post_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!("Post {} not found", post_id)));
        }

        let outcome = self.pipeline.score(content).await;
        let item = self
            .store
            .insert_content(Self::new_content(
                ContentKind::Comment,
                author_id,
                Some(post_id),
                content,
                Vec::new(),
                &outcome,
            ))
            .await?;

        tracing::info!(
            comment_id = %item.id,
            post_id = %post_id,
            user_id = %author_id,
            status = %item.status,
            classifier_available = outcome.is_available(),
            "Comment created"
        );

        Ok(CreatedContent { item, outcome })
    }

    fn new_content(
        kind: ContentKind,
        user_id: Uuid,
        post_id: Option<Uuid>,
        content: &str,
        tags: Vec<String>,
        outcome: &ModerationOutcome,
    ) -> NewContent {
        NewContent {
            kind,
            user_id,
            post_id,
            content: content.to_string(),
            tags,
            status: outcome.initial_status(),
            flagged_reason: outcome.flagged_reason().map(String::from),
            toxicity_scores: outcome.scores().map(|s| s.to_json()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{ContentStatus, UserRecord};
    use crate::services::classifier::{
        ClassifierError, MockToxicityClassifier, ToxicityCategory, ToxicityScores,
    };
    use chrono::Utc;

    fn user(is_banned: bool) -> UserRecord {
        UserRecord {
            id: Uuid::new_v4(),
            email: "student@campus.edu".to_string(),
            full_name: Some("Student".to_string()),
            avatar_url: None,
            role: "student".to_string(),
            approval_status: None,
            graduating_batch: None,
            current_company: None,
            current_job_title: None,
            is_banned,
            is_chat_banned: false,
            created_at: Utc::now(),
        }
    }

    fn classifier_returning(score: f64) -> MockToxicityClassifier {
        let mut mock = MockToxicityClassifier::new();
        mock.expect_classify().returning(move |_| {
            Ok([(ToxicityCategory::Toxicity, score)]
                .into_iter()
                .collect::<ToxicityScores>())
        });
        mock
    }

    fn service(store: &MemoryStore, classifier: MockToxicityClassifier) -> ContentService {
        ContentService::new(
            Arc::new(store.clone()),
            ModerationPipeline::with_defaults(Arc::new(classifier)),
        )
    }

    #[tokio::test]
    async fn test_toxic_post_is_flagged() {
        let store = MemoryStore::new();
        let author = user(false);
        store.insert_user(author.clone()).await;

        let created = service(&store, classifier_returning(0.95))
            .create_post(author.id, "you are awful", vec!["rant".to_string()])
            .await
            .unwrap();

        assert_eq!(created.item.status, ContentStatus::Flagged);
        assert_eq!(
            created.item.flagged_reason.as_deref(),
            Some("Flagged for: TOXICITY (95%)")
        );
        assert!(created.item.toxicity_scores.is_some());
        assert_eq!(created.item.tags, vec!["rant".to_string()]);
    }

    #[tokio::test]
    async fn test_post_published_when_classifier_down() {
        let store = MemoryStore::new();
        let author = user(false);
        store.insert_user(author.clone()).await;

        let mut mock = MockToxicityClassifier::new();
        mock.expect_classify()
            .returning(|_| Err(ClassifierError::NotConfigured));

        let created = service(&store, mock)
            .create_post(author.id, "anything", Vec::new())
            .await
            .unwrap();

        assert_eq!(created.item.status, ContentStatus::Published);
        assert!(created.item.toxicity_scores.is_none());
        assert!(created.item.flagged_reason.is_none());
        assert!(!created.outcome.is_available());
    }

    #[tokio::test]
    async fn test_banned_author_is_refused() {
        let store = MemoryStore::new();
        let author = user(true);
        store.insert_user(author.clone()).await;

        let mut mock = MockToxicityClassifier::new();
        mock.expect_classify().times(0);

        let result = service(&store, mock)
            .create_post(author.id, "hello", Vec::new())
            .await;

        assert!(matches!(result, Err(AppError::Banned(_))));
        assert!(store.content_by_author(author.id).await.is_empty());
    }

    #[tokio::test]
    async fn test_post_length_and_blank_content_rejected() {
        let store = MemoryStore::new();
        let author = user(false);
        store.insert_user(author.clone()).await;
        let service = service(&store, MockToxicityClassifier::new());

        let too_long = "a".repeat(MAX_POST_LENGTH + 1);
        assert!(matches!(
            service.create_post(author.id, &too_long, Vec::new()).await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            service.create_post(author.id, "   ", Vec::new()).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_post_length_counts_utf16_units() {
        let store = MemoryStore::new();
        let author = user(false);
        store.insert_user(author.clone()).await;
        let service = service(&store, classifier_returning(0.1));

        // Each emoji is a surrogate pair.
        let at_limit = "\u{1F600}".repeat(MAX_POST_LENGTH / 2);
        let over_limit = "\u{1F600}".repeat(MAX_POST_LENGTH / 2 + 1);

        assert!(service.create_post(author.id, &at_limit, Vec::new()).await.is_ok());
        assert!(matches!(
            service.create_post(author.id, &over_limit, Vec::new()).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_published_comment_increments_counter() {
        let store = MemoryStore::new();
        let author = user(false);
        store.insert_user(author.clone()).await;
        let service = service(&store, classifier_returning(0.1));

        let post = service
            .create_post(author.id, "first post", Vec::new())
            .await
            .unwrap();
        let comment = service
            .create_comment(author.id, post.item.id, "nice")
            .await
            .unwrap();

        assert_eq!(comment.item.status, ContentStatus::Published);
        assert_eq!(comment.item.post_id, Some(post.item.id));

        let stored = store
            .find_content(ContentKind::Post, post.item.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.comments_count, 1);
    }

    #[tokio::test]
    async fn test_comment_on_missing_post_is_not_found() {
        let store = MemoryStore::new();
        let author = user(false);
        store.insert_user(author.clone()).await;

        let result = service(&store, MockToxicityClassifier::new())
            .create_comment(author.id, Uuid::new_v4(), "hello")
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
