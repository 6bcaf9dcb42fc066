// Decision service - admin approve/reject of flagged posts and comments
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::ModerationStore;
use crate::error::{AppError, Result};
use crate::models::{ContentItem, ContentKind, ContentStatus};

/// Which source statuses an admin decision may transition from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionPolicy {
    /// Any status may be moved to published or rejected.
    #[default]
    Override,
    /// Only flagged content may be decided; everything else is a conflict.
    RequireFlagged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionAction {
    Approve,
    Reject,
}

impl DecisionAction {
    pub fn target_status(&self) -> ContentStatus {
        match self {
            DecisionAction::Approve => ContentStatus::Published,
            DecisionAction::Reject => ContentStatus::Rejected,
        }
    }
}

impl fmt::Display for DecisionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionAction::Approve => f.write_str("approve"),
            DecisionAction::Reject => f.write_str("reject"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Decision {
    pub kind: ContentKind,
    pub id: Uuid,
    pub action: DecisionAction,
    /// Version the admin last saw; a mismatch means someone else got there first.
    pub expected_version: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct DecisionOutcome {
    pub item: ContentItem,
    /// `false` when the item already had the requested status.
    pub changed: bool,
}

pub struct DecisionService {
    store: Arc<dyn ModerationStore>,
    policy: DecisionPolicy,
}

impl DecisionService {
    pub fn new(store: Arc<dyn ModerationStore>, policy: DecisionPolicy) -> Self {
        Self { store, policy }
    }

    pub async fn decide(&self, decision: Decision) -> Result<DecisionOutcome> {
        let current = self
            .store
            .find_content(decision.kind, decision.id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("{} {} not found", decision.kind, decision.id))
            })?;

        let target = decision.action.target_status();
        if current.status == target {
            tracing::debug!(
                target_type = %decision.kind,
                target_id = %decision.id,
                status = %target,
                "Decision already applied"
            );
            return Ok(DecisionOutcome {
                item: current,
                changed: false,
            });
        }

        if self.policy == DecisionPolicy::RequireFlagged && current.status != ContentStatus::Flagged
        {
            return Err(AppError::Conflict(format!(
                "{} {} is {} and not awaiting review",
                decision.kind, decision.id, current.status
            )));
        }

        if let Some(expected) = decision.expected_version {
            if expected != current.version {
                return Err(AppError::Conflict(format!(
                    "{} {} has changed since version {}",
                    decision.kind, decision.id, expected
                )));
            }
        }

        let updated = self
            .store
            .update_content_status(decision.kind, decision.id, target, current.version)
            .await?;

        let Some(item) = updated else {
            tracing::warn!(
                target_type = %decision.kind,
                target_id = %decision.id,
                "Concurrent modification while applying decision"
            );
            return Err(AppError::Conflict(format!(
                "{} {} was modified concurrently",
                decision.kind, decision.id
            )));
        };

        tracing::info!(
            target_type = %decision.kind,
            target_id = %decision.id,
            action = %decision.action,
            from = %current.status,
            to = %item.status,
            "Moderation decision applied"
        );

        Ok(DecisionOutcome {
            item,
            changed: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use chrono::Utc;

    fn post(status: ContentStatus) -> ContentItem {
        let now = Utc::now();
        ContentItem {
            id: Uuid::new_v4(),
            kind: ContentKind::Post,
            user_id: Uuid::new_v4(),
            post_id: None,
            content: "text".to_string(),
            status,
            flagged_reason: None,
            toxicity_scores: None,
            tags: Vec::new(),
            comments_count: 0,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    async fn service_with(item: &ContentItem, policy: DecisionPolicy) -> DecisionService {
        let store = MemoryStore::new();
        store.put_content(item.clone()).await;
        DecisionService::new(Arc::new(store), policy)
    }

    fn decision(item: &ContentItem, action: DecisionAction) -> Decision {
        Decision {
            kind: item.kind,
            id: item.id,
            action,
            expected_version: None,
        }
    }

    #[tokio::test]
    async fn test_reject_flagged_post() {
        let item = post(ContentStatus::Flagged);
        let service = service_with(&item, DecisionPolicy::Override).await;

        let outcome = service
            .decide(decision(&item, DecisionAction::Reject))
            .await
            .unwrap();

        assert!(outcome.changed);
        assert_eq!(outcome.item.status, ContentStatus::Rejected);
        assert_eq!(outcome.item.version, 1);
    }

    #[tokio::test]
    async fn test_repeat_decision_is_noop() {
        let item = post(ContentStatus::Flagged);
        let service = service_with(&item, DecisionPolicy::Override).await;

        service
            .decide(decision(&item, DecisionAction::Approve))
            .await
            .unwrap();
        let again = service
            .decide(decision(&item, DecisionAction::Approve))
            .await
            .unwrap();

        assert!(!again.changed);
        assert_eq!(again.item.status, ContentStatus::Published);
        assert_eq!(again.item.version, 1);
    }

    #[tokio::test]
    async fn test_override_allows_rejecting_published() {
        let item = post(ContentStatus::Published);
        let service = service_with(&item, DecisionPolicy::Override).await;

        let outcome = service
            .decide(decision(&item, DecisionAction::Reject))
            .await
            .unwrap();
        assert_eq!(outcome.item.status, ContentStatus::Rejected);
    }

    #[tokio::test]
    async fn test_require_flagged_refuses_other_statuses() {
        let item = post(ContentStatus::Rejected);
        let service = service_with(&item, DecisionPolicy::RequireFlagged).await;

        let result = service.decide(decision(&item, DecisionAction::Approve)).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_stale_version_conflicts() {
        let item = post(ContentStatus::Flagged);
        let service = service_with(&item, DecisionPolicy::Override).await;

        let mut stale = decision(&item, DecisionAction::Reject);
        stale.expected_version = Some(3);

        let result = service.decide(stale).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_unknown_target_is_not_found() {
        let item = post(ContentStatus::Flagged);
        let service = DecisionService::new(Arc::new(MemoryStore::new()), DecisionPolicy::Override);

        let result = service.decide(decision(&item, DecisionAction::Reject)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_concurrent_update_conflicts_without_writing() {
        use crate::db::MockModerationStore;

        let item = post(ContentStatus::Flagged);
        let seen = item.clone();

        let mut store = MockModerationStore::new();
        store
            .expect_find_content()
            .times(1)
            .returning(move |_, _| Ok(Some(seen.clone())));
        // Another admin bumped the version between read and write.
        store
            .expect_update_content_status()
            .withf(|kind, _, status, version| {
                *kind == ContentKind::Post && *status == ContentStatus::Rejected && *version == 0
            })
            .times(1)
            .returning(|_, _, _, _| Ok(None));

        let service = DecisionService::new(Arc::new(store), DecisionPolicy::Override);
        let result = service.decide(decision(&item, DecisionAction::Reject)).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_stale_version_leaves_item_untouched() {
        let item = post(ContentStatus::Flagged);
        let store = MemoryStore::new();
        store.put_content(item.clone()).await;
        let service = DecisionService::new(Arc::new(store.clone()), DecisionPolicy::Override);

        let first = Decision {
            expected_version: Some(0),
            ..decision(&item, DecisionAction::Approve)
        };
        let second = Decision {
            expected_version: Some(0),
            ..decision(&item, DecisionAction::Reject)
        };

        service.decide(first).await.unwrap();
        let result = service.decide(second).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        let stored = store
            .find_content(ContentKind::Post, item.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, ContentStatus::Published);
        assert_eq!(stored.version, 1);
    }

    #[test]
    fn test_policy_deserializes_snake_case() {
        let policy: DecisionPolicy = serde_json::from_str("\"require_flagged\"").unwrap();
        assert_eq!(policy, DecisionPolicy::RequireFlagged);
        assert_eq!(DecisionPolicy::default(), DecisionPolicy::Override);
    }
}
