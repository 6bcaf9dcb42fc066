#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use moderation_service::config::{
    AccessConfig, ClassifierConfig, Config, DatabaseConfig, JwtConfig, ModerationConfig,
    ServerConfig,
};
use moderation_service::db::MemoryStore;
use moderation_service::middleware::Claims;
use moderation_service::models::{
    ApprovalStatus, ContentItem, ContentKind, ContentStatus, Resource, UserRecord,
};
use moderation_service::services::classifier::ClassifierError;
use moderation_service::services::{
    AllowList, DecisionPolicy, ModerationPipeline, ToxicityCategory, ToxicityClassifier,
    ToxicityScores, TOXICITY_THRESHOLD,
};
use moderation_service::AppState;

pub const JWT_SECRET: &str = "integration-test-secret";
pub const ADMIN_EMAIL: &str = "dean@campus.edu";
pub const ALLOWED_DOMAIN: &str = "campus.edu";

/// Returns a fixed TOXICITY score, or fails like an unreachable service.
pub struct StubClassifier {
    score: Option<f64>,
}

impl StubClassifier {
    pub fn scoring(score: f64) -> Self {
        Self { score: Some(score) }
    }

    pub fn unavailable() -> Self {
        Self { score: None }
    }
}

#[async_trait]
impl ToxicityClassifier for StubClassifier {
    async fn classify(&self, _text: &str) -> Result<ToxicityScores, ClassifierError> {
        match self.score {
            Some(score) => Ok([(ToxicityCategory::Toxicity, score)].into_iter().collect()),
            None => Err(ClassifierError::Status(503)),
        }
    }
}

pub fn user(email: &str) -> UserRecord {
    UserRecord {
        id: Uuid::new_v4(),
        email: email.to_string(),
        full_name: Some(email.split('@').next().unwrap_or_default().to_string()),
        avatar_url: None,
        role: "student".to_string(),
        approval_status: None,
        graduating_batch: None,
        current_company: None,
        current_job_title: None,
        is_banned: false,
        is_chat_banned: false,
        created_at: Utc::now(),
    }
}

pub fn pending_alumnus(email: &str) -> UserRecord {
    UserRecord {
        role: "alumni".to_string(),
        approval_status: Some(ApprovalStatus::Pending),
        graduating_batch: Some("2019".to_string()),
        ..user(email)
    }
}

pub fn content(kind: ContentKind, user_id: Uuid, status: ContentStatus) -> ContentItem {
    let now = Utc::now();
    ContentItem {
        id: Uuid::new_v4(),
        kind,
        user_id,
        post_id: None,
        content: format!("{} body", kind),
        status,
        flagged_reason: (status == ContentStatus::Flagged)
            .then(|| "Flagged for: TOXICITY (91%)".to_string()),
        toxicity_scores: None,
        tags: Vec::new(),
        comments_count: 0,
        version: 0,
        created_at: now,
        updated_at: now,
    }
}

pub fn resource(user_id: Uuid) -> Resource {
    Resource {
        id: Uuid::new_v4(),
        user_id,
        title: "Lecture notes".to_string(),
        description: Some("Week 3".to_string()),
        file_url: "https://files.campus.edu/notes.pdf".to_string(),
        file_name: Some("notes.pdf".to_string()),
        status: ContentStatus::Published,
        created_at: Utc::now(),
    }
}

pub fn test_config(policy: DecisionPolicy) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            url: "memory:".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
        },
        access: AccessConfig {
            admin_emails: ADMIN_EMAIL.to_string(),
            allowed_domains: ALLOWED_DOMAIN.to_string(),
            reload_from_env: false,
        },
        classifier: ClassifierConfig {
            endpoint: "http://127.0.0.1:9/unused".to_string(),
            api_key: None,
            timeout_ms: 200,
            threshold: TOXICITY_THRESHOLD,
            languages: "en,hi".to_string(),
        },
        moderation: ModerationConfig {
            decision_policy: policy,
        },
    }
}

pub fn app_state(
    store: &MemoryStore,
    classifier: impl ToxicityClassifier + 'static,
    policy: DecisionPolicy,
) -> AppState {
    AppState {
        store: Arc::new(store.clone()),
        pipeline: ModerationPipeline::new(
            Arc::new(classifier),
            TOXICITY_THRESHOLD,
            Duration::from_millis(200),
        ),
        access: Arc::new(AllowList::new([ADMIN_EMAIL], [ALLOWED_DOMAIN])),
        config: Arc::new(test_config(policy)),
    }
}

pub fn token_for(user: &UserRecord) -> String {
    token_with_email(user, &user.email)
}

/// Token for `user` whose email claim says something else.
pub fn token_with_email(user: &UserRecord, email: &str) -> String {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user.id.to_string(),
        email: email.to_string(),
        exp: now + 3600,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("token encodes")
}
