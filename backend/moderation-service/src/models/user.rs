use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Platform identity as stored in `users`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: String,
    pub approval_status: Option<ApprovalStatus>,
    pub graduating_batch: Option<String>,
    pub current_company: Option<String>,
    pub current_job_title: Option<String>,
    pub is_banned: bool,
    pub is_chat_banned: bool,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn public_profile(&self) -> PublicProfile {
        PublicProfile {
            id: self.id,
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }

    pub fn report_party(&self) -> ReportParty {
        ReportParty {
            id: self.id,
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            avatar_url: self.avatar_url.clone(),
            is_banned: self.is_banned,
            is_chat_banned: self.is_chat_banned,
        }
    }

    pub fn pending_alumnus(&self) -> PendingAlumnus {
        PendingAlumnus {
            id: self.id,
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            graduating_batch: self.graduating_batch.clone(),
            current_company: self.current_company.clone(),
            current_job_title: self.current_job_title.clone(),
            avatar_url: self.avatar_url.clone(),
            created_at: self.created_at,
        }
    }
}

pub const ALUMNI_ROLE: &str = "alumni";

/// Public identity fields attached to queue entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub email: String,
    pub avatar_url: Option<String>,
}

/// Identity fields shown on chat reports, including ban flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportParty {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub email: String,
    pub avatar_url: Option<String>,
    pub is_banned: bool,
    pub is_chat_banned: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApprovalStatus::Pending),
            "approved" => Ok(ApprovalStatus::Approved),
            "rejected" => Ok(ApprovalStatus::Rejected),
            other => Err(format!("unknown approval status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingAlumnus {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub graduating_batch: Option<String>,
    pub current_company: Option<String>,
    pub current_job_title: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Result of toggling a user's ban flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BanOutcome {
    pub user_id: Uuid,
    pub is_banned: bool,
    pub rejected_posts: u64,
    pub rejected_comments: u64,
}

/// Aggregate counters for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, FromRow)]
pub struct PlatformStatistics {
    pub total_users: i64,
    pub total_posts: i64,
    pub total_comments: i64,
    pub flagged_posts: i64,
    pub flagged_comments: i64,
    pub banned_users: i64,
}
