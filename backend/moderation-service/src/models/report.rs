use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::content::Resource;
use super::user::{PublicProfile, ReportParty};

/// Reason recorded on every user-initiated resource flag.
pub const RESOURCE_FLAG_REASON: &str = "Inappropriate content";

/// Reports are created pending and never change afterwards.
pub const REPORT_STATUS_PENDING: &str = "pending";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceFlag {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub flagger_id: Uuid,
    pub reason: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReport {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub reporter_id: Uuid,
    pub reported_user_id: Uuid,
    pub reason: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewChatReport {
    pub conversation_id: Uuid,
    pub reporter_id: Uuid,
    pub reported_user_id: Uuid,
    pub reason: String,
}

/// Resource joined with its author for the queue.
#[derive(Debug, Clone, Serialize)]
pub struct FlaggedResource {
    #[serde(flatten)]
    pub resource: Resource,
    pub user: Option<PublicProfile>,
}

/// Queue entry for a resource flag.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceFlagEntry {
    #[serde(flatten)]
    pub flag: ResourceFlag,
    pub resource: Option<FlaggedResource>,
    pub flagger: Option<PublicProfile>,
}

/// Queue entry for a chat report.
#[derive(Debug, Clone, Serialize)]
pub struct ChatReportEntry {
    #[serde(flatten)]
    pub report: ChatReport,
    pub reporter: Option<ReportParty>,
    pub reported_user: Option<ReportParty>,
}
