use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::user::PublicProfile;

/// Lifecycle status shared by posts, comments and resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    Published,
    Flagged,
    Rejected,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Published => "published",
            ContentStatus::Flagged => "flagged",
            ContentStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "published" => Ok(ContentStatus::Published),
            "flagged" => Ok(ContentStatus::Flagged),
            "rejected" => Ok(ContentStatus::Rejected),
            other => Err(format!("unknown content status: {}", other)),
        }
    }
}

/// Which table a moderated content item lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Post,
    Comment,
}

impl ContentKind {
    pub fn table(&self) -> &'static str {
        match self {
            ContentKind::Post => "posts",
            ContentKind::Comment => "comments",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Post => "post",
            ContentKind::Comment => "comment",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post" => Ok(ContentKind::Post),
            "comment" => Ok(ContentKind::Comment),
            other => Err(format!("unknown target type: {}", other)),
        }
    }
}

/// A post or comment as stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentItem {
    pub id: Uuid,
    pub kind: ContentKind,
    pub user_id: Uuid,
    /// Parent post, set for comments only.
    pub post_id: Option<Uuid>,
    pub content: String,
    pub status: ContentStatus,
    pub flagged_reason: Option<String>,
    pub toxicity_scores: Option<serde_json::Value>,
    pub tags: Vec<String>,
    pub comments_count: i64,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload produced after the moderation pipeline has run.
#[derive(Debug, Clone)]
pub struct NewContent {
    pub kind: ContentKind,
    pub user_id: Uuid,
    pub post_id: Option<Uuid>,
    pub content: String,
    pub tags: Vec<String>,
    pub status: ContentStatus,
    pub flagged_reason: Option<String>,
    pub toxicity_scores: Option<serde_json::Value>,
}

/// Queue entry for a flagged post or comment, joined with its author.
#[derive(Debug, Clone, Serialize)]
pub struct FlaggedContent {
    pub id: Uuid,
    pub post_id: Option<Uuid>,
    pub content: String,
    pub status: ContentStatus,
    pub flagged_reason: Option<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub user: Option<PublicProfile>,
}

/// Resource shared by a user; same status semantics as posts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub file_url: String,
    pub file_name: Option<String>,
    pub status: ContentStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_text() {
        for status in [
            ContentStatus::Published,
            ContentStatus::Flagged,
            ContentStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<ContentStatus>(), Ok(status));
        }
        assert!("approved".parse::<ContentStatus>().is_err());
    }

    #[test]
    fn test_kind_parsing_rejects_unknown_targets() {
        assert_eq!("post".parse::<ContentKind>(), Ok(ContentKind::Post));
        assert_eq!("comment".parse::<ContentKind>(), Ok(ContentKind::Comment));
        assert!("resource".parse::<ContentKind>().is_err());
    }
}
