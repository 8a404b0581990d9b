use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Public profile of a user, as returned by every user-facing route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: i64,
    pub user_name: String,
    pub user_tag: String,
    pub theme: String,
    pub language: String,
    pub avatar_url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "notification_id")]
    pub id: i64,
    pub user_id: i64,
    pub type_id: i64,
    pub entity_id: i64,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// What a notification's `entity_id` points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// entity = follower's user id
    NewFollower,
    /// entity = comment id
    PostComment,
    /// entity = post id
    PostLike,
}

impl NotificationKind {
    pub fn type_id(self) -> i64 {
        match self {
            Self::NewFollower => 1,
            Self::PostComment => 2,
            Self::PostLike => 3,
        }
    }
}

/// Target of a moderation report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportTarget {
    Post(i64),
    Comment(i64),
}

impl ReportTarget {
    pub fn target_id(self) -> i64 {
        match self {
            Self::Post(id) | Self::Comment(id) => id,
        }
    }

    pub fn report_type_id(self) -> i64 {
        match self {
            Self::Post(_) => 1,
            Self::Comment(_) => 2,
        }
    }
}
