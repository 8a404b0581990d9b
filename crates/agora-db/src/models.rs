//! Database row types. These map directly to SQLite rows and stay distinct
//! from the agora-types API models; timestamps are the stored RFC 3339 text.

pub struct CredentialRow {
    pub user_id: i64,
    pub password: String,
}

pub struct ProfileRow {
    pub user_id: i64,
    pub user_name: String,
    pub user_tag: String,
    pub theme: String,
    pub language: String,
    pub avatar_url: Option<String>,
    pub description: Option<String>,
}

/// A row of `view_post_summary` / `view_favorite_post_summary`.
pub struct PostSummaryRow {
    pub post_id: i64,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub created_at: String,
    pub author_id: i64,
    pub author_name: String,
    pub like_count: i64,
}

/// A comment as stored, returned right after insertion.
pub struct CommentRow {
    pub comment_id: i64,
    pub author_id: i64,
    pub post_id: i64,
    pub comment: String,
    pub created_at: String,
}

/// A row of `view_comment_with_author_tag`.
pub struct CommentBriefRow {
    pub comment_id: i64,
    pub post_id: i64,
    pub comment: String,
    pub created_at: String,
    pub author_id: i64,
    pub author_tag: String,
}

pub struct TagRow {
    pub tag_id: i64,
    pub name: String,
}

pub struct NotificationRow {
    pub notification_id: i64,
    pub user_id: i64,
    pub type_id: i64,
    pub entity_id: i64,
    pub is_read: bool,
    pub created_at: String,
}

/// Partial update of `user_info`. `None` leaves the column untouched.
#[derive(Debug, Default, Clone)]
pub struct ProfileUpdate {
    pub user_name: Option<String>,
    pub user_tag: Option<String>,
    pub theme: Option<String>,
    pub language: Option<String>,
    pub avatar_url: Option<String>,
    pub description: Option<String>,
}

impl ProfileUpdate {
    /// Column/value pairs to assign. Column names are fixed here and never
    /// come from the request.
    pub fn assignments(&self) -> Vec<(&'static str, &str)> {
        [
            ("user_name", &self.user_name),
            ("user_tag", &self.user_tag),
            ("theme", &self.theme),
            ("language", &self.language),
            ("avatar_url", &self.avatar_url),
            ("description", &self.description),
        ]
        .into_iter()
        .filter_map(|(column, value)| value.as_deref().map(|v| (column, v)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments().is_empty()
    }
}
