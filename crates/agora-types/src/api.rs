use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::UserProfile;

// -- JWT Claims --

/// Signed token payload. Canonical definition lives here so the issuer and
/// any future verifier agree on the shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub iat: u64,
    pub exp: u64,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub user_name: String,
    pub user_tag: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_info: UserProfile,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned by both login and token validation.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidateTokenRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    #[serde(rename = "userId")]
    pub user_id: i64,
}

// -- Feed --

#[derive(Debug, Deserialize)]
pub struct PostsQuery {
    #[serde(rename = "startIndex")]
    pub start_index: i64,
    pub amount: i64,
    /// Author filter. `userId=` with no value means no filter.
    #[serde(rename = "userId", default, deserialize_with = "blank_as_none")]
    pub user_id: Option<i64>,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(id) => id.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Deserialize)]
pub struct FavoritesQuery {
    #[serde(rename = "startIndex")]
    pub start_index: i64,
    pub amount: i64,
    #[serde(rename = "userId")]
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub post_id: i64,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub author_id: i64,
    pub author_name: String,
    pub like_count: i64,
    pub comments: Vec<CommentBrief>,
    pub tags: Vec<TagBrief>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentBrief {
    pub comment_id: i64,
    pub post_id: i64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub author_id: i64,
    pub author_tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagBrief {
    pub tag_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedResponse {
    pub posts: Vec<PostSummary>,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
}

// -- Posts --

#[derive(Debug, Serialize)]
pub struct CreatedPost {
    pub post_id: i64,
    pub author_id: i64,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub tags: Vec<TagBrief>,
}

#[derive(Debug, Deserialize)]
pub struct PostIdQuery {
    pub post_id: i64,
}

// -- Likes / favorites --

/// Body of `POST /likes` and `POST /favorites`, and query of their DELETE.
#[derive(Debug, Deserialize)]
pub struct UserPostRequest {
    pub user_id: i64,
    pub post_id: i64,
}

// -- Comments --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommentRequest {
    pub author_id: i64,
    pub post_id: i64,
    pub comment: String,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub comment_id: i64,
    pub author_id: i64,
    pub post_id: i64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteCommentRequest {
    pub comment_id: i64,
    pub user_id: i64,
}

// -- Follows --

#[derive(Debug, Deserialize)]
pub struct FollowRequest {
    pub follower_id: i64,
    pub following_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct FollowerQuery {
    pub follower_id: i64,
}

// -- Blocks --

#[derive(Debug, Deserialize)]
pub struct BlockRequest {
    pub blocker_id: i64,
    pub blocked_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BlockStatus {
    pub blocked: bool,
}

// -- Reports --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateReportRequest {
    pub reporter_id: i64,
    #[serde(default)]
    pub description: String,
    pub post_id: Option<i64>,
    pub comment_id: Option<i64>,
}
