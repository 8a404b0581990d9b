use agora_db::models::{CommentBriefRow, CommentRow, NotificationRow, PostSummaryRow, ProfileRow, TagRow};
use agora_types::api::{CommentBrief, CommentResponse, PostSummary, TagBrief};
use agora_types::models::{Notification, UserProfile};
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

/// Parse a stored timestamp. Rows written by this service are RFC 3339;
/// SQLite's own `datetime('now')` format is accepted too.
pub fn parse_timestamp(raw: &str, context: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on {}: {}", raw, context, e);
            DateTime::default()
        })
}

pub fn user_profile(row: ProfileRow) -> UserProfile {
    UserProfile {
        user_id: row.user_id,
        user_name: row.user_name,
        user_tag: row.user_tag,
        theme: row.theme,
        language: row.language,
        avatar_url: row.avatar_url,
        description: row.description,
    }
}

pub fn notification(row: NotificationRow) -> Notification {
    Notification {
        created_at: parse_timestamp(&row.created_at, &format!("notification {}", row.notification_id)),
        id: row.notification_id,
        user_id: row.user_id,
        type_id: row.type_id,
        entity_id: row.entity_id,
        is_read: row.is_read,
    }
}

pub fn comment(row: CommentRow) -> CommentResponse {
    CommentResponse {
        created_at: parse_timestamp(&row.created_at, &format!("comment {}", row.comment_id)),
        comment_id: row.comment_id,
        author_id: row.author_id,
        post_id: row.post_id,
        comment: row.comment,
    }
}

pub fn comment_brief(row: CommentBriefRow) -> CommentBrief {
    CommentBrief {
        created_at: parse_timestamp(&row.created_at, &format!("comment {}", row.comment_id)),
        comment_id: row.comment_id,
        post_id: row.post_id,
        comment: row.comment,
        author_id: row.author_id,
        author_tag: row.author_tag,
    }
}

pub fn tag_brief(row: TagRow) -> TagBrief {
    TagBrief {
        tag_id: row.tag_id,
        name: row.name,
    }
}

pub fn post_summary(row: PostSummaryRow, comments: Vec<CommentBrief>, tags: Vec<TagBrief>) -> PostSummary {
    PostSummary {
        created_at: parse_timestamp(&row.created_at, &format!("post {}", row.post_id)),
        post_id: row.post_id,
        title: row.title,
        description: row.description,
        image_url: row.image_url,
        author_id: row.author_id,
        author_name: row.author_name,
        like_count: row.like_count,
        comments,
        tags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_both_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(parse_timestamp("2026-03-04T05:06:07.000Z", "test"), expected);
        assert_eq!(parse_timestamp("2026-03-04 05:06:07", "test"), expected);
        assert_eq!(parse_timestamp("yesterday", "test"), DateTime::<Utc>::default());
    }
}
