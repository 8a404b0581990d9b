use agora_db::queries::now_timestamp;
use agora_types::api::{CreatedPost, PostIdQuery, TagBrief};
use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::convert;
use crate::error::ApiError;
use crate::extract::QueryParams;
use crate::form::FormData;
use crate::state::{AppState, AppStateInner, run_db};

/// POST /posts (multipart): `userId`, `title`, `description`, repeated
/// `tags`, optional `file` image.
pub async fn create_post(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = FormData::read(multipart).await?;

    let author_id = form.required_i64("userId")?;
    let title = form.value("title").unwrap_or_default().trim().to_string();
    if title.is_empty() {
        return Err(ApiError::BadRequest("title is required".into()));
    }
    let description = form.value("description").unwrap_or_default().to_string();
    let tags = distinct_tags(form.values("tags"));

    let exists = run_db(&state, move |s| Ok(s.db.user_exists(author_id)?)).await?;
    if !exists {
        return Err(ApiError::NotFound("User not found".into()));
    }

    let image_url = match form.file("file") {
        Some(image) => {
            let prefix = format!("post_{}", Uuid::new_v4());
            Some(
                state
                    .media
                    .save("posts", &prefix, &image.file_name, &image.bytes)
                    .await?,
            )
        }
        None => None,
    };

    let stored_image = image_url.clone();
    let created = run_db(&state, move |s| {
        let created_at = now_timestamp();
        let post_id = s.db.create_post(
            author_id,
            &title,
            &description,
            image_url.as_deref(),
            &created_at,
        )?;

        let linked = match link_tags(s, post_id, &tags) {
            Ok(linked) => linked,
            Err(e) => {
                // no half-tagged post left behind
                if let Err(rollback) = s.db.delete_post(post_id) {
                    warn!("Failed to remove post {} after tagging error: {}", post_id, rollback);
                }
                return Err(e);
            }
        };

        Ok(CreatedPost {
            created_at: convert::parse_timestamp(&created_at, &format!("post {}", post_id)),
            post_id,
            author_id,
            title,
            description,
            image_url,
            tags: linked,
        })
    })
    .await;

    let created = match created {
        Ok(created) => created,
        Err(e) => {
            if let Some(url) = stored_image {
                // uuid-prefixed, so no other row references it
                if let Err(rm) = state.media.remove(&url).await {
                    warn!("Failed to discard orphaned upload {}: {}", url, rm);
                }
            }
            return Err(e);
        }
    };

    info!(
        "User {} created post {} with {} tags",
        created.author_id,
        created.post_id,
        created.tags.len()
    );
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn delete_post(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<PostIdQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let post_id = query.post_id;
    let deleted = run_db(&state, move |s| Ok(s.db.delete_post(post_id)?)).await?;
    if !deleted {
        return Err(ApiError::NotFound("Post not found".into()));
    }

    info!("Deleted post {}", post_id);
    Ok(StatusCode::OK)
}

fn link_tags(s: &AppStateInner, post_id: i64, tags: &[String]) -> Result<Vec<TagBrief>, ApiError> {
    let mut linked = Vec::with_capacity(tags.len());
    for name in tags {
        let tag = s.db.get_or_create_tag(name)?;
        s.db.add_post_tag(post_id, tag.tag_id)?;
        linked.push(TagBrief {
            tag_id: tag.tag_id,
            name: tag.name,
        });
    }
    Ok(linked)
}

/// Trimmed, non-empty tag names in first-seen order.
fn distinct_tags<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for name in raw.map(str::trim).filter(|n| !n.is_empty()) {
        if !tags.iter().any(|t| t == name) {
            tags.push(name.to_string());
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_trimmed_and_deduplicated() {
        let tags = distinct_tags(["rust", " sqlite ", "", "rust", "axum"].into_iter());
        assert_eq!(tags, vec!["rust", "sqlite", "axum"]);
    }
}
