use agora_types::api::{CommentRequest, DeleteCommentRequest};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;

use crate::convert;
use crate::error::{ApiError, is_constraint_violation};
use crate::extract::JsonBody;
use crate::state::{AppState, run_db};

pub async fn add_comment(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let text = req.comment.trim().to_string();
    if text.is_empty() {
        return Err(ApiError::BadRequest("comment cannot be empty".into()));
    }

    let (author_id, post_id) = (req.author_id, req.post_id);
    let row = run_db(&state, move |s| {
        s.db.add_comment(author_id, post_id, &text)
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    ApiError::NotFound("User not found".into())
                } else {
                    ApiError::Internal(e)
                }
            })?
            .ok_or_else(|| ApiError::NotFound("Post not found".into()))
    })
    .await?;

    info!("User {} commented on post {}", author_id, post_id);
    Ok(Json(convert::comment(row)))
}

/// DELETE /comments with a JSON body. Only the comment's author may delete it.
pub async fn delete_comment(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<DeleteCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = run_db(&state, move |s| {
        Ok(s.db.delete_comment(req.comment_id, req.user_id)?)
    })
    .await?;
    if !deleted {
        return Err(ApiError::NotFound("Comment not found".into()));
    }
    Ok(StatusCode::OK)
}
