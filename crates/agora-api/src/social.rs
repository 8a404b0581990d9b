//! Likes, favorites, follows and blocks. Adds are idempotent and answer
//! `201`; removes answer `200` whether or not a row existed.

use agora_types::api::{BlockRequest, BlockStatus, FollowRequest, FollowerQuery, UserPostRequest};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::debug;

use crate::error::{ApiError, is_constraint_violation};
use crate::extract::{JsonBody, QueryParams};
use crate::state::{AppState, run_db};

/// A write that references a missing user or post fails its foreign key.
fn missing_reference(e: anyhow::Error) -> ApiError {
    if is_constraint_violation(&e) {
        ApiError::NotFound("User or post not found".into())
    } else {
        ApiError::Internal(e)
    }
}

// -- Likes --

pub async fn add_like(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<UserPostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let UserPostRequest { user_id, post_id } = req;
    let added = run_db(&state, move |s| {
        s.db.add_like(user_id, post_id).map_err(missing_reference)
    })
    .await?;
    debug!("Like {}->{} (new: {})", user_id, post_id, added);
    Ok(StatusCode::CREATED)
}

pub async fn remove_like(
    State(state): State<AppState>,
    QueryParams(req): QueryParams<UserPostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    run_db(&state, move |s| Ok(s.db.remove_like(req.user_id, req.post_id)?)).await?;
    Ok(StatusCode::OK)
}

// -- Favorites --

pub async fn add_favorite(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<UserPostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let UserPostRequest { user_id, post_id } = req;
    let added = run_db(&state, move |s| {
        s.db.add_favorite(user_id, post_id).map_err(missing_reference)
    })
    .await?;
    debug!("Favorite {}->{} (new: {})", user_id, post_id, added);
    Ok(StatusCode::CREATED)
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    QueryParams(req): QueryParams<UserPostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    run_db(&state, move |s| {
        Ok(s.db.remove_favorite(req.user_id, req.post_id)?)
    })
    .await?;
    Ok(StatusCode::OK)
}

// -- Follows --

pub async fn add_follow(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<FollowRequest>,
) -> Result<impl IntoResponse, ApiError> {
    check_follow_ids(&req)?;
    run_db(&state, move |s| {
        s.db.add_follow(req.follower_id, req.following_id)
            .map_err(missing_reference)
    })
    .await?;
    Ok(StatusCode::CREATED)
}

pub async fn remove_follow(
    State(state): State<AppState>,
    QueryParams(req): QueryParams<FollowRequest>,
) -> Result<impl IntoResponse, ApiError> {
    check_follow_ids(&req)?;
    run_db(&state, move |s| {
        Ok(s.db.remove_follow(req.follower_id, req.following_id)?)
    })
    .await?;
    Ok(StatusCode::OK)
}

/// GET /follows?follower_id= returns the ids that user follows.
pub async fn get_followings(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<FollowerQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let follower_id = query.follower_id;
    let ids = run_db(&state, move |s| Ok(s.db.get_user_followings(follower_id)?)).await?;
    Ok(Json(ids))
}

fn check_follow_ids(req: &FollowRequest) -> Result<(), ApiError> {
    if req.follower_id == 0 || req.following_id == 0 {
        return Err(ApiError::BadRequest(
            "follower_id and following_id are required".into(),
        ));
    }
    Ok(())
}

// -- Blocks --

pub async fn add_block(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<BlockRequest>,
) -> Result<impl IntoResponse, ApiError> {
    run_db(&state, move |s| {
        s.db.add_user_block(req.blocker_id, req.blocked_id)
            .map_err(missing_reference)
    })
    .await?;
    Ok(StatusCode::CREATED)
}

pub async fn remove_block(
    State(state): State<AppState>,
    QueryParams(req): QueryParams<BlockRequest>,
) -> Result<impl IntoResponse, ApiError> {
    run_db(&state, move |s| {
        Ok(s.db.remove_block(req.blocker_id, req.blocked_id)?)
    })
    .await?;
    Ok(StatusCode::OK)
}

pub async fn check_block(
    State(state): State<AppState>,
    QueryParams(req): QueryParams<BlockRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let blocked = run_db(&state, move |s| {
        Ok(s.db.is_user_blocked(req.blocker_id, req.blocked_id)?)
    })
    .await?;
    Ok(Json(BlockStatus { blocked }))
}
