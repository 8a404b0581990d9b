use agora_types::api::UserQuery;
use axum::{Json, extract::State, response::IntoResponse};
use tracing::debug;

use crate::convert;
use crate::error::ApiError;
use crate::extract::QueryParams;
use crate::state::{AppState, run_db};

/// GET /notifications?userId= returns the unread notifications, newest
/// first, and marks those read.
pub async fn get_notifications(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<UserQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = query.user_id;
    let rows = run_db(&state, move |s| Ok(s.db.take_unread_notifications(user_id)?)).await?;

    debug!("Delivered {} notifications to user {}", rows.len(), user_id);
    let notifications: Vec<_> = rows.into_iter().map(convert::notification).collect();
    Ok(Json(notifications))
}
