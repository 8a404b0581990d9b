use agora_types::api::CreateReportRequest;
use agora_types::models::ReportTarget;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;

use crate::error::{ApiError, is_constraint_violation};
use crate::extract::JsonBody;
use crate::state::{AppState, run_db};

pub async fn create_report(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateReportRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let target = report_target(&req)?;
    let reporter_id = req.reporter_id;
    let description = req.description;

    let report_id = run_db(&state, move |s| {
        s.db.create_report(reporter_id, target, &description)
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    ApiError::NotFound("Reporter not found".into())
                } else {
                    ApiError::Internal(e)
                }
            })
    })
    .await?;

    info!("Report {} filed by user {} on {:?}", report_id, reporter_id, target);
    Ok(StatusCode::CREATED)
}

/// Exactly one of `post_id` and `comment_id` names what is reported.
fn report_target(req: &CreateReportRequest) -> Result<ReportTarget, ApiError> {
    match (req.post_id, req.comment_id) {
        (Some(post_id), None) => Ok(ReportTarget::Post(post_id)),
        (None, Some(comment_id)) => Ok(ReportTarget::Comment(comment_id)),
        _ => Err(ApiError::BadRequest(
            "exactly one of post_id or comment_id is required".into(),
        )),
    }
}
