use agora_auth::{TokenError, hash_password, verify_password};
use agora_types::api::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, ValidateTokenRequest,
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::SecondsFormat;
use tracing::{info, warn};

use crate::convert;
use crate::error::{ApiError, is_constraint_violation};
use crate::extract::JsonBody;
use crate::state::{AppState, AppStateInner, run_db};

pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = req.email.trim().to_string();
    let user_name = req.user_name.trim().to_string();
    let user_tag = req.user_tag.trim().to_string();

    if email.is_empty() || req.password.is_empty() || user_name.is_empty() {
        return Err(ApiError::BadRequest(
            "email, password and user_name are required".into(),
        ));
    }
    if user_tag.is_empty() {
        return Err(ApiError::BadRequest("user_tag is required".into()));
    }

    let response = run_db(&state, move |s| {
        if s.db.is_user_tag_taken(&user_tag)? {
            return Err(ApiError::Conflict("user_tag already taken".into()));
        }
        if s.db.is_email_taken(&email)? {
            return Err(ApiError::Conflict("email already registered".into()));
        }

        let password_hash = hash_password(&req.password)?;
        let user_id = s
            .db
            .create_full_user(&email, &password_hash, &user_name, &user_tag)
            .map_err(|e| {
                // lost a race with a concurrent registration
                if is_constraint_violation(&e) {
                    ApiError::Conflict("user_tag or email already taken".into())
                } else {
                    ApiError::Internal(e)
                }
            })?;

        let token = issue_session(s, user_id)?;
        let profile = s
            .db
            .get_user_profile(user_id)?
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("profile {} missing after insert", user_id)))?;

        info!("Registered user {} (@{})", user_id, profile.user_tag);
        Ok(RegisterResponse {
            user_info: convert::user_profile(profile),
            token,
        })
    })
    .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = run_db(&state, move |s| {
        let invalid = || ApiError::Unauthorized("Invalid credentials".into());

        let credentials = s
            .db
            .get_credentials_by_email(req.email.trim())?
            .ok_or_else(invalid)?;
        if !verify_password(&req.password, &credentials.password)? {
            warn!("Failed login for user {}", credentials.user_id);
            return Err(invalid());
        }

        let token = issue_session(s, credentials.user_id)?;
        let profile = s
            .db
            .get_user_profile(credentials.user_id)?
            .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

        Ok(LoginResponse {
            token,
            user: convert::user_profile(profile),
        })
    })
    .await?;

    Ok(Json(response))
}

pub async fn validate_token(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<ValidateTokenRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let token = req.token.trim().to_string();
    if token.is_empty() {
        return Err(ApiError::BadRequest("token is required".into()));
    }

    let user_id = state.tokens.validate(&token).map_err(|e| {
        warn!("Token rejected: {}", e);
        match e {
            TokenError::Expired => ApiError::Unauthorized("Token expired".into()),
            TokenError::InvalidSignature | TokenError::Malformed => {
                ApiError::Unauthorized("Invalid token".into())
            }
        }
    })?;

    let response = run_db(&state, move |s| {
        let profile = s
            .db
            .get_user_profile(user_id)?
            .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
        Ok(LoginResponse {
            token,
            user: convert::user_profile(profile),
        })
    })
    .await?;

    Ok(Json(response))
}

/// Issue a token for `user_id` and record it in `user_tokens`.
fn issue_session(s: &AppStateInner, user_id: i64) -> Result<String, ApiError> {
    let issued = s.tokens.issue(user_id)?;
    let expires_at = issued.expires_at.to_rfc3339_opts(SecondsFormat::Millis, true);
    s.db.save_user_token(user_id, &issued.token, &expires_at)?;
    Ok(issued.token)
}
