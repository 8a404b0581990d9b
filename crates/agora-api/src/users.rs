use agora_db::models::ProfileUpdate;
use agora_types::api::UserQuery;
use axum::{
    Json,
    extract::{Multipart, State},
    response::IntoResponse,
};
use tracing::info;

use crate::convert;
use crate::error::{ApiError, is_constraint_violation};
use crate::extract::QueryParams;
use crate::form::FormData;
use crate::state::{AppState, run_db};

/// Multipart part that carries a new avatar image.
const AVATAR_FIELD: &str = "avatar_url";

pub async fn get_user(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<UserQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = query.user_id;
    let profile = run_db(&state, move |s| {
        s.db.get_user_profile(user_id)?
            .ok_or_else(|| ApiError::NotFound("User not found".into()))
    })
    .await?;

    Ok(Json(convert::user_profile(profile)))
}

/// PATCH /users (multipart). Only the fields present in the form change.
pub async fn update_user(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = FormData::read(multipart).await?;
    let user_id = form.required_i64("user_id")?;
    let mut update = profile_update(&form)?;

    if let Some(avatar) = form.file(AVATAR_FIELD) {
        let url = state
            .media
            .save(
                "avatars",
                &format!("user_{}", user_id),
                &avatar.file_name,
                &avatar.bytes,
            )
            .await?;
        update.avatar_url = Some(url);
    }

    let profile = run_db(&state, move |s| {
        let updated = s.db.update_user_profile(user_id, &update).map_err(|e| {
            if is_constraint_violation(&e) {
                ApiError::Conflict("user_tag already taken".into())
            } else {
                ApiError::Internal(e)
            }
        })?;
        if !updated {
            return Err(ApiError::NotFound("User not found".into()));
        }
        s.db.get_user_profile(user_id)?
            .ok_or_else(|| ApiError::NotFound("User not found".into()))
    })
    .await?;

    info!("Updated profile of user {}", user_id);
    Ok(Json(convert::user_profile(profile)))
}

/// Map text fields onto a [`ProfileUpdate`]. Any field name outside the
/// editable set is rejected.
fn profile_update(form: &FormData) -> Result<ProfileUpdate, ApiError> {
    let mut update = ProfileUpdate::default();

    for (name, value) in &form.fields {
        let slot = match name.as_str() {
            "user_id" => continue,
            "user_name" => &mut update.user_name,
            "user_tag" => &mut update.user_tag,
            "theme" => &mut update.theme,
            "language" => &mut update.language,
            "description" => &mut update.description,
            other => {
                return Err(ApiError::BadRequest(format!(
                    "Field '{}' cannot be updated",
                    other
                )));
            }
        };
        *slot = Some(value.trim().to_string());
    }

    if let Some((name, _)) = form.files.iter().find(|(name, _)| name != AVATAR_FIELD) {
        return Err(ApiError::BadRequest(format!(
            "Unexpected file field '{}'",
            name
        )));
    }

    if update.user_tag.as_deref() == Some("") || update.user_name.as_deref() == Some("") {
        return Err(ApiError::BadRequest(
            "user_name and user_tag cannot be empty".into(),
        ));
    }

    Ok(update)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(fields: &[(&str, &str)]) -> FormData {
        FormData {
            fields: fields
                .iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
            files: Vec::new(),
        }
    }

    #[test]
    fn maps_known_fields() {
        let update = profile_update(&form(&[
            ("user_id", "3"),
            ("theme", "dark"),
            ("description", " hi "),
        ]))
        .unwrap();
        assert_eq!(update.theme.as_deref(), Some("dark"));
        assert_eq!(update.description.as_deref(), Some("hi"));
        assert!(update.user_tag.is_none());
    }

    #[test]
    fn rejects_unknown_and_blank_fields() {
        assert!(profile_update(&form(&[("password", "x")])).is_err());
        assert!(profile_update(&form(&[("user_tag", "  ")])).is_err());
    }
}
