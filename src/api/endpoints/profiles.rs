//! Profile endpoints: read and update display names, theme, and language.
//! Preference updates are last-write-wins; the newest value simply lands.

use axum::extract::State;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionContext};
use crate::db::repository as repo;
use crate::models::enums::{LanguagePreference, ThemePreference};
use crate::models::Profile;

pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<Profile>, ApiError> {
    let conn = ctx.db.lock().map_err(|_| ApiError::Internal("db lock".into()))?;
    let profile = repo::get_profile(&conn, &session.user_id)?
        .ok_or_else(|| ApiError::NotFound("Profile not found".into()))?;
    Ok(Json(profile))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub theme: Option<ThemePreference>,
    pub language: Option<LanguagePreference>,
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<ProfileUpdateRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = ctx.db.lock().map_err(|_| ApiError::Internal("db lock".into()))?;

    if body.first_name.is_some() || body.last_name.is_some() {
        let current = repo::get_profile(&conn, &session.user_id)?
            .ok_or_else(|| ApiError::NotFound("Profile not found".into()))?;
        let first = body.first_name.as_deref().unwrap_or(&current.first_name);
        let last = body.last_name.as_deref().unwrap_or(&current.last_name);
        repo::update_profile_names(&conn, &session.user_id, first, last)?;
    }
    if let Some(theme) = body.theme {
        repo::update_theme(&conn, &session.user_id, theme)?;
    }
    if let Some(language) = body.language {
        repo::update_language(&conn, &session.user_id, language)?;
    }

    Ok(Json(json!({"success": true})))
}
