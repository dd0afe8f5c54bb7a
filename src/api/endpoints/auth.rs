//! Authentication endpoints: sign-up, sign-in, sign-out, session lookup,
//! password change, and the service-key-gated account deletion.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionContext};
use crate::auth;

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

pub async fn signup(
    State(ctx): State<ApiContext>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = ctx.db.lock().map_err(|_| ApiError::Internal("db lock".into()))?;
    let session = auth::sign_up(&conn, &body.email, &body.password)?;
    Ok(Json(json!({
        "token": session.token,
        "userId": session.user_id,
    })))
}

pub async fn login(
    State(ctx): State<ApiContext>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = ctx.db.lock().map_err(|_| ApiError::Internal("db lock".into()))?;
    let session = auth::sign_in(&conn, &body.email, &body.password)
        .map_err(|_| ApiError::BadRequest("Invalid email or password".into()))?;
    Ok(Json(json!({
        "token": session.token,
        "userId": session.user_id,
    })))
}

pub async fn logout(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = ctx.db.lock().map_err(|_| ApiError::Internal("db lock".into()))?;
    auth::sign_out(&conn, &session.token)?;
    Ok(Json(json!({"success": true})))
}

pub async fn session(
    Extension(session): Extension<SessionContext>,
) -> Json<serde_json::Value> {
    Json(json!({"userId": session.user_id}))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub async fn change_password(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = ctx.db.lock().map_err(|_| ApiError::Internal("db lock".into()))?;
    auth::change_password(
        &conn,
        &session.user_id,
        &body.current_password,
        &body.new_password,
    )?;
    Ok(Json(json!({"success": true})))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAccountRequest {
    pub user_id: Uuid,
}

/// Administrative deletion. Not session-gated; callers prove themselves with
/// the service role key instead.
pub async fn delete_account(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
    Json(body): Json<DeleteAccountRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let expected = ctx
        .config
        .service_role_key
        .as_deref()
        .ok_or(ApiError::Forbidden)?;
    let supplied = headers
        .get("x-service-key")
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Forbidden)?;
    if supplied != expected {
        return Err(ApiError::Forbidden);
    }

    let conn = ctx.db.lock().map_err(|_| ApiError::Internal("db lock".into()))?;
    auth::delete_account(&conn, &body.user_id)?;
    Ok(Json(json!({"success": true})))
}
