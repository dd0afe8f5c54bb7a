//! Bearer-token session gate.
//!
//! Extracts `Authorization: Bearer <token>`, resolves it against the
//! `sessions` table, and injects `SessionContext` into request extensions for
//! downstream handlers. Missing or stale tokens get a structured 401.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionContext};
use crate::auth::current_session;

pub async fn require_session(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_session_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_session_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?
        .to_string();

    let session = {
        let conn = ctx
            .db
            .lock()
            .map_err(|_| ApiError::Internal("db lock".into()))?;
        current_session(&conn, &token).map_err(|_| ApiError::Unauthorized)?
    };

    req.extensions_mut().insert(SessionContext {
        user_id: session.user_id,
        token: session.token,
    });

    Ok(next.run(req).await)
}
