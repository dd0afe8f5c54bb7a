//! Dashboard summary: aggregate counts over the caller's documents and
//! export history, derived fresh on every read.

use axum::extract::State;
use axum::{Extension, Json};
use serde_json::json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionContext};
use crate::db::repository as repo;

pub async fn summary(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = ctx.db.lock().map_err(|_| ApiError::Internal("db lock".into()))?;
    let stats = repo::document_stats(&conn, &session.user_id)?;
    let export_count = repo::count_export_events(&conn, &session.user_id)?;

    let success_rate = if stats.total > 0 {
        (stats.completed as f64 / stats.total as f64 * 100.0).round() as i64
    } else {
        0
    };

    Ok(Json(json!({
        "totalDocuments": stats.total,
        "todayDocuments": stats.today,
        "exportCount": export_count,
        "successRate": success_rate,
    })))
}
