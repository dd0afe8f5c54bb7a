//! Export endpoint: render the caller's result entries in the requested
//! format and hand back the artifact bytes.

use std::str::FromStr;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Extension;

use crate::api::endpoints::documents;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionContext};
use crate::export;
use crate::models::enums::ExportFormat;

pub async fn download(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Path(format): Path<String>,
) -> Result<Response, ApiError> {
    let format = ExportFormat::from_str(&format)
        .map_err(|_| ApiError::BadRequest(format!("Unknown export format: {format}")))?;

    // Same entry set the results view renders, filter included.
    let entries = documents::results(State(ctx.clone()), Extension(session.clone()))
        .await?
        .0;
    let artifact = export::export(format, &entries)?;

    {
        let conn = ctx.db.lock().map_err(|_| ApiError::Internal("db lock".into()))?;
        export::log_export_event(&conn, &session.user_id, format, &artifact.file_name);
    }

    let response = Response::builder()
        .header(header::CONTENT_TYPE, artifact.content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", artifact.file_name),
        )
        .body(axum::body::Body::from(artifact.bytes))
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(response.into_response())
}
