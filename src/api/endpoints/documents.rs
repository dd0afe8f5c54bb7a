//! Document endpoints: batch upload, listing, results, regeneration,
//! deletion, and the cosmetic progress read.

use std::time::Duration;

use axum::extract::{Path, State};
use axum::{Extension, Json};
use base64::Engine as _;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionContext};
use crate::db::repository as repo;
use crate::models::Document;
use crate::pipeline::types::{ProcessedDocument, UploadFile};
use crate::pipeline::{self, ProgressTicker};
use crate::storage::ObjectStore;

const PROGRESS_TICK: Duration = Duration::from_millis(500);

#[derive(Deserialize)]
pub struct UploadRequest {
    pub files: Vec<UploadPayload>,
}

#[derive(Deserialize)]
pub struct UploadPayload {
    pub name: String,
    /// `data:<mime>;base64,<payload>`
    pub data: String,
}

/// Split a data URL into its MIME type and decoded bytes.
fn decode_data_url(data: &str) -> Option<(String, Vec<u8>)> {
    let rest = data.strip_prefix("data:")?;
    let (mime, payload) = rest.split_once(";base64,")?;
    let bytes = base64::engine::general_purpose::STANDARD.decode(payload).ok()?;
    Some((mime.to_string(), bytes))
}

pub async fn upload(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Json(body): Json<UploadRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if body.files.is_empty() {
        return Err(ApiError::BadRequest("No files provided".into()));
    }

    let mut files = Vec::with_capacity(body.files.len());
    for payload in &body.files {
        let (mime, bytes) = decode_data_url(&payload.data)
            .ok_or_else(|| ApiError::BadRequest(format!("Malformed file data: {}", payload.name)))?;
        files.push(UploadFile {
            name: payload.name.clone(),
            mime,
            bytes,
        });
    }

    let progress = ctx.progress.for_owner(session.user_id);
    progress.reset();
    let _ticker = ProgressTicker::spawn(progress.clone(), PROGRESS_TICK);
    let outcome =
        pipeline::submit_batch(&ctx.pipeline(), session.user_id, files, &progress).await;

    Ok(Json(json!({
        "success": outcome.success,
        "failed": outcome.failed,
        "statuses": outcome.statuses,
    })))
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let conn = ctx.db.lock().map_err(|_| ApiError::Internal("db lock".into()))?;
    Ok(Json(repo::list_documents(&conn, &session.user_id)?))
}

/// Load a document owned by the caller, or 404. Other users' documents are
/// indistinguishable from missing ones.
fn owned_document(
    ctx: &ApiContext,
    session: &SessionContext,
    id: &Uuid,
) -> Result<Document, ApiError> {
    let conn = ctx.db.lock().map_err(|_| ApiError::Internal("db lock".into()))?;
    repo::get_document(&conn, id)?
        .filter(|d| d.user_id == session.user_id)
        .ok_or_else(|| ApiError::NotFound(format!("Document {id} not found")))
}

pub async fn result(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let doc = owned_document(&ctx, &session, &id)?;
    let conn = ctx.db.lock().map_err(|_| ApiError::Internal("db lock".into()))?;
    let result = repo::get_result_by_document(&conn, &doc.id)?
        .ok_or_else(|| ApiError::NotFound(format!("No result for document {id}")))?;

    Ok(Json(json!({
        "documentId": doc.id,
        "fileName": doc.file_name,
        "status": doc.status,
        "extractedText": result.extracted_text,
        "translatedText": result.translated_text,
        "tableData": ctx.filter.retain_rows(&result.table_data),
        "updatedAt": result.updated_at,
    })))
}

pub async fn regenerate(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    owned_document(&ctx, &session, &id)?;
    let result = pipeline::regenerate(&ctx.pipeline(), &id).await?;

    Ok(Json(json!({
        "documentId": result.document_id,
        "extractedText": result.extracted_text,
        "translatedText": result.translated_text,
        "tableData": ctx.filter.retain_rows(&result.table_data),
    })))
}

pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    owned_document(&ctx, &session, &id)?;
    pipeline::delete_document(&ctx.pipeline(), &id)?;
    Ok(Json(json!({"success": true})))
}

/// Entries for the results view: the most recent batch from the cache when it
/// belongs to the caller, otherwise re-derived from the rows.
pub async fn results(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Result<Json<Vec<ProcessedDocument>>, ApiError> {
    let entries = match cached_entries_for(&ctx, &session)? {
        Some(entries) => entries,
        None => derive_entries(&ctx, &session)?,
    };

    let filtered = entries
        .into_iter()
        .map(|mut e| {
            e.table_data = ctx.filter.retain_rows(&e.table_data);
            e
        })
        .collect();
    Ok(Json(filtered))
}

/// The cache is a single process-wide slot, so it only serves the caller
/// whose batch filled it.
fn cached_entries_for(
    ctx: &ApiContext,
    session: &SessionContext,
) -> Result<Option<Vec<ProcessedDocument>>, ApiError> {
    let Some(entries) = ctx.cache.load() else {
        return Ok(None);
    };
    let conn = ctx.db.lock().map_err(|_| ApiError::Internal("db lock".into()))?;
    for entry in &entries {
        match repo::get_document(&conn, &entry.document_id)? {
            Some(doc) if doc.user_id == session.user_id => {}
            _ => return Ok(None),
        }
    }
    Ok(Some(entries))
}

fn derive_entries(
    ctx: &ApiContext,
    session: &SessionContext,
) -> Result<Vec<ProcessedDocument>, ApiError> {
    let conn = ctx.db.lock().map_err(|_| ApiError::Internal("db lock".into()))?;
    let mut entries = Vec::new();
    for doc in repo::list_documents(&conn, &session.user_id)? {
        if let Some(result) = repo::get_result_by_document(&conn, &doc.id)? {
            let preview_url = ctx
                .store
                .signed_url(&doc.file_path, ctx.config.signed_url_ttl_secs)
                .or_else(|_| ctx.store.public_url(&doc.file_path))
                .unwrap_or_else(|_| pipeline::batch::PREVIEW_PLACEHOLDER_URL.to_string());
            entries.push(ProcessedDocument {
                document_id: doc.id,
                file_name: doc.file_name,
                file_path: doc.file_path,
                extracted_text: result.extracted_text,
                translated_text: result.translated_text,
                table_data: result.table_data,
                preview_url,
            });
        }
    }
    Ok(entries)
}

pub async fn progress(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionContext>,
) -> Json<serde_json::Value> {
    Json(json!({"percent": ctx.progress.for_owner(session.user_id).value()}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_decodes_mime_and_bytes() {
        let (mime, bytes) = decode_data_url("data:image/png;base64,iVBORw==").unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, vec![0x89, 0x50, 0x4e, 0x47]);
    }

    #[test]
    fn malformed_data_url_rejected() {
        assert!(decode_data_url("not a data url").is_none());
        assert!(decode_data_url("data:image/png;base64,!!!").is_none());
        assert!(decode_data_url("data:image/png,raw-payload").is_none());
    }
}
