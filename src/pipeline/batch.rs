//! Batch driver: the per-file loop, regeneration, and deletion.

use uuid::Uuid;

use super::progress::BatchProgress;
use super::types::{is_allowed_mime, BatchOutcome, FileOutcome, FileStatus, ProcessedDocument, UploadFile};
use super::{PipelineContext, PipelineError};
use crate::db::repository as repo;
use crate::models::enums::DocumentStatus;
use crate::models::{Document, OcrResult};

/// Shown when neither a signed nor a public URL could be produced.
pub const PREVIEW_PLACEHOLDER_URL: &str = "/static/preview-placeholder.png";

/// Process a batch of uploads for one owner, strictly in order.
///
/// Files with a non-whitelisted MIME type are dropped before processing and
/// never appear in the outcome. Each surviving file runs the full chain
/// (store blob, insert row, OCR, persist result); any failure marks that
/// file's document `failed` and the loop continues. When at least one file
/// succeeds, the batch's entries replace the result cache.
pub async fn submit_batch(
    ctx: &PipelineContext,
    owner_id: Uuid,
    files: Vec<UploadFile>,
    progress: &BatchProgress,
) -> BatchOutcome {
    let mut outcome = BatchOutcome {
        success: 0,
        failed: 0,
        statuses: Vec::new(),
        entries: Vec::new(),
    };

    for file in files {
        if !is_allowed_mime(&file.mime) {
            tracing::debug!(file_name = %file.name, mime = %file.mime, "Dropping unsupported file type");
            continue;
        }
        process_file(ctx, owner_id, file, &mut outcome).await;
    }

    progress.complete();

    if outcome.success > 0 {
        ctx.cache.store(outcome.entries.clone());
    }
    tracing::info!(
        success = outcome.success,
        failed = outcome.failed,
        "Batch complete"
    );
    outcome
}

async fn process_file(
    ctx: &PipelineContext,
    owner_id: Uuid,
    file: UploadFile,
    outcome: &mut BatchOutcome,
) {
    let key = crate::storage::storage_key(&owner_id, &file.name);

    // Blob upload is best-effort: a miss costs the preview, not the document.
    if let Err(e) = ctx.store.upload(&key, &file.bytes) {
        tracing::warn!(file_name = %file.name, error = %e, "Blob upload failed, continuing");
    }

    let doc = Document::pending(owner_id, &file.name, &key, file.bytes.len() as i64, &file.mime);
    let inserted = match ctx.db.lock() {
        Ok(conn) => repo::insert_document(&conn, &doc).map_err(PipelineError::from),
        Err(_) => Err(PipelineError::LockPoisoned),
    };
    if let Err(e) = inserted {
        tracing::warn!(file_name = %file.name, error = %e, "Document insert failed");
        outcome.failed += 1;
        outcome.statuses.push(FileStatus {
            file_name: file.name,
            outcome: FileOutcome::Failed,
            error: Some(e.to_string()),
        });
        return;
    }

    let data_url = file.data_url();
    match ctx.gateway.extract(&data_url).await {
        Ok(extraction) => {
            let result = OcrResult::new(
                doc.id,
                extraction.extracted_text,
                extraction.translated_text,
                extraction.table_rows,
            );
            let persisted = match ctx.db.lock() {
                Ok(conn) => persist_completed(&conn, &doc.id, &result),
                Err(_) => Err(PipelineError::LockPoisoned),
            };
            match persisted {
                Ok(()) => {
                    outcome.success += 1;
                    outcome.statuses.push(FileStatus {
                        file_name: file.name.clone(),
                        outcome: FileOutcome::Completed,
                        error: None,
                    });
                    outcome.entries.push(ProcessedDocument {
                        document_id: doc.id,
                        file_name: file.name,
                        file_path: key.clone(),
                        extracted_text: result.extracted_text,
                        translated_text: result.translated_text,
                        table_data: result.table_data,
                        preview_url: preview_url(ctx, &key),
                    });
                }
                Err(e) => {
                    tracing::warn!(document_id = %doc.id, error = %e, "Result persist failed");
                    mark_failed(ctx, &doc.id);
                    outcome.failed += 1;
                    outcome.statuses.push(FileStatus {
                        file_name: file.name,
                        outcome: FileOutcome::Failed,
                        error: Some(e.to_string()),
                    });
                }
            }
        }
        Err(e) => {
            tracing::warn!(document_id = %doc.id, error = %e, "OCR extraction failed");
            mark_failed(ctx, &doc.id);
            outcome.failed += 1;
            outcome.statuses.push(FileStatus {
                file_name: file.name,
                outcome: FileOutcome::Failed,
                error: Some(e.to_string()),
            });
        }
    }
}

/// Insert the result row and move the document to `completed` together. If
/// the status update fails, the fresh result row is removed again so a
/// `failed` document never keeps a result row.
fn persist_completed(
    conn: &rusqlite::Connection,
    document_id: &Uuid,
    result: &OcrResult,
) -> Result<(), PipelineError> {
    repo::insert_result(conn, result)?;
    if let Err(e) = repo::update_document_status(conn, document_id, DocumentStatus::Completed) {
        if let Err(cleanup) = repo::delete_result_by_document(conn, document_id) {
            tracing::warn!(document_id = %document_id, error = %cleanup, "Result cleanup failed");
        }
        return Err(e.into());
    }
    Ok(())
}

/// Signed URL, then public URL, then the placeholder.
fn preview_url(ctx: &PipelineContext, key: &str) -> String {
    match ctx.store.signed_url(key, ctx.signed_url_ttl_secs) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!(key, error = %e, "Signed URL unavailable, trying public");
            match ctx.store.public_url(key) {
                Ok(url) => url,
                Err(_) => PREVIEW_PLACEHOLDER_URL.to_string(),
            }
        }
    }
}

fn mark_failed(ctx: &PipelineContext, document_id: &Uuid) {
    if let Ok(conn) = ctx.db.lock() {
        if let Err(e) = repo::update_document_status(&conn, document_id, DocumentStatus::Failed) {
            tracing::warn!(document_id = %document_id, error = %e, "Failed-status update failed");
        }
    }
}

/// Re-run OCR for one stored document and overwrite its result in place.
///
/// The strict parse applies here: a malformed model payload is an error and
/// the stored result is left exactly as it was. Document status is untouched.
pub async fn regenerate(
    ctx: &PipelineContext,
    document_id: &Uuid,
) -> Result<OcrResult, PipelineError> {
    let doc = {
        let conn = ctx.db.lock().map_err(|_| PipelineError::LockPoisoned)?;
        repo::get_document(&conn, document_id)?
    }
    .ok_or(PipelineError::DocumentNotFound(*document_id))?;

    let bytes = ctx.store.download(&doc.file_path)?;
    let data_url = UploadFile {
        name: doc.file_name.clone(),
        mime: doc.mime_type.clone(),
        bytes,
    }
    .data_url();

    let extraction = ctx.gateway.extract_strict(&data_url).await?;

    let conn = ctx.db.lock().map_err(|_| PipelineError::LockPoisoned)?;
    repo::update_result_content(
        &conn,
        document_id,
        &extraction.extracted_text,
        &extraction.translated_text,
        &extraction.table_rows,
    )?;
    let refreshed = repo::get_result_by_document(&conn, document_id)?
        .ok_or(PipelineError::DocumentNotFound(*document_id))?;

    tracing::info!(document_id = %document_id, "Result regenerated");
    Ok(refreshed)
}

/// Remove a document entirely: blob (best-effort), result row, document row.
pub fn delete_document(ctx: &PipelineContext, document_id: &Uuid) -> Result<(), PipelineError> {
    let conn = ctx.db.lock().map_err(|_| PipelineError::LockPoisoned)?;
    let doc = repo::get_document(&conn, document_id)?
        .ok_or(PipelineError::DocumentNotFound(*document_id))?;

    if let Err(e) = ctx.store.delete(&doc.file_path) {
        tracing::warn!(document_id = %document_id, error = %e, "Blob delete failed, continuing");
    }
    repo::delete_result_by_document(&conn, document_id)?;
    repo::delete_document(&conn, document_id)?;

    tracing::info!(document_id = %document_id, "Document deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::cache::ResultCache;
    use crate::db::open_memory_database;
    use crate::gateway::{GatewayError, MockOcrGateway, OcrExtraction};
    use crate::models::result::TableRow;
    use crate::storage::{LocalObjectStore, ObjectStore};

    fn extraction(text: &str) -> OcrExtraction {
        let mut row = TableRow::new();
        row.insert("Item".into(), serde_json::Value::String("Widget".into()));
        OcrExtraction {
            extracted_text: text.to_string(),
            translated_text: format!("{text} (ja)"),
            table_rows: vec![row],
        }
    }

    fn context(gateway: MockOcrGateway) -> (tempfile::TempDir, PipelineContext) {
        let dir = tempfile::tempdir().unwrap();
        let ctx = PipelineContext {
            db: Arc::new(Mutex::new(open_memory_database().unwrap())),
            store: Arc::new(LocalObjectStore::new(dir.path())),
            gateway: Arc::new(gateway),
            cache: Arc::new(ResultCache::new()),
            signed_url_ttl_secs: 60,
        };
        (dir, ctx)
    }

    fn upload(name: &str, mime: &str) -> UploadFile {
        UploadFile {
            name: name.to_string(),
            mime: mime.to_string(),
            bytes: b"file-bytes".to_vec(),
        }
    }

    #[tokio::test]
    async fn successful_file_completes_document() {
        let (_dir, ctx) = context(MockOcrGateway::succeeding(extraction("Invoice 42")));
        let owner = Uuid::new_v4();
        let progress = BatchProgress::new();

        let outcome = submit_batch(&ctx, owner, vec![upload("a.pdf", "application/pdf")], &progress).await;

        assert_eq!(outcome.success, 1);
        assert_eq!(outcome.failed, 0);
        assert_eq!(progress.value(), 100);

        let conn = ctx.db.lock().unwrap();
        let docs = repo::list_documents(&conn, &owner).unwrap();
        assert_eq!(docs[0].status, DocumentStatus::Completed);
        let result = repo::get_result_by_document(&conn, &docs[0].id).unwrap().unwrap();
        assert_eq!(result.extracted_text, "Invoice 42");
    }

    #[tokio::test]
    async fn failed_file_does_not_stop_batch() {
        let gateway = MockOcrGateway::sequence(vec![
            Err(GatewayError::Upstream {
                status: 500,
                body: "boom".into(),
            }),
            Ok(extraction("second file")),
        ]);
        let (_dir, ctx) = context(gateway);
        let owner = Uuid::new_v4();

        let outcome = submit_batch(
            &ctx,
            owner,
            vec![upload("bad.pdf", "application/pdf"), upload("good.png", "image/png")],
            &BatchProgress::new(),
        )
        .await;

        assert_eq!(outcome.success, 1);
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.statuses.len(), 2);
        assert_eq!(outcome.statuses[0].outcome, FileOutcome::Failed);
        assert_eq!(outcome.statuses[1].outcome, FileOutcome::Completed);

        let conn = ctx.db.lock().unwrap();
        let docs = repo::list_documents(&conn, &owner).unwrap();
        let failed = docs.iter().find(|d| d.file_name == "bad.pdf").unwrap();
        assert_eq!(failed.status, DocumentStatus::Failed);
        assert!(repo::get_result_by_document(&conn, &failed.id).unwrap().is_none());
    }

    #[test]
    fn failed_status_update_removes_result_row() {
        let conn = open_memory_database().unwrap();
        // No document row, so the completed-status update cannot succeed.
        let doc_id = Uuid::new_v4();
        let result = OcrResult::new(doc_id, "x".into(), "y".into(), vec![]);

        assert!(persist_completed(&conn, &doc_id, &result).is_err());
        assert_eq!(repo::count_results_for_document(&conn, &doc_id).unwrap(), 0);
    }

    #[tokio::test]
    async fn unsupported_mime_dropped_silently() {
        let (_dir, ctx) = context(MockOcrGateway::succeeding(extraction("x")));
        let owner = Uuid::new_v4();

        let outcome = submit_batch(
            &ctx,
            owner,
            vec![upload("a.gif", "image/gif"), upload("b.pdf", "application/pdf")],
            &BatchProgress::new(),
        )
        .await;

        // The gif never reaches the gateway and leaves no trace.
        assert_eq!(outcome.statuses.len(), 1);
        assert_eq!(outcome.success, 1);
        let conn = ctx.db.lock().unwrap();
        assert_eq!(repo::list_documents(&conn, &owner).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn successful_batch_replaces_cache() {
        let (_dir, ctx) = context(MockOcrGateway::succeeding(extraction("x")));
        ctx.cache.store(vec![]);

        submit_batch(
            &ctx,
            Uuid::new_v4(),
            vec![upload("a.pdf", "application/pdf")],
            &BatchProgress::new(),
        )
        .await;

        let cached = ctx.cache.load().unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].file_name, "a.pdf");
        assert!(cached[0].preview_url.starts_with("/files/"));
    }

    #[tokio::test]
    async fn all_failed_batch_leaves_cache_alone() {
        let (_dir, ctx) = context(MockOcrGateway::failing(GatewayError::Timeout(300)));
        ctx.cache.store(vec![]);

        let outcome = submit_batch(
            &ctx,
            Uuid::new_v4(),
            vec![upload("a.pdf", "application/pdf")],
            &BatchProgress::new(),
        )
        .await;

        assert_eq!(outcome.failed, 1);
        assert!(outcome.statuses[0]
            .error
            .as_deref()
            .unwrap()
            .contains("timed out"));
        assert_eq!(ctx.cache.load().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn regenerate_overwrites_in_place() {
        let (_dir, ctx) = context(MockOcrGateway::sequence(vec![
            Ok(extraction("v1")),
            Ok(extraction("v2")),
        ]));
        let owner = Uuid::new_v4();
        submit_batch(&ctx, owner, vec![upload("a.pdf", "application/pdf")], &BatchProgress::new()).await;

        let doc_id = {
            let conn = ctx.db.lock().unwrap();
            repo::list_documents(&conn, &owner).unwrap()[0].id
        };

        let refreshed = regenerate(&ctx, &doc_id).await.unwrap();
        assert_eq!(refreshed.extracted_text, "v2");

        let conn = ctx.db.lock().unwrap();
        assert_eq!(repo::count_results_for_document(&conn, &doc_id).unwrap(), 1);
    }

    #[tokio::test]
    async fn regenerate_failure_leaves_stored_result_untouched() {
        let (_dir, ctx) = context(MockOcrGateway::sequence(vec![
            Ok(extraction("original")),
            Err(GatewayError::InvalidResponse("not json".into())),
        ]));
        let owner = Uuid::new_v4();
        submit_batch(&ctx, owner, vec![upload("a.pdf", "application/pdf")], &BatchProgress::new()).await;

        let doc_id = {
            let conn = ctx.db.lock().unwrap();
            repo::list_documents(&conn, &owner).unwrap()[0].id
        };

        assert!(matches!(
            regenerate(&ctx, &doc_id).await,
            Err(PipelineError::Gateway(GatewayError::InvalidResponse(_)))
        ));

        let conn = ctx.db.lock().unwrap();
        let result = repo::get_result_by_document(&conn, &doc_id).unwrap().unwrap();
        assert_eq!(result.extracted_text, "original");
    }

    #[tokio::test]
    async fn regenerate_unknown_document_is_not_found() {
        let (_dir, ctx) = context(MockOcrGateway::succeeding(extraction("x")));
        assert!(matches!(
            regenerate(&ctx, &Uuid::new_v4()).await,
            Err(PipelineError::DocumentNotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_removes_blob_result_and_row() {
        let (_dir, ctx) = context(MockOcrGateway::succeeding(extraction("x")));
        let owner = Uuid::new_v4();
        submit_batch(&ctx, owner, vec![upload("a.pdf", "application/pdf")], &BatchProgress::new()).await;

        let doc = {
            let conn = ctx.db.lock().unwrap();
            repo::list_documents(&conn, &owner).unwrap().remove(0)
        };

        delete_document(&ctx, &doc.id).unwrap();

        let conn = ctx.db.lock().unwrap();
        assert!(repo::get_document(&conn, &doc.id).unwrap().is_none());
        assert!(repo::get_result_by_document(&conn, &doc.id).unwrap().is_none());
        drop(conn);
        assert!(ctx.store.download(&doc.file_path).is_err());
    }

    #[tokio::test]
    async fn delete_survives_missing_blob() {
        let (_dir, ctx) = context(MockOcrGateway::succeeding(extraction("x")));
        let owner = Uuid::new_v4();
        submit_batch(&ctx, owner, vec![upload("a.pdf", "application/pdf")], &BatchProgress::new()).await;

        let doc = {
            let conn = ctx.db.lock().unwrap();
            repo::list_documents(&conn, &owner).unwrap().remove(0)
        };
        ctx.store.delete(&doc.file_path).unwrap();

        delete_document(&ctx, &doc.id).unwrap();
        let conn = ctx.db.lock().unwrap();
        assert!(repo::get_document(&conn, &doc.id).unwrap().is_none());
    }
}
