//! Result export: Excel workbook, flattened text, PDF.
//!
//! Exports operate on the processed entries of a batch, after the
//! header-bleed filter has been applied. Every successful export appends an
//! export-history row; that append is fire-and-forget.

pub mod excel;
pub mod pdf;
pub mod sheet;
pub mod text;

pub use sheet::TableSheet;

use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::db::repository::insert_export_event;
use crate::models::enums::ExportFormat;
use crate::pipeline::types::ProcessedDocument;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Nothing to export")]
    Empty,

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("PDF error: {0}")]
    Pdf(String),
}

/// A finished export ready to hand to the client.
pub struct ExportArtifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

pub fn export(
    format: ExportFormat,
    entries: &[ProcessedDocument],
) -> Result<ExportArtifact, ExportError> {
    if entries.is_empty() {
        return Err(ExportError::Empty);
    }
    let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    match format {
        ExportFormat::Excel => Ok(ExportArtifact {
            file_name: format!("ocr_results_{stamp}.xlsx"),
            content_type: "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            bytes: excel::build_workbook(entries)?,
        }),
        ExportFormat::Text => Ok(ExportArtifact {
            file_name: format!("ocr_results_{stamp}.txt"),
            content_type: "text/plain; charset=utf-8",
            bytes: text::flatten(entries).into_bytes(),
        }),
        ExportFormat::Pdf => Ok(ExportArtifact {
            file_name: format!("ocr_results_{stamp}.pdf"),
            content_type: "application/pdf",
            bytes: pdf::render(entries)?,
        }),
    }
}

/// Append the export-history row. Failures are logged and swallowed; an
/// export never fails because its bookkeeping did.
pub fn log_export_event(conn: &Connection, user_id: &Uuid, format: ExportFormat, file_name: &str) {
    if let Err(e) = insert_export_event(conn, user_id, format, file_name) {
        tracing::warn!(user_id = %user_id, error = %e, "Export event insert failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::result::TableRow;

    pub(crate) fn entry(name: &str) -> ProcessedDocument {
        let mut row = TableRow::new();
        row.insert("Item".into(), serde_json::Value::String("Widget".into()));
        row.insert("Qty".into(), serde_json::Value::String("3".into()));
        ProcessedDocument {
            document_id: Uuid::new_v4(),
            file_name: name.to_string(),
            file_path: format!("u/{name}"),
            extracted_text: "Invoice No. 42\nTotal: 1200".to_string(),
            translated_text: "請求書 第42号\n合計: 1200".to_string(),
            table_data: vec![row],
            preview_url: "/public/x".to_string(),
        }
    }

    #[test]
    fn empty_export_rejected() {
        assert!(matches!(
            export(ExportFormat::Text, &[]),
            Err(ExportError::Empty)
        ));
    }

    #[test]
    fn artifact_names_carry_extension() {
        let entries = vec![entry("a.pdf")];
        assert!(export(ExportFormat::Excel, &entries)
            .unwrap()
            .file_name
            .ends_with(".xlsx"));
        assert!(export(ExportFormat::Text, &entries)
            .unwrap()
            .file_name
            .ends_with(".txt"));
        assert!(export(ExportFormat::Pdf, &entries)
            .unwrap()
            .file_name
            .ends_with(".pdf"));
    }

    #[test]
    fn event_logging_swallows_failure() {
        // A connection with no schema makes the insert fail; the call must
        // still return.
        let conn = Connection::open_in_memory().unwrap();
        log_export_event(&conn, &Uuid::new_v4(), ExportFormat::Excel, "x.xlsx");
    }
}
