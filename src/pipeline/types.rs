//! Batch pipeline value types.

use base64::Engine as _;
use serde::Serialize;
use uuid::Uuid;

use crate::models::result::TableRow;

/// File types the pipeline accepts. Anything else is dropped silently before
/// processing starts.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "image/jpeg",
    "image/png",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

pub fn is_allowed_mime(mime: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime)
}

/// One file as received from the upload endpoint.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Inline data URL handed to the vision model.
    pub fn data_url(&self) -> String {
        let b64 = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{}", self.mime, b64)
    }
}

/// Terminal outcome of one file within a batch.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum FileOutcome {
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileStatus {
    pub file_name: String,
    pub outcome: FileOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// What the results view needs for one successfully processed document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedDocument {
    pub document_id: Uuid,
    pub file_name: String,
    pub file_path: String,
    pub extracted_text: String,
    pub translated_text: String,
    pub table_data: Vec<TableRow>,
    pub preview_url: String,
}

/// Aggregate result of one `submit_batch` call.
#[derive(Debug, Serialize)]
pub struct BatchOutcome {
    pub success: usize,
    pub failed: usize,
    pub statuses: Vec<FileStatus>,
    #[serde(skip)]
    pub entries: Vec<ProcessedDocument>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_whitelist_accepts_the_four_types() {
        assert!(is_allowed_mime("application/pdf"));
        assert!(is_allowed_mime("image/jpeg"));
        assert!(is_allowed_mime("image/png"));
        assert!(is_allowed_mime(
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        ));
    }

    #[test]
    fn mime_whitelist_rejects_others() {
        assert!(!is_allowed_mime("image/gif"));
        assert!(!is_allowed_mime("text/html"));
        assert!(!is_allowed_mime("application/zip"));
    }

    #[test]
    fn data_url_embeds_mime_and_base64() {
        let file = UploadFile {
            name: "a.png".into(),
            mime: "image/png".into(),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        };
        assert_eq!(file.data_url(), "data:image/png;base64,iVBORw==");
    }
}
