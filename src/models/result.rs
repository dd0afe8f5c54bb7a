use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One table row from the OCR output: an unordered map of the column headers
/// exactly as they appear in the document to cell values. Column sets may
/// differ row to row.
pub type TableRow = serde_json::Map<String, serde_json::Value>;

/// OCR/translation output for one document. Written as a whole after a
/// successful gateway call, or not at all; regeneration overwrites in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResult {
    pub id: Uuid,
    pub document_id: Uuid,
    pub extracted_text: String,
    pub translated_text: String,
    pub table_data: Vec<TableRow>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl OcrResult {
    pub fn new(
        document_id: Uuid,
        extracted_text: String,
        translated_text: String,
        table_data: Vec<TableRow>,
    ) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4(),
            document_id,
            extracted_text,
            translated_text,
            table_data,
            created_at: now,
            updated_at: now,
        }
    }
}
