use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::DocumentStatus;

/// One uploaded file. Inserted with status `pending` before the OCR call and
/// moved to `completed` or `failed` exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
    pub status: DocumentStatus,
    pub created_at: NaiveDateTime,
}

impl Document {
    /// New pending document for an upload that has been assigned a storage key.
    pub fn pending(
        user_id: Uuid,
        file_name: &str,
        file_path: &str,
        file_size: i64,
        mime_type: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            file_name: file_name.to_string(),
            file_path: file_path.to_string(),
            file_size,
            mime_type: mime_type.to_string(),
            status: DocumentStatus::Pending,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}
