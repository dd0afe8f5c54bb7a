use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::ExportFormat;

/// Append an export event. Callers treat this as fire-and-forget: a failure
/// here is logged and never surfaced to the user.
pub fn insert_export_event(
    conn: &Connection,
    user_id: &Uuid,
    format: ExportFormat,
    file_path: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO export_history (id, user_id, export_type, file_path) VALUES (?1, ?2, ?3, ?4)",
        params![
            Uuid::new_v4().to_string(),
            user_id.to_string(),
            format.as_str(),
            file_path
        ],
    )?;
    Ok(())
}

pub fn count_export_events(conn: &Connection, user_id: &Uuid) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM export_history WHERE user_id = ?1",
        params![user_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}
