use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::result::TableRow;
use crate::models::OcrResult;

pub fn insert_result(conn: &Connection, result: &OcrResult) -> Result<(), DatabaseError> {
    let table_json = serde_json::to_string(&result.table_data)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("table_data encode: {e}")))?;
    conn.execute(
        "INSERT INTO results (id, document_id, extracted_text, translated_text, table_data, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            result.id.to_string(),
            result.document_id.to_string(),
            result.extracted_text,
            result.translated_text,
            table_json,
            result.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            result.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_result_by_document(
    conn: &Connection,
    document_id: &Uuid,
) -> Result<Option<OcrResult>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, document_id, extracted_text, translated_text, table_data, created_at, updated_at
         FROM results WHERE document_id = ?1 LIMIT 1",
    )?;

    let result = stmt.query_row(params![document_id.to_string()], |row| {
        Ok(ResultRow {
            id: row.get(0)?,
            document_id: row.get(1)?,
            extracted_text: row.get(2)?,
            translated_text: row.get(3)?,
            table_data: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    });

    match result {
        Ok(row) => Ok(Some(result_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Overwrite the three result fields in place. Used by regeneration; the row
/// count per document never changes, only the content does.
pub fn update_result_content(
    conn: &Connection,
    document_id: &Uuid,
    extracted_text: &str,
    translated_text: &str,
    table_data: &[TableRow],
) -> Result<(), DatabaseError> {
    let table_json = serde_json::to_string(table_data)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("table_data encode: {e}")))?;
    let rows = conn.execute(
        "UPDATE results SET extracted_text = ?2, translated_text = ?3, table_data = ?4,
         updated_at = datetime('now')
         WHERE document_id = ?1",
        params![
            document_id.to_string(),
            extracted_text,
            translated_text,
            table_json
        ],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Result".into(),
            id: document_id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_result_by_document(
    conn: &Connection,
    document_id: &Uuid,
) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM results WHERE document_id = ?1",
        params![document_id.to_string()],
    )?;
    Ok(())
}

/// Number of result rows for one document. Regeneration must keep this at 1.
pub fn count_results_for_document(
    conn: &Connection,
    document_id: &Uuid,
) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM results WHERE document_id = ?1",
        params![document_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}

struct ResultRow {
    id: String,
    document_id: String,
    extracted_text: String,
    translated_text: String,
    table_data: String,
    created_at: String,
    updated_at: String,
}

fn result_from_row(row: ResultRow) -> Result<OcrResult, DatabaseError> {
    let table_data: Vec<TableRow> = serde_json::from_str(&row.table_data)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("table_data decode: {e}")))?;

    let parse_ts = |s: &str| {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
            .unwrap_or_default()
    };

    Ok(OcrResult {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        document_id: Uuid::parse_str(&row.document_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        extracted_text: row.extracted_text,
        translated_text: row.translated_text,
        table_data,
        created_at: parse_ts(&row.created_at),
        updated_at: parse_ts(&row.updated_at),
    })
}
