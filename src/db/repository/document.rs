use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::DocumentStatus;
use crate::models::Document;

pub fn insert_document(conn: &Connection, doc: &Document) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO documents (id, user_id, file_name, file_path, file_size, mime_type, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            doc.id.to_string(),
            doc.user_id.to_string(),
            doc.file_name,
            doc.file_path,
            doc.file_size,
            doc.mime_type,
            doc.status.as_str(),
            doc.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_document(conn: &Connection, id: &Uuid) -> Result<Option<Document>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, file_name, file_path, file_size, mime_type, status, created_at
         FROM documents WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], map_document_row);

    match result {
        Ok(row) => Ok(Some(document_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// All documents owned by a user, newest first.
pub fn list_documents(conn: &Connection, user_id: &Uuid) -> Result<Vec<Document>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, file_name, file_path, file_size, mime_type, status, created_at
         FROM documents WHERE user_id = ?1 ORDER BY created_at DESC",
    )?;

    let rows = stmt.query_map(params![user_id.to_string()], map_document_row)?;

    let mut docs = Vec::new();
    for row in rows {
        docs.push(document_from_row(row?)?);
    }
    Ok(docs)
}

/// Update only the status of a document. The pipeline calls this exactly once
/// per document, after the gateway call resolves.
pub fn update_document_status(
    conn: &Connection,
    document_id: &Uuid,
    status: DocumentStatus,
) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE documents SET status = ?2 WHERE id = ?1",
        params![document_id.to_string(), status.as_str()],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Document".into(),
            id: document_id.to_string(),
        });
    }
    Ok(())
}

/// Delete the document row only. The storage blob and the result row have no
/// enforced cascade; the caller issues those deletes itself.
pub fn delete_document(conn: &Connection, document_id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM documents WHERE id = ?1",
        params![document_id.to_string()],
    )?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Document".into(),
            id: document_id.to_string(),
        });
    }
    Ok(())
}

/// Aggregates for the dashboard summary, scoped to one user.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentStats {
    pub total: i64,
    pub today: i64,
    pub completed: i64,
}

/// Document counts for one user: all rows, rows created today (UTC), and
/// rows in `completed` status.
pub fn document_stats(conn: &Connection, user_id: &Uuid) -> Result<DocumentStats, DatabaseError> {
    let stats = conn.query_row(
        "SELECT COUNT(*),
                COALESCE(SUM(created_at >= date('now')), 0),
                COALESCE(SUM(status = 'completed'), 0)
         FROM documents WHERE user_id = ?1",
        params![user_id.to_string()],
        |row| {
            Ok(DocumentStats {
                total: row.get(0)?,
                today: row.get(1)?,
                completed: row.get(2)?,
            })
        },
    )?;
    Ok(stats)
}

// Internal row type for Document mapping
struct DocumentRow {
    id: String,
    user_id: String,
    file_name: String,
    file_path: String,
    file_size: i64,
    mime_type: String,
    status: String,
    created_at: String,
}

fn map_document_row(row: &rusqlite::Row<'_>) -> Result<DocumentRow, rusqlite::Error> {
    Ok(DocumentRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        file_name: row.get(2)?,
        file_path: row.get(3)?,
        file_size: row.get(4)?,
        mime_type: row.get(5)?,
        status: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn document_from_row(row: DocumentRow) -> Result<Document, DatabaseError> {
    Ok(Document {
        id: Uuid::parse_str(&row.id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        user_id: Uuid::parse_str(&row.user_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        file_name: row.file_name,
        file_path: row.file_path,
        file_size: row.file_size,
        mime_type: row.mime_type,
        status: DocumentStatus::from_str(&row.status)?,
        created_at: NaiveDateTime::parse_from_str(&row.created_at, "%Y-%m-%d %H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(&row.created_at, "%Y-%m-%dT%H:%M:%S"))
            .unwrap_or_default(),
    })
}
