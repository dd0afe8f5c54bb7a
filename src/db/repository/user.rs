use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;

/// Identity record. The password hash is managed by the auth layer; this
/// repository only moves rows.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
}

pub fn insert_user(conn: &Connection, user: &UserRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO users (id, email, password_hash) VALUES (?1, ?2, ?3)",
        params![user.id.to_string(), user.email, user.password_hash],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DatabaseError::ConstraintViolation(format!("email already registered: {}", user.email))
        }
        other => other.into(),
    })?;
    Ok(())
}

pub fn get_user_by_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<UserRecord>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id, email, password_hash FROM users WHERE email = ?1")?;
    let result = stmt.query_row(params![email], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    });
    match result {
        Ok((id, email, password_hash)) => Ok(Some(UserRecord {
            id: Uuid::parse_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            email,
            password_hash,
        })),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_user_by_id(conn: &Connection, id: &Uuid) -> Result<Option<UserRecord>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id, email, password_hash FROM users WHERE id = ?1")?;
    let result = stmt.query_row(params![id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    });
    match result {
        Ok((id, email, password_hash)) => Ok(Some(UserRecord {
            id: Uuid::parse_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            email,
            password_hash,
        })),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn update_password_hash(
    conn: &Connection,
    user_id: &Uuid,
    password_hash: &str,
) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE users SET password_hash = ?2 WHERE id = ?1",
        params![user_id.to_string(), password_hash],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "User".into(),
            id: user_id.to_string(),
        });
    }
    Ok(())
}

/// Delete the identity record. Sessions cascade; the profile row is deleted
/// separately (and first) by the account deletion flow.
pub fn delete_user(conn: &Connection, user_id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM users WHERE id = ?1",
        params![user_id.to_string()],
    )?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "User".into(),
            id: user_id.to_string(),
        });
    }
    Ok(())
}

// ──────────────────────────────────────────────
// Sessions
// ──────────────────────────────────────────────

pub fn insert_session(
    conn: &Connection,
    token: &str,
    user_id: &Uuid,
    expires_at: NaiveDateTime,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO sessions (token, user_id, expires_at) VALUES (?1, ?2, ?3)",
        params![
            token,
            user_id.to_string(),
            expires_at.format("%Y-%m-%d %H:%M:%S").to_string()
        ],
    )?;
    Ok(())
}

/// Resolve a session token to its user id, ignoring expired sessions.
pub fn get_session_user(conn: &Connection, token: &str) -> Result<Option<Uuid>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT user_id FROM sessions WHERE token = ?1 AND expires_at > datetime('now')",
    )?;
    let result = stmt.query_row(params![token], |row| row.get::<_, String>(0));
    match result {
        Ok(user_id) => Ok(Some(Uuid::parse_str(&user_id).map_err(|e| {
            DatabaseError::ConstraintViolation(e.to_string())
        })?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn delete_session(conn: &Connection, token: &str) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
    Ok(())
}
