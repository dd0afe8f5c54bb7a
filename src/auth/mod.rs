//! Session and credential management: sign up, sign in, sign out, current
//! session, password change, and the administrative account deletion flow.
//!
//! Passwords are hashed with PBKDF2-SHA256 and a per-user random salt.
//! Session tokens are random UUIDs with a fixed expiry, stored in the
//! `sessions` table.

use base64::Engine as _;
use chrono::Duration;
use pbkdf2::pbkdf2_hmac;
use rusqlite::Connection;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;
use uuid::Uuid;

use crate::db::repository::{
    delete_profile, delete_session, delete_user, get_session_user, get_user_by_email,
    get_user_by_id, insert_profile, insert_session, insert_user, update_password_hash, UserRecord,
};
use crate::db::DatabaseError;
use crate::models::Profile;

const PBKDF2_ITERATIONS: u32 = 600_000;
const HASH_LENGTH: usize = 32;
const SALT_LENGTH: usize = 16;
const MIN_PASSWORD_LENGTH: usize = 8;
/// Session lifetime. Tokens past this are treated as absent.
const SESSION_TTL_HOURS: i64 = 24 * 7;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,
    #[error("Email already registered")]
    EmailTaken,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Session expired or unknown")]
    NoSession,
    #[error("User not found")]
    UserNotFound,
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// An authenticated session, resolved from a bearer token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub token: String,
}

/// Create the identity record and its profile row in one operation, so the
/// profile-per-user invariant holds from the first moment.
pub fn sign_up(conn: &Connection, email: &str, password: &str) -> Result<Session, AuthError> {
    validate_email(email)?;
    validate_password(password)?;

    if get_user_by_email(conn, email)?.is_some() {
        return Err(AuthError::EmailTaken);
    }

    let user = UserRecord {
        id: Uuid::new_v4(),
        email: email.to_string(),
        password_hash: hash_password(password),
    };
    insert_user(conn, &user).map_err(|e| match e {
        DatabaseError::ConstraintViolation(_) => AuthError::EmailTaken,
        other => AuthError::Database(other),
    })?;
    insert_profile(conn, &Profile::for_user(user.id))?;

    tracing::info!(user_id = %user.id, "User signed up");
    issue_session(conn, &user.id)
}

pub fn sign_in(conn: &Connection, email: &str, password: &str) -> Result<Session, AuthError> {
    let user = get_user_by_email(conn, email)?.ok_or(AuthError::InvalidCredentials)?;
    if !verify_password(password, &user.password_hash) {
        return Err(AuthError::InvalidCredentials);
    }
    tracing::info!(user_id = %user.id, "User signed in");
    issue_session(conn, &user.id)
}

pub fn sign_out(conn: &Connection, token: &str) -> Result<(), AuthError> {
    delete_session(conn, token)?;
    Ok(())
}

/// Resolve a bearer token to a session, if it exists and has not expired.
pub fn current_session(conn: &Connection, token: &str) -> Result<Session, AuthError> {
    let user_id = get_session_user(conn, token)?.ok_or(AuthError::NoSession)?;
    Ok(Session {
        user_id,
        token: token.to_string(),
    })
}

/// Verify the current credential, then replace the hash. Verification has no
/// side effects, so a failed update needs no rollback.
pub fn change_password(
    conn: &Connection,
    user_id: &Uuid,
    current: &str,
    new: &str,
) -> Result<(), AuthError> {
    validate_password(new)?;
    let user = get_user_by_id(conn, user_id)?.ok_or(AuthError::UserNotFound)?;
    if !verify_password(current, &user.password_hash) {
        return Err(AuthError::InvalidCredentials);
    }
    update_password_hash(conn, user_id, &hash_password(new))?;
    tracing::info!(user_id = %user_id, "Password changed");
    Ok(())
}

/// Administrative deletion: profile row first, then the identity record
/// (sessions cascade with it). The profile references the user, so it goes first.
pub fn delete_account(conn: &Connection, user_id: &Uuid) -> Result<(), AuthError> {
    delete_profile(conn, user_id)?;
    delete_user(conn, user_id).map_err(|e| match e {
        DatabaseError::NotFound { .. } => AuthError::UserNotFound,
        other => AuthError::Database(other),
    })?;
    tracing::info!(user_id = %user_id, "Account deleted");
    Ok(())
}

fn issue_session(conn: &Connection, user_id: &Uuid) -> Result<Session, AuthError> {
    let token = Uuid::new_v4().to_string();
    let expires_at = chrono::Utc::now().naive_utc() + Duration::hours(SESSION_TTL_HOURS);
    insert_session(conn, &token, user_id, expires_at)?;
    Ok(Session {
        user_id: *user_id,
        token,
    })
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    let valid = email.contains('@') && email.len() >= 3 && !email.starts_with('@');
    if valid {
        Ok(())
    } else {
        Err(AuthError::InvalidEmail)
    }
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::PasswordTooShort);
    }
    Ok(())
}

// ──────────────────────────────────────────────
// Password hashing
// ──────────────────────────────────────────────

/// Hash format: `pbkdf2-sha256$<iterations>$<b64 salt>$<b64 hash>`.
fn hash_password(password: &str) -> String {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    let hash = derive(password, &salt, PBKDF2_ITERATIONS);

    let b64 = base64::engine::general_purpose::STANDARD_NO_PAD;
    format!(
        "pbkdf2-sha256${}${}${}",
        PBKDF2_ITERATIONS,
        b64.encode(salt),
        b64.encode(hash)
    )
}

fn verify_password(password: &str, stored: &str) -> bool {
    let b64 = base64::engine::general_purpose::STANDARD_NO_PAD;
    let mut parts = stored.split('$');
    let (Some("pbkdf2-sha256"), Some(iters), Some(salt), Some(hash)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    let Ok(iterations) = iters.parse::<u32>() else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (b64.decode(salt), b64.decode(hash)) else {
        return false;
    };

    let candidate = derive(password, &salt, iterations);
    candidate.ct_eq(&expected[..]).into()
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LENGTH] {
    let mut out = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::db::repository::get_profile;

    #[test]
    fn sign_up_creates_user_and_profile() {
        let conn = open_memory_database().unwrap();
        let session = sign_up(&conn, "hana@example.jp", "correct-horse").unwrap();

        // The profile-per-user invariant: created explicitly, not by trigger.
        assert!(get_profile(&conn, &session.user_id).unwrap().is_some());
    }

    #[test]
    fn sign_up_rejects_short_password() {
        let conn = open_memory_database().unwrap();
        let err = sign_up(&conn, "hana@example.jp", "short");
        assert!(matches!(err, Err(AuthError::PasswordTooShort)));
    }

    #[test]
    fn sign_up_rejects_bad_email() {
        let conn = open_memory_database().unwrap();
        assert!(matches!(
            sign_up(&conn, "not-an-email", "longenough"),
            Err(AuthError::InvalidEmail)
        ));
    }

    #[test]
    fn duplicate_email_rejected() {
        let conn = open_memory_database().unwrap();
        sign_up(&conn, "hana@example.jp", "longenough").unwrap();
        assert!(matches!(
            sign_up(&conn, "hana@example.jp", "otherpassword"),
            Err(AuthError::EmailTaken)
        ));
    }

    #[test]
    fn sign_in_and_resolve_session() {
        let conn = open_memory_database().unwrap();
        let created = sign_up(&conn, "hana@example.jp", "longenough").unwrap();
        let session = sign_in(&conn, "hana@example.jp", "longenough").unwrap();

        let resolved = current_session(&conn, &session.token).unwrap();
        assert_eq!(resolved.user_id, created.user_id);
    }

    #[test]
    fn wrong_password_rejected() {
        let conn = open_memory_database().unwrap();
        sign_up(&conn, "hana@example.jp", "longenough").unwrap();
        assert!(matches!(
            sign_in(&conn, "hana@example.jp", "wrongpassword"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn sign_out_invalidates_token() {
        let conn = open_memory_database().unwrap();
        let session = sign_up(&conn, "hana@example.jp", "longenough").unwrap();
        sign_out(&conn, &session.token).unwrap();
        assert!(matches!(
            current_session(&conn, &session.token),
            Err(AuthError::NoSession)
        ));
    }

    #[test]
    fn change_password_requires_current() {
        let conn = open_memory_database().unwrap();
        let session = sign_up(&conn, "hana@example.jp", "longenough").unwrap();

        assert!(matches!(
            change_password(&conn, &session.user_id, "wrong", "newpassword1"),
            Err(AuthError::InvalidCredentials)
        ));

        change_password(&conn, &session.user_id, "longenough", "newpassword1").unwrap();
        assert!(sign_in(&conn, "hana@example.jp", "newpassword1").is_ok());
        assert!(sign_in(&conn, "hana@example.jp", "longenough").is_err());
    }

    #[test]
    fn delete_account_removes_profile_then_user() {
        let conn = open_memory_database().unwrap();
        let session = sign_up(&conn, "hana@example.jp", "longenough").unwrap();

        delete_account(&conn, &session.user_id).unwrap();
        assert!(get_profile(&conn, &session.user_id).unwrap().is_none());
        assert!(matches!(
            current_session(&conn, &session.token),
            Err(AuthError::NoSession)
        ));
        assert!(matches!(
            delete_account(&conn, &session.user_id),
            Err(AuthError::UserNotFound)
        ));
    }

    #[test]
    fn hash_format_verifies_and_rejects() {
        let stored = hash_password("sample-password");
        assert!(stored.starts_with("pbkdf2-sha256$"));
        assert!(verify_password("sample-password", &stored));
        assert!(!verify_password("other-password", &stored));
        assert!(!verify_password("sample-password", "garbage"));
    }
}
