use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::{LanguagePreference, ThemePreference};
use crate::models::Profile;

pub fn insert_profile(conn: &Connection, profile: &Profile) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO profiles (id, first_name, last_name, avatar_path, theme, language, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            profile.id.to_string(),
            profile.first_name,
            profile.last_name,
            profile.avatar_path,
            profile.theme.as_str(),
            profile.language.as_str(),
            profile.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            profile.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_profile(conn: &Connection, user_id: &Uuid) -> Result<Option<Profile>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, first_name, last_name, avatar_path, theme, language, created_at, updated_at
         FROM profiles WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![user_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, Option<String>>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, String>(6)?,
            row.get::<_, String>(7)?,
        ))
    });

    let (id, first_name, last_name, avatar_path, theme, language, created_at, updated_at) =
        match result {
            Ok(r) => r,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

    let parse_ts = |s: &str| {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
            .unwrap_or_default()
    };

    Ok(Some(Profile {
        id: Uuid::parse_str(&id).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        first_name,
        last_name,
        avatar_path,
        theme: ThemePreference::from_str(&theme)?,
        language: LanguagePreference::from_str(&language)?,
        created_at: parse_ts(&created_at),
        updated_at: parse_ts(&updated_at),
    }))
}

/// Last-write-wins theme update. Every toggle in the app funnels through here.
pub fn update_theme(
    conn: &Connection,
    user_id: &Uuid,
    theme: ThemePreference,
) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE profiles SET theme = ?2, updated_at = datetime('now') WHERE id = ?1",
        params![user_id.to_string(), theme.as_str()],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Profile".into(),
            id: user_id.to_string(),
        });
    }
    Ok(())
}

/// Last-write-wins language update.
pub fn update_language(
    conn: &Connection,
    user_id: &Uuid,
    language: LanguagePreference,
) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE profiles SET language = ?2, updated_at = datetime('now') WHERE id = ?1",
        params![user_id.to_string(), language.as_str()],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Profile".into(),
            id: user_id.to_string(),
        });
    }
    Ok(())
}

pub fn update_profile_names(
    conn: &Connection,
    user_id: &Uuid,
    first_name: &str,
    last_name: &str,
) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE profiles SET first_name = ?2, last_name = ?3, updated_at = datetime('now')
         WHERE id = ?1",
        params![user_id.to_string(), first_name, last_name],
    )?;
    if rows == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Profile".into(),
            id: user_id.to_string(),
        });
    }
    Ok(())
}

/// Delete the profile row. Account deletion removes this first, then the
/// identity record.
pub fn delete_profile(conn: &Connection, user_id: &Uuid) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM profiles WHERE id = ?1",
        params![user_id.to_string()],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::db::repository::{insert_user, UserRecord};

    // Profiles reference users, so each test seeds the identity row first.
    fn seeded_user(conn: &Connection) -> Uuid {
        let user = UserRecord {
            id: Uuid::new_v4(),
            email: format!("{}@example.jp", Uuid::new_v4()),
            password_hash: "$pbkdf2$stub".into(),
        };
        insert_user(conn, &user).unwrap();
        user.id
    }

    #[test]
    fn insert_and_get_defaults() {
        let conn = open_memory_database().unwrap();
        let user_id = seeded_user(&conn);
        insert_profile(&conn, &Profile::for_user(user_id)).unwrap();

        let profile = get_profile(&conn, &user_id).unwrap().unwrap();
        assert_eq!(profile.theme, ThemePreference::System);
        assert_eq!(profile.language, LanguagePreference::English);
    }

    #[test]
    fn preference_updates_converge_to_last_write() {
        let conn = open_memory_database().unwrap();
        let user_id = seeded_user(&conn);
        insert_profile(&conn, &Profile::for_user(user_id)).unwrap();

        // Settings screen, navbar toggle and sidebar toggle all end up here;
        // the value observed is the last write in sequence order.
        update_theme(&conn, &user_id, ThemePreference::Dark).unwrap();
        update_theme(&conn, &user_id, ThemePreference::Light).unwrap();
        update_language(&conn, &user_id, LanguagePreference::Japanese).unwrap();

        let profile = get_profile(&conn, &user_id).unwrap().unwrap();
        assert_eq!(profile.theme, ThemePreference::Light);
        assert_eq!(profile.language, LanguagePreference::Japanese);
    }

    #[test]
    fn update_without_profile_is_not_found() {
        let conn = open_memory_database().unwrap();
        let err = update_theme(&conn, &Uuid::new_v4(), ThemePreference::Dark);
        assert!(matches!(err, Err(DatabaseError::NotFound { .. })));
    }

    #[test]
    fn delete_profile_removes_row() {
        let conn = open_memory_database().unwrap();
        let user_id = seeded_user(&conn);
        insert_profile(&conn, &Profile::for_user(user_id)).unwrap();
        delete_profile(&conn, &user_id).unwrap();
        assert!(get_profile(&conn, &user_id).unwrap().is_none());
    }
}
