use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{LanguagePreference, ThemePreference};

/// One-to-one with a user account, created explicitly on sign-up.
/// Theme and language are mutated last-write-wins from any caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub avatar_path: Option<String>,
    pub theme: ThemePreference,
    pub language: LanguagePreference,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Profile {
    /// Fresh profile with default preferences for a new account.
    pub fn for_user(user_id: Uuid) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: user_id,
            first_name: String::new(),
            last_name: String::new(),
            avatar_path: None,
            theme: ThemePreference::System,
            language: LanguagePreference::English,
            created_at: now,
            updated_at: now,
        }
    }
}
