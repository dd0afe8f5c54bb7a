use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

// Document status is monotonic: pending is the only non-terminal state and
// there is no retry-to-pending path once failed.
str_enum!(DocumentStatus {
    Pending => "pending",
    Completed => "completed",
    Failed => "failed",
});

str_enum!(ThemePreference {
    Light => "light",
    Dark => "dark",
    System => "system",
});

str_enum!(LanguagePreference {
    English => "en",
    Japanese => "ja",
});

str_enum!(ExportFormat {
    Excel => "excel",
    Pdf => "pdf",
    Text => "text",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn document_status_round_trips() {
        for s in ["pending", "completed", "failed"] {
            assert_eq!(DocumentStatus::from_str(s).unwrap().as_str(), s);
        }
    }

    #[test]
    fn unknown_status_rejected() {
        assert!(DocumentStatus::from_str("processing").is_err());
    }

    #[test]
    fn language_codes_are_short() {
        assert_eq!(LanguagePreference::Japanese.as_str(), "ja");
        assert_eq!(LanguagePreference::English.as_str(), "en");
    }

    #[test]
    fn theme_default_value_parses() {
        assert_eq!(
            ThemePreference::from_str("system").unwrap(),
            ThemePreference::System
        );
    }
}
