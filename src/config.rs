//! Application configuration: constants, the data directory, and the
//! environment-derived runtime settings.

use std::path::PathBuf;

pub const APP_NAME: &str = "Yomitori";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application data directory, `~/Yomitori/` on all platforms. Holds the
/// SQLite database and the object store.
pub fn app_data_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(APP_NAME),
        None => PathBuf::from(APP_NAME),
    }
}

/// Runtime settings, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Root for the database file and stored blobs.
    pub data_dir: PathBuf,
    /// HTTP bind address, `YOMITORI_BIND`, default `127.0.0.1:8585`.
    pub bind_addr: String,
    /// `MODEL_API_KEY`. Absent means every gateway call fails with a
    /// "not configured" error; the rest of the service still works.
    pub model_api_key: Option<String>,
    /// Chat-completion endpoint, `MODEL_API_URL`.
    pub model_api_url: String,
    /// Model name, `MODEL_NAME`.
    pub model_name: String,
    /// `OCR_STREAMING=1` switches `/api/ocr` to the keep-alive relay.
    pub ocr_streaming: bool,
    /// Per-extraction ceiling in seconds, `OCR_TIMEOUT_SECS`.
    pub ocr_timeout_secs: u64,
    /// Preview signed-URL lifetime, `SIGNED_URL_TTL_SECS`.
    pub signed_url_ttl_secs: u64,
    /// `SERVICE_ROLE_KEY`, required by the account-deletion endpoint.
    pub service_role_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            data_dir: std::env::var("YOMITORI_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| app_data_dir()),
            bind_addr: env_or("YOMITORI_BIND", "127.0.0.1:8585"),
            model_api_key: std::env::var("MODEL_API_KEY").ok(),
            model_api_url: env_or(
                "MODEL_API_URL",
                "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions",
            ),
            model_name: env_or("MODEL_NAME", "gemini-2.5-flash"),
            ocr_streaming: std::env::var("OCR_STREAMING").is_ok_and(|v| v == "1" || v == "true"),
            ocr_timeout_secs: env_u64("OCR_TIMEOUT_SECS", 300),
            signed_url_ttl_secs: env_u64("SIGNED_URL_TTL_SECS", 3600),
            service_role_key: std::env::var("SERVICE_ROLE_KEY").ok(),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("yomitori.db")
    }

    pub fn blobs_dir(&self) -> PathBuf {
        self.data_dir.join("blobs")
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        assert!(dir.ends_with(APP_NAME));
    }

    #[test]
    fn derived_paths_under_data_dir() {
        let config = AppConfig {
            data_dir: PathBuf::from("/tmp/yomitori-test"),
            bind_addr: "127.0.0.1:0".into(),
            model_api_key: None,
            model_api_url: String::new(),
            model_name: String::new(),
            ocr_streaming: false,
            ocr_timeout_secs: 300,
            signed_url_ttl_secs: 3600,
            service_role_key: None,
        };
        assert!(config.database_path().starts_with(&config.data_dir));
        assert!(config.blobs_dir().starts_with(&config.data_dir));
    }
}
