//! Yomitori: a self-hosted document OCR and Japanese translation workflow
//! service. Users upload documents, a remote vision model extracts text and
//! tables and translates them, and the results can be reviewed, regenerated,
//! and exported.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod export;
pub mod gateway;
pub mod models;
pub mod pipeline;
pub mod storage;

use tracing_subscriber::EnvFilter;

/// Initialize structured logging. `RUST_LOG` overrides the default level.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
