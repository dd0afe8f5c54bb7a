//! Object storage behind a capability-style trait: upload, delete, and URL
//! generation (signed and time-limited, or public). The production
//! implementation is filesystem-backed; tests swap in a temp directory.

pub mod local;

pub use local::LocalObjectStore;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Signed URL token invalid or expired")]
    TokenExpired,

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Token map lock poisoned")]
    LockPoisoned,
}

/// Storage capability used by the pipeline. Keys look like
/// `{owner_id}/{epoch_millis}_{file_name}`.
pub trait ObjectStore: Send + Sync {
    fn upload(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;

    fn download(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Time-limited URL for previewing the object.
    fn signed_url(&self, key: &str, ttl_secs: u64) -> Result<String, StorageError>;

    /// Unauthenticated URL. Works only if the object exists.
    fn public_url(&self, key: &str) -> Result<String, StorageError>;
}

/// Build the storage key for an upload:
/// `{owner_id}/{epoch_millis}_{original_file_name}`. Not collision-proof for
/// same-millisecond uploads of identically named files, but practically
/// adequate.
pub fn storage_key(owner_id: &uuid::Uuid, file_name: &str) -> String {
    format!(
        "{}/{}_{}",
        owner_id,
        chrono::Utc::now().timestamp_millis(),
        file_name
    )
}
