//! Filesystem-backed object store. Objects live under a root directory using
//! their storage key as the relative path; signed URLs are random tokens held
//! in memory with an expiry, resolved by the file-serving route.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use uuid::Uuid;

use super::{ObjectStore, StorageError};

struct SignedToken {
    key: String,
    expires_at: Instant,
}

pub struct LocalObjectStore {
    root: PathBuf,
    tokens: Mutex<HashMap<String, SignedToken>>,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            tokens: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve a signed token back to its storage key, if still valid.
    /// Expired tokens are removed on the way out.
    pub fn resolve_token(&self, token: &str) -> Result<String, StorageError> {
        let mut tokens = self.tokens.lock().map_err(|_| StorageError::LockPoisoned)?;
        match tokens.get(token) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(entry.key.clone()),
            Some(_) => {
                tokens.remove(token);
                Err(StorageError::TokenExpired)
            }
            None => Err(StorageError::TokenExpired),
        }
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let rel = Path::new(key);
        // Keys come from user-supplied file names; refuse anything that could
        // escape the root.
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(rel))
    }
}

impl ObjectStore for LocalObjectStore {
    fn upload(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, bytes)?;
        tracing::debug!(key, size = bytes.len(), "Object stored");
        Ok(())
    }

    fn download(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.object_path(key)?;
        if !path.exists() {
            return Err(StorageError::NotFound(key.to_string()));
        }
        Ok(std::fs::read(path)?)
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.object_path(key)?;
        if !path.exists() {
            return Err(StorageError::NotFound(key.to_string()));
        }
        std::fs::remove_file(path)?;
        Ok(())
    }

    fn signed_url(&self, key: &str, ttl_secs: u64) -> Result<String, StorageError> {
        if !self.object_path(key)?.exists() {
            return Err(StorageError::NotFound(key.to_string()));
        }
        let token = Uuid::new_v4().to_string();
        let mut tokens = self.tokens.lock().map_err(|_| StorageError::LockPoisoned)?;
        tokens.insert(
            token.clone(),
            SignedToken {
                key: key.to_string(),
                expires_at: Instant::now() + Duration::from_secs(ttl_secs),
            },
        );
        Ok(format!("/files/{token}"))
    }

    fn public_url(&self, key: &str) -> Result<String, StorageError> {
        if !self.object_path(key)?.exists() {
            return Err(StorageError::NotFound(key.to_string()));
        }
        Ok(format!("/public/{key}"))
    }
}
