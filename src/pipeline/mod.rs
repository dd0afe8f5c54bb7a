//! Document processing pipeline: batch submission, regeneration, deletion.
//!
//! Files in a batch are processed strictly sequentially. Each file is its own
//! unit of failure: a bad file marks its document `failed` and the loop moves
//! on. Document status is a one-way machine, `pending` to `completed` or
//! `failed`, with no retry path.

pub mod batch;
pub mod filter;
pub mod progress;
pub mod types;

pub use batch::{delete_document, regenerate, submit_batch};
pub use filter::HeaderBleedFilter;
pub use progress::{BatchProgress, ProgressRegistry, ProgressTicker};

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use thiserror::Error;

use crate::cache::ResultCache;
use crate::db::DatabaseError;
use crate::gateway::{GatewayError, OcrGateway};
use crate::storage::{ObjectStore, StorageError};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Document not found: {0}")]
    DocumentNotFound(uuid::Uuid),

    #[error("State lock poisoned")]
    LockPoisoned,

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("OCR gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

/// Everything one batch needs. The connection mutex is held only across
/// individual repository calls, never across a gateway round trip.
pub struct PipelineContext {
    pub db: Arc<Mutex<Connection>>,
    pub store: Arc<dyn ObjectStore>,
    pub gateway: Arc<dyn OcrGateway>,
    pub cache: Arc<ResultCache>,
    pub signed_url_ttl_secs: u64,
}
