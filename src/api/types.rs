//! Shared API state and request context.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::cache::ResultCache;
use crate::config::AppConfig;
use crate::gateway::{OcrGateway, RemoteOcrClient};
use crate::pipeline::{HeaderBleedFilter, PipelineContext, ProgressRegistry};
use crate::storage::{LocalObjectStore, ObjectStore};

/// Everything handlers and middleware need, cloned per request.
#[derive(Clone)]
pub struct ApiContext {
    pub db: Arc<Mutex<Connection>>,
    pub store: Arc<LocalObjectStore>,
    pub gateway: Arc<dyn OcrGateway>,
    /// Concrete client kept alongside the trait object for the streaming
    /// relay, which needs the raw request builder.
    pub ocr_client: Arc<RemoteOcrClient>,
    pub cache: Arc<ResultCache>,
    pub progress: ProgressRegistry,
    pub filter: HeaderBleedFilter,
    pub config: Arc<AppConfig>,
}

impl ApiContext {
    pub fn new(config: AppConfig, conn: Connection, store: LocalObjectStore) -> Self {
        let client = Arc::new(RemoteOcrClient::new(
            &config.model_api_url,
            &config.model_name,
            config.model_api_key.clone(),
            config.ocr_timeout_secs,
        ));
        Self {
            db: Arc::new(Mutex::new(conn)),
            store: Arc::new(store),
            gateway: client.clone(),
            ocr_client: client,
            cache: Arc::new(ResultCache::new()),
            progress: ProgressRegistry::new(),
            filter: HeaderBleedFilter::default(),
            config: Arc::new(config),
        }
    }

    pub fn pipeline(&self) -> PipelineContext {
        PipelineContext {
            db: self.db.clone(),
            store: self.store.clone() as Arc<dyn ObjectStore>,
            gateway: self.gateway.clone(),
            cache: self.cache.clone(),
            signed_url_ttl_secs: self.config.signed_url_ttl_secs,
        }
    }
}

/// Authenticated caller, injected by the auth middleware.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user_id: uuid::Uuid,
    pub token: String,
}
