use crate::config::{StoreBackend, StoreConfig};
use crate::consent::{ConsentDelta, ConsentKey, Scope};
use std::collections::BTreeSet;
use thiserror::Error;

pub mod memory;
pub mod redis;

/// Errors that can occur during consent store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(String),
    #[error("Failed to encode key: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("Store task failed: {0}")]
    Task(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Data-access contract for consent records.
///
/// Records are keyed by `(identity, application, granting identity, scope)`;
/// a backend stores the scope set for each [`ConsentKey`]. Implementations
/// must be shareable across concurrent requests (Send + Sync) and provide at
/// least read-committed isolation per key:
///
/// - `apply` is atomic. Either the whole delta is visible to subsequent reads
///   or none of it is.
/// - A concurrent `fetch` observes the scope set either before or after an
///   `apply`, never an intermediate state.
#[async_trait::async_trait]
pub trait ConsentStoreBackend: Send + Sync {
    /// Returns the scopes currently granted for the key (empty if none)
    async fn fetch(&self, key: &ConsentKey) -> Result<BTreeSet<Scope>, StoreError>;

    /// Atomically revokes then grants the delta's scopes and returns the
    /// resulting scope set for the key
    async fn apply(
        &self,
        key: &ConsentKey,
        delta: &ConsentDelta,
    ) -> Result<BTreeSet<Scope>, StoreError>;

    /// Checks that the backend is reachable.
    ///
    /// Returns Ok(()) if healthy, or Err with a descriptive message if unhealthy.
    async fn health_check(&self) -> Result<(), String>;
}

/// Consent store selected at startup from configuration
#[derive(Clone)]
pub enum ConsentStore {
    /// Process-local store, lost on restart
    InMemory(memory::InMemoryConsentStore),
    /// Redis-backed store shared between instances
    Redis(redis::RedisConsentStore),
}

#[async_trait::async_trait]
impl ConsentStoreBackend for ConsentStore {
    async fn fetch(&self, key: &ConsentKey) -> Result<BTreeSet<Scope>, StoreError> {
        match self {
            Self::InMemory(store) => store.fetch(key).await,
            Self::Redis(store) => store.fetch(key).await,
        }
    }

    async fn apply(
        &self,
        key: &ConsentKey,
        delta: &ConsentDelta,
    ) -> Result<BTreeSet<Scope>, StoreError> {
        match self {
            Self::InMemory(store) => store.apply(key, delta).await,
            Self::Redis(store) => store.apply(key, delta).await,
        }
    }

    async fn health_check(&self) -> Result<(), String> {
        match self {
            Self::InMemory(store) => store.health_check().await,
            Self::Redis(store) => store.health_check().await,
        }
    }
}

/// Creates the consent store backend named by the configuration
pub async fn create_store(config: &StoreConfig) -> Result<ConsentStore, StoreError> {
    match config.backend {
        StoreBackend::InMemory => Ok(ConsentStore::InMemory(
            memory::InMemoryConsentStore::new(),
        )),
        StoreBackend::Redis => {
            let url = config.redis_url.as_deref().unwrap_or_default();
            if url.is_empty() {
                return Err(StoreError::Config(
                    "Redis URL is required for the Redis consent store".to_string(),
                ));
            }
            let store = redis::RedisConsentStore::new(url)
                .await
                .map_err(StoreError::Config)?;
            Ok(ConsentStore::Redis(store))
        }
    }
}
