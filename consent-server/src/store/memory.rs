use super::{ConsentStoreBackend, StoreError};
use crate::consent::{ConsentDelta, ConsentKey, Scope};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-local consent store.
///
/// All mutations take the write lock for the whole delta, so readers see a
/// key's scope set either before or after an `apply`.
#[derive(Clone, Default)]
pub struct InMemoryConsentStore {
    records: Arc<RwLock<HashMap<ConsentKey, BTreeSet<Scope>>>>,
}

impl InMemoryConsentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConsentStoreBackend for InMemoryConsentStore {
    async fn fetch(&self, key: &ConsentKey) -> Result<BTreeSet<Scope>, StoreError> {
        let records = self.records.read().await;
        Ok(records.get(key).cloned().unwrap_or_default())
    }

    async fn apply(
        &self,
        key: &ConsentKey,
        delta: &ConsentDelta,
    ) -> Result<BTreeSet<Scope>, StoreError> {
        let mut records = self.records.write().await;
        let scopes = records.entry(key.clone()).or_default();
        delta.apply_to(scopes);
        let result = scopes.clone();
        // no empty sets left behind once everything is revoked
        if result.is_empty() {
            records.remove(key);
        }
        Ok(result)
    }

    async fn health_check(&self) -> Result<(), String> {
        Ok(())
    }
}
