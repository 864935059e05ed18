use crate::auth::RequestContext;
use crate::consent::{ConsentDelta, ConsentError, ConsentKey, Scope};
use crate::store::{ConsentStore, ConsentStoreBackend, StoreError};
use log::{debug, error};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Read and write operations over consent records.
///
/// Input is validated before the store is touched; records are never cached
/// between requests.
#[derive(Clone)]
pub struct ConsentService {
    store: Arc<ConsentStore>,
}

impl ConsentService {
    pub fn new(store: ConsentStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn store(&self) -> &ConsentStore {
        &self.store
    }

    /// Returns the scopes currently granted for the tuple, sorted.
    ///
    /// When `requested` is given the result is limited to those scopes. An
    /// empty result is not an error.
    pub async fn fetch_grants(
        &self,
        ctx: &RequestContext,
        identity: &str,
        application: &str,
        granting_identity: &str,
        requested: Option<&BTreeSet<Scope>>,
    ) -> Result<Vec<Scope>, ConsentError> {
        let key = ConsentKey::new(identity, application, granting_identity)?;
        debug!(
            "[{}] Fetching consents for identity '{}' to application '{}' via '{}'",
            ctx.request_id, identity, application, granting_identity
        );

        let granted = self.store.fetch(&key).await.map_err(|e| {
            error!("[{}] Failed to fetch consents: {}", ctx.request_id, e);
            e
        })?;

        let result: Vec<Scope> = match requested {
            Some(requested) => granted.intersection(requested).cloned().collect(),
            None => granted.into_iter().collect(),
        };
        debug!("[{}] Found {} granted scopes", ctx.request_id, result.len());
        Ok(result)
    }

    /// Grants and revokes scopes for the tuple and returns the resulting
    /// granted scopes, sorted.
    ///
    /// A scope present in both lists is granted. The store write is spawned
    /// so it completes even if the caller stops waiting for it.
    pub async fn apply_consent(
        &self,
        ctx: &RequestContext,
        identity: &str,
        application: &str,
        granting_identity: &str,
        grant: Vec<String>,
        revoke: Vec<String>,
    ) -> Result<Vec<Scope>, ConsentError> {
        let key = ConsentKey::new(identity, application, granting_identity)?;
        let delta = ConsentDelta::new(grant, revoke)?;
        if delta.is_empty() {
            return Err(ConsentError::EmptyRequestNotAllowed);
        }
        debug!(
            "[{}] Applying consent for identity '{}' to application '{}' via '{}': grant {:?}, revoke {:?}",
            ctx.request_id,
            identity,
            application,
            granting_identity,
            delta.grant(),
            delta.revoke()
        );

        let store = Arc::clone(&self.store);
        let write = tokio::spawn(async move { store.apply(&key, &delta).await });
        let granted = write
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
            .map_err(|e| {
                error!("[{}] Failed to apply consent: {}", ctx.request_id, e);
                e
            })?;

        Ok(granted.into_iter().collect())
    }
}
