use crate::{
    auth::{token::TokenVerifier, Authenticator},
    config::ServerConfig,
    consent::ConsentService,
    policy::RoutePolicy,
    store::{create_store, ConsentStore, ConsentStoreBackend},
};
use log::warn;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Failed to create token verifier: {0}")]
    Token(#[from] crate::auth::token::TokenError),
    #[error("Failed to create consent store: {0}")]
    Store(#[from] crate::store::StoreError),
}

/// Shared, read-only state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub policy: Arc<RoutePolicy>,
    pub authenticator: Arc<Authenticator>,
    pub consents: ConsentService,
}

impl AppState {
    pub async fn new(config: &ServerConfig) -> Result<Self, StateError> {
        let store = create_store(&config.store).await?;
        Self::with_existing_store(config, store)
    }

    pub fn with_existing_store(
        config: &ServerConfig,
        store: ConsentStore,
    ) -> Result<Self, StateError> {
        let verifier = TokenVerifier::from_config(&config.token)?;
        Ok(Self {
            config: Arc::new(config.clone()),
            policy: Arc::new(RoutePolicy::from_config(&config.policy)),
            authenticator: Arc::new(Authenticator::new(verifier)),
            consents: ConsentService::new(store),
        })
    }

    /// Check if all components are healthy
    pub async fn health_check(&self) -> bool {
        match self.consents.store().health_check().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Consent store is unhealthy: {}", e);
                false
            }
        }
    }

    #[cfg(test)]
    pub fn for_testing(config: &ServerConfig) -> Self {
        use crate::store::memory::InMemoryConsentStore;

        Self::with_existing_store(config, ConsentStore::InMemory(InMemoryConsentStore::new()))
            .expect("Failed to create test state")
    }
}
