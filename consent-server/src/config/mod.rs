pub(crate) use crate::config::policy::PolicyConfig;
pub(crate) use crate::config::store::{StoreBackend, StoreConfig};
pub(crate) use crate::config::token::TokenConfig;
use confique::Config;

pub mod policy;
pub mod store;
pub mod token;

/// Optional configuration file, read when present in the working directory
const CONFIG_FILE: &str = "consent.toml";

/// Main configuration structure for the consent server
#[derive(Debug, Config, Clone)]
pub struct ServerConfig {
    /// The port the server will listen to (default: 8080)
    #[config(env = "CONSENT_PORT", default = 8080)]
    pub port: u16,

    /// Access token verification
    #[config(nested)]
    pub token: TokenConfig,

    /// Consent store backend
    #[config(nested)]
    pub store: StoreConfig,

    /// Required scopes per route
    #[config(nested)]
    pub policy: PolicyConfig,
}

impl ServerConfig {
    /// Loads the configuration from environment variables, falling back to
    /// `consent.toml` and then to the defaults
    pub fn new() -> Result<Self, confique::Error> {
        Self::builder().env().file(CONFIG_FILE).load()
    }

    #[cfg(test)]
    pub fn for_test(secret: &str) -> Self {
        Self {
            port: 0,
            token: TokenConfig {
                algorithm: "HS256".to_string(),
                secret: Some(secret.to_string()),
                public_key_path: None,
                issuer: None,
                audience: None,
                leeway: 0,
            },
            store: StoreConfig {
                backend: StoreBackend::InMemory,
                redis_url: None,
            },
            policy: PolicyConfig::default_scopes(),
        }
    }
}
