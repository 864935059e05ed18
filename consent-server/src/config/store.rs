use confique::Config;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// Specifies which consent store implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    InMemory,
    Redis,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "in-memory" => Ok(Self::InMemory),
            "redis" => Ok(Self::Redis),
            other => Err(format!(
                "unknown store backend '{other}', expected 'in-memory' or 'redis'"
            )),
        }
    }
}

impl<'de> Deserialize<'de> for StoreBackend {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Configuration for the consent store
#[derive(Debug, Config, Clone)]
pub struct StoreConfig {
    /// Store backend: "in-memory" (default) or "redis"
    #[config(env = "CONSENT_STORE_BACKEND", default = "in-memory")]
    pub backend: StoreBackend,

    /// Redis connection string, required for the redis backend
    #[config(env = "CONSENT_STORE_REDIS_URL")]
    pub redis_url: Option<String>,
}
