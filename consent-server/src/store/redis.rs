use super::{ConsentStoreBackend, StoreError};
use crate::consent::{ConsentDelta, ConsentKey, Scope};
use async_trait::async_trait;
use log::error;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use std::collections::BTreeSet;

const KEY_PREFIX: &str = "consent:";

/// Consent store keeping one Redis set of scope names per [`ConsentKey`].
///
/// Deltas run inside a `MULTI`/`EXEC` transaction together with the read-back
/// of the resulting set.
#[derive(Clone)]
pub struct RedisConsentStore {
    _client: Client,
    conn_manager: ConnectionManager,
}

impl RedisConsentStore {
    /// Connects to Redis and verifies the connection with a `PING`
    pub async fn new(redis_url: &str) -> Result<Self, String> {
        let client = match Client::open(redis_url) {
            Ok(client) => client,
            Err(err) => {
                return Err(format!("Failed to connect to Redis: {}", err));
            }
        };

        let conn_manager = match ConnectionManager::new(client.clone()).await {
            Ok(manager) => manager,
            Err(err) => {
                return Err(format!(
                    "Failed to create Redis connection manager: {}",
                    err
                ));
            }
        };

        let mut conn = conn_manager.clone();
        if let Err(err) = redis::cmd("PING").query_async::<String>(&mut conn).await {
            return Err(format!("Failed to ping Redis: {}", err));
        }

        Ok(Self {
            _client: client,
            conn_manager,
        })
    }
}

/// Encodes the tuple as a JSON array so identifiers containing `:` can't collide
fn redis_key(key: &ConsentKey) -> Result<String, StoreError> {
    let parts = [
        key.identity.0.as_str(),
        key.application.0.as_str(),
        key.granting_identity.0.as_str(),
    ];
    Ok(format!("{}{}", KEY_PREFIX, serde_json::to_string(&parts)?))
}

fn to_scopes(members: Vec<String>) -> BTreeSet<Scope> {
    members.into_iter().map(Scope).collect()
}

#[async_trait]
impl ConsentStoreBackend for RedisConsentStore {
    async fn fetch(&self, key: &ConsentKey) -> Result<BTreeSet<Scope>, StoreError> {
        let redis_key = redis_key(key)?;
        let mut conn = self.conn_manager.clone();

        match conn.smembers::<_, Vec<String>>(&redis_key).await {
            Ok(members) => Ok(to_scopes(members)),
            Err(err) => {
                error!("Redis error while reading {}: {}", redis_key, err);
                Err(StoreError::Redis(err.to_string()))
            }
        }
    }

    async fn apply(
        &self,
        key: &ConsentKey,
        delta: &ConsentDelta,
    ) -> Result<BTreeSet<Scope>, StoreError> {
        let redis_key = redis_key(key)?;
        let revoke: Vec<&str> = delta.revoke().iter().map(Scope::as_str).collect();
        let grant: Vec<&str> = delta.grant().iter().map(Scope::as_str).collect();

        let mut pipe = redis::pipe();
        pipe.atomic();
        // SREM/SADD reject an empty member list
        if !revoke.is_empty() {
            pipe.srem(&redis_key, revoke).ignore();
        }
        if !grant.is_empty() {
            pipe.sadd(&redis_key, grant).ignore();
        }
        pipe.smembers(&redis_key);

        let mut conn = self.conn_manager.clone();
        match pipe.query_async::<(Vec<String>,)>(&mut conn).await {
            Ok((members,)) => Ok(to_scopes(members)),
            Err(err) => {
                error!("Redis error while applying consent to {}: {}", redis_key, err);
                Err(StoreError::Redis(err.to_string()))
            }
        }
    }

    async fn health_check(&self) -> Result<(), String> {
        let mut conn = self.conn_manager.clone();
        match redis::cmd("PING").query_async::<String>(&mut conn).await {
            Ok(_) => Ok(()),
            Err(err) => Err(format!("Redis health check failed: {}", err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redis_test::server::RedisServer;

    fn get_redis_url(server: &RedisServer) -> String {
        match &server.addr {
            redis::ConnectionAddr::Tcp(host, port) => {
                format!("redis://{}:{}/", host, port)
            }
            _ => "redis://127.0.0.1:6379/".to_string(),
        }
    }

    fn delta(grant: &[&str], revoke: &[&str]) -> ConsentDelta {
        ConsentDelta::new(
            grant.iter().map(|s| s.to_string()),
            revoke.iter().map(|s| s.to_string()),
        )
        .unwrap()
    }

    #[test]
    fn test_redis_key_is_unambiguous() {
        let a = ConsentKey::new("u:1", "app", "c1").unwrap();
        let b = ConsentKey::new("u", "1:app", "c1").unwrap();
        assert_ne!(redis_key(&a).unwrap(), redis_key(&b).unwrap());
        assert_eq!(
            redis_key(&ConsentKey::new("u1", "app1", "c1").unwrap()).unwrap(),
            r#"consent:["u1","app1","c1"]"#
        );
    }

    #[tokio::test]
    #[ignore]
    async fn test_redis_store_operations() {
        let server = RedisServer::new();
        let store = RedisConsentStore::new(&get_redis_url(&server)).await.unwrap();
        let key = ConsentKey::new("u1", "app1", "c1").unwrap();

        let result = store.apply(&key, &delta(&["a", "b"], &[])).await.unwrap();
        assert_eq!(result.len(), 2);

        let result = store.apply(&key, &delta(&[], &["a"])).await.unwrap();
        assert_eq!(result, to_scopes(vec!["b".to_string()]));
        assert_eq!(store.fetch(&key).await.unwrap(), result);
    }

    #[tokio::test]
    #[ignore]
    async fn test_redis_health_check() {
        let server = RedisServer::new();
        let store = RedisConsentStore::new(&get_redis_url(&server)).await.unwrap();

        let result = store.health_check().await;

        assert!(result.is_ok(), "health check failed: {:?}", result);
    }
}
