use async_trait::async_trait;
use redis::{Client, RedisError, RedisResult, Script, aio::ConnectionManager};
use serde::de::DeserializeOwned;
use std::time::Duration;
use uuid::Uuid;

use crate::models::contracts::Model;

/// Read cache for single contracts.
///
/// `store` must never replace a cached record with one of a lower or equal
/// `version`, so concurrent writers and read-throughs can refresh in any
/// order.
#[async_trait]
pub trait ContractCache: Send + Sync {
    async fn get(&self, id: Uuid) -> RedisResult<Option<Model>>;

    /// Returns `false` when a record at least as new was already cached.
    async fn store(&self, contract: &Model, ttl: Duration) -> RedisResult<bool>;

    async fn evict(&self, id: Uuid) -> RedisResult<()>;
}

// KEYS[1] = key, ARGV = { json, version, ttl seconds }
const STORE_IF_NEWER: &str = r#"
local cached = redis.call('GET', KEYS[1])
if cached then
    local ok, decoded = pcall(cjson.decode, cached)
    if ok and type(decoded) == 'table' then
        local version = tonumber(decoded['version'])
        if version and version >= tonumber(ARGV[2]) then
            return 0
        end
    end
end
redis.call('SET', KEYS[1], ARGV[1], 'EX', ARGV[3])
return 1
"#;

#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
    store_if_newer: Script,
}

impl RedisCache {
    pub async fn new(redis_url: &str) -> Result<Self, RedisError> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self {
            connection,
            store_if_newer: Script::new(STORE_IF_NEWER),
        })
    }

    /// Get a value from cache
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> RedisResult<Option<T>> {
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut self.connection.clone())
            .await?;

        match value {
            Some(v) => {
                let deserialized = serde_json::from_str(&v).map_err(|e| {
                    RedisError::from((
                        redis::ErrorKind::TypeError,
                        "Deserialization error",
                        e.to_string(),
                    ))
                })?;
                Ok(Some(deserialized))
            }
            None => Ok(None),
        }
    }

    /// Delete a key from cache
    pub async fn delete(&self, key: &str) -> RedisResult<()> {
        redis::cmd("DEL")
            .arg(key)
            .query_async(&mut self.connection.clone())
            .await
    }
}

#[async_trait]
impl ContractCache for RedisCache {
    async fn get(&self, id: Uuid) -> RedisResult<Option<Model>> {
        self.get_json(&keys::contract(id)).await
    }

    async fn store(&self, contract: &Model, ttl: Duration) -> RedisResult<bool> {
        let serialized = serde_json::to_string(contract).map_err(|e| {
            RedisError::from((
                redis::ErrorKind::TypeError,
                "Serialization error",
                e.to_string(),
            ))
        })?;

        let stored: i32 = self
            .store_if_newer
            .key(keys::contract(contract.id))
            .arg(serialized)
            .arg(contract.version)
            .arg(ttl.as_secs().max(1))
            .invoke_async(&mut self.connection.clone())
            .await?;
        Ok(stored == 1)
    }

    async fn evict(&self, id: Uuid) -> RedisResult<()> {
        self.delete(&keys::contract(id)).await
    }
}

/// Cache key generators
pub mod keys {
    use uuid::Uuid;

    /// Key for a single contract record
    pub fn contract(id: Uuid) -> String {
        format!("contract:{id}")
    }
}
