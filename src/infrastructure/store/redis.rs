//! Redis value store implementation

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tracing::{debug, info};

use crate::domain::store::{ttl_secs, ValueStore};
use crate::domain::DomainError;

/// Configuration for the Redis store
#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Key prefix for namespacing
    pub key_prefix: Option<String>,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: None,
        }
    }
}

impl RedisStoreConfig {
    /// Creates a new configuration with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Sets the key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }
}

/// Redis value store
///
/// Every call clones the `ConnectionManager`, which multiplexes one
/// connection and reconnects on failure. INCR and RPUSH are atomic on the
/// server, so concurrent callers need no extra locking here.
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
    config: RedisStoreConfig,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisStore {
    /// Creates a new Redis store connection
    pub async fn new(config: RedisStoreConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| DomainError::store(format!("Failed to create Redis client: {}", e)))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| DomainError::store(format!("Failed to connect to Redis: {}", e)))?;

        info!(url = %config.url, prefix = ?config.key_prefix, "Connected to Redis");

        Ok(Self { connection, config })
    }

    /// Creates a Redis store with default configuration
    pub async fn with_url(url: impl Into<String>) -> Result<Self, DomainError> {
        Self::new(RedisStoreConfig::new(url)).await
    }

    fn prefix_key(&self, key: &str) -> String {
        prefix_key(self.config.key_prefix.as_deref(), key)
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<usize, DomainError> {
        let prefixed_pattern = self.prefix_key(pattern);
        let mut conn = self.connection.clone();

        let mut cursor = 0u64;
        let mut total_deleted = 0usize;

        loop {
            let (new_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&prefixed_pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await
                .map_err(|e| {
                    DomainError::store(format!(
                        "Failed to scan keys with pattern '{}': {}",
                        pattern, e
                    ))
                })?;

            if !keys.is_empty() {
                let deleted: i64 = conn
                    .del(&keys)
                    .await
                    .map_err(|e| DomainError::store(format!("Failed to delete keys: {}", e)))?;
                total_deleted += deleted as usize;
            }

            cursor = new_cursor;

            if cursor == 0 {
                break;
            }
        }

        Ok(total_deleted)
    }
}

/// RPUSHes ARGV[1] to KEYS[1] and ARGV[2] to KEYS[2], or nothing if either
/// key holds a non-list. MULTI/EXEC would still apply the other push.
const APPEND_PAIR_SCRIPT: &str = r#"
for _, key in ipairs(KEYS) do
  local kind = redis.call('TYPE', key).ok
  if kind ~= 'list' and kind ~= 'none' then
    return redis.error_reply('WRONGTYPE Operation against a key holding the wrong kind of value')
  end
end
redis.call('RPUSH', KEYS[1], ARGV[1])
redis.call('RPUSH', KEYS[2], ARGV[2])
return 2
"#;

fn prefix_key(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}:{}", prefix, key),
        None => key.to_string(),
    }
}

#[async_trait]
impl ValueStore for RedisStore {
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection.clone();

        let _: () = conn
            .set(&prefixed_key, value)
            .await
            .map_err(|e| DomainError::store(format!("Failed to set key '{}': {}", key, e)))?;

        Ok(())
    }

    async fn put_with_expiry(
        &self,
        key: &str,
        value: &[u8],
        ttl: Duration,
    ) -> Result<(), DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection.clone();

        let _: () = conn
            .set_ex(&prefixed_key, value, ttl_secs(ttl))
            .await
            .map_err(|e| DomainError::store(format!("Failed to setex key '{}': {}", key, e)))?;

        Ok(())
    }

    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection.clone();

        let result: Option<Vec<u8>> = conn
            .get(&prefixed_key)
            .await
            .map_err(|e| DomainError::store(format!("Failed to get key '{}': {}", key, e)))?;

        Ok(result)
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection.clone();

        let exists: bool = conn.exists(&prefixed_key).await.map_err(|e| {
            DomainError::store(format!("Failed to check existence of key '{}': {}", key, e))
        })?;

        Ok(exists)
    }

    async fn increment(&self, counter_key: &str) -> Result<i64, DomainError> {
        let prefixed_key = self.prefix_key(counter_key);
        let mut conn = self.connection.clone();

        let new_value: i64 = conn.incr(&prefixed_key, 1).await.map_err(|e| {
            DomainError::store(format!("Failed to increment key '{}': {}", counter_key, e))
        })?;

        Ok(new_value)
    }

    async fn append_to_list(&self, list_key: &str, value: &[u8]) -> Result<(), DomainError> {
        let prefixed_key = self.prefix_key(list_key);
        let mut conn = self.connection.clone();

        let _: i64 = conn.rpush(&prefixed_key, value).await.map_err(|e| {
            DomainError::store(format!("Failed to append to list '{}': {}", list_key, e))
        })?;

        Ok(())
    }

    async fn append_pair(
        &self,
        first_key: &str,
        first: &[u8],
        second_key: &str,
        second: &[u8],
    ) -> Result<(), DomainError> {
        let mut conn = self.connection.clone();

        let _: i64 = redis::Script::new(APPEND_PAIR_SCRIPT)
            .key(self.prefix_key(first_key))
            .key(self.prefix_key(second_key))
            .arg(first)
            .arg(second)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| {
                DomainError::store(format!(
                    "Failed to append to lists '{}' and '{}': {}",
                    first_key, second_key, e
                ))
            })?;

        Ok(())
    }

    async fn read_list(&self, list_key: &str) -> Result<Vec<Vec<u8>>, DomainError> {
        let prefixed_key = self.prefix_key(list_key);
        let mut conn = self.connection.clone();

        let items: Vec<Vec<u8>> = conn.lrange(&prefixed_key, 0, -1).await.map_err(|e| {
            DomainError::store(format!("Failed to read list '{}': {}", list_key, e))
        })?;

        Ok(items)
    }

    async fn expire_after(&self, key: &str, ttl: Duration) -> Result<bool, DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection.clone();

        let updated: bool = conn
            .expire(&prefixed_key, ttl_secs(ttl) as i64)
            .await
            .map_err(|e| {
                DomainError::store(format!("Failed to update TTL for key '{}': {}", key, e))
            })?;

        Ok(updated)
    }

    async fn flush(&self) -> Result<(), DomainError> {
        // With a prefix only our own keys go; otherwise the whole database
        match &self.config.key_prefix {
            Some(prefix) => {
                let deleted = self.delete_pattern("*").await?;
                debug!(prefix = %prefix, deleted, "Flushed prefixed keys");
            }
            None => {
                let mut conn = self.connection.clone();
                redis::cmd("FLUSHDB")
                    .query_async::<()>(&mut conn)
                    .await
                    .map_err(|e| DomainError::store(format!("Failed to flush database: {}", e)))?;
                debug!("Flushed Redis database");
            }
        }

        Ok(())
    }
}
