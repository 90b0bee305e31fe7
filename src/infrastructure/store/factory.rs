//! Store factory for runtime backend selection

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::domain::store::ValueStore;
use crate::domain::DomainError;

use super::in_memory::InMemoryStore;
use super::redis::{RedisStore, RedisStoreConfig};

/// Supported store backends
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// In-memory store using moka
    #[default]
    #[serde(alias = "memory", alias = "inmemory")]
    InMemory,
    /// Redis store
    Redis,
}

impl std::fmt::Display for StoreType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreType::InMemory => write!(f, "in_memory"),
            StoreType::Redis => write!(f, "redis"),
        }
    }
}

impl std::str::FromStr for StoreType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(StoreType::InMemory),
            "redis" => Ok(StoreType::Redis),
            _ => Err(DomainError::configuration(format!(
                "Unknown store type: {}. Valid types: in_memory, redis",
                s
            ))),
        }
    }
}

/// Configuration for the store factory
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend to create
    pub backend: StoreType,
    /// Redis URL (required for the Redis backend)
    pub redis_url: Option<String>,
    /// Key prefix for namespacing
    pub key_prefix: Option<String>,
    /// Reset the namespace when the cache is constructed
    pub flush_on_start: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreType::InMemory,
            redis_url: None,
            key_prefix: None,
            flush_on_start: false,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration for the in-memory store
    pub fn in_memory() -> Self {
        Self {
            backend: StoreType::InMemory,
            ..Default::default()
        }
    }

    /// Creates a new configuration for the Redis store
    pub fn redis(url: impl Into<String>) -> Self {
        Self {
            backend: StoreType::Redis,
            redis_url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Sets the key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Flushes the namespace on construction
    pub fn with_flush_on_start(mut self, flush: bool) -> Self {
        self.flush_on_start = flush;
        self
    }

    /// Creates config from environment variables
    pub fn from_env() -> Result<Self, DomainError> {
        let backend = std::env::var("STORE_TYPE")
            .unwrap_or_else(|_| "in_memory".to_string())
            .parse()?;

        let redis_url = std::env::var("REDIS_URL").ok();
        let key_prefix = std::env::var("STORE_KEY_PREFIX").ok();

        let flush_on_start = std::env::var("STORE_FLUSH_ON_START")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(false);

        Ok(Self {
            backend,
            redis_url,
            key_prefix,
            flush_on_start,
        })
    }
}

/// Factory for creating store instances
#[derive(Debug, Default)]
pub struct StoreFactory;

impl StoreFactory {
    /// Creates a new store factory
    pub fn new() -> Self {
        Self
    }

    /// Creates a store instance based on configuration
    ///
    /// The store is not flushed here; `flush_on_start` is honored by
    /// `TypedCache::connect` callers.
    pub async fn create(&self, config: &StoreConfig) -> Result<Arc<dyn ValueStore>, DomainError> {
        info!(backend = %config.backend, "Creating value store");

        match config.backend {
            StoreType::InMemory => Ok(self.create_in_memory()),
            StoreType::Redis => {
                let url = config.redis_url.clone().ok_or_else(|| {
                    DomainError::configuration("Redis URL is required for Redis store type")
                })?;

                let mut redis_config = RedisStoreConfig::new(url);

                if let Some(prefix) = &config.key_prefix {
                    redis_config = redis_config.with_key_prefix(prefix.clone());
                }

                let store = RedisStore::new(redis_config).await?;
                Ok(Arc::new(store))
            }
        }
    }

    /// Creates an in-memory store with default settings
    pub fn create_in_memory(&self) -> Arc<dyn ValueStore> {
        Arc::new(InMemoryStore::new())
    }

    /// Creates a Redis store
    pub async fn create_redis(
        &self,
        url: impl Into<String>,
    ) -> Result<Arc<dyn ValueStore>, DomainError> {
        let store = RedisStore::with_url(url).await?;
        Ok(Arc::new(store))
    }
}
