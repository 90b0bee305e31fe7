//! Value store trait definition

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Adapter over the external key-value store
///
/// Values are raw bytes. Counters and lists live in the same key space,
/// and atomicity of `increment`, `append_to_list` and `append_pair` is the
/// store's job.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ValueStore: Send + Sync + Debug {
    /// Writes a value with no expiry
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), DomainError>;

    /// Writes a value that disappears after `ttl`
    async fn put_with_expiry(
        &self,
        key: &str,
        value: &[u8],
        ttl: Duration,
    ) -> Result<(), DomainError>;

    /// Reads the raw bytes stored under `key`
    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError>;

    /// Checks if a live value exists under `key`
    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.get_raw(key).await?.is_some())
    }

    /// Increments a counter by one, creating it at zero first if absent
    async fn increment(&self, counter_key: &str) -> Result<i64, DomainError>;

    /// Appends a value to the tail of a list
    async fn append_to_list(&self, list_key: &str, value: &[u8]) -> Result<(), DomainError>;

    /// Appends `first` to one list and `second` to another as one unit:
    /// either both lists grow or neither does
    async fn append_pair(
        &self,
        first_key: &str,
        first: &[u8],
        second_key: &str,
        second: &[u8],
    ) -> Result<(), DomainError>;

    /// Reads a whole list in append order; an absent list is empty
    async fn read_list(&self, list_key: &str) -> Result<Vec<Vec<u8>>, DomainError>;

    /// Sets a TTL on an existing key, returning false if the key is absent
    async fn expire_after(&self, key: &str, ttl: Duration) -> Result<bool, DomainError>;

    /// Removes every key in this store's namespace
    async fn flush(&self) -> Result<(), DomainError>;
}

/// Converts a TTL to whole seconds, never below one
pub fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

/// A TTL as every backend applies it: whole seconds, at least one
pub fn effective_ttl(ttl: Duration) -> Duration {
    Duration::from_secs(ttl_secs(ttl))
}
