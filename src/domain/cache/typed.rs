//! Typed cache over a value store

use std::sync::Arc;

use tracing::debug;

use crate::domain::store::ValueStore;
use crate::domain::DomainError;

use super::key::{KeyGenerator, UuidKeyGenerator};
use super::value::{decode_bytes, decode_float, decode_int, decode_string, StoredValue};

/// Stores values under freshly generated keys and reads them back with an
/// optional decode transform
#[derive(Debug, Clone)]
pub struct TypedCache {
    store: Arc<dyn ValueStore>,
    keys: Arc<dyn KeyGenerator>,
}

impl TypedCache {
    /// Creates a cache over an existing store without touching its contents
    pub fn new(store: Arc<dyn ValueStore>) -> Self {
        Self {
            store,
            keys: Arc::new(UuidKeyGenerator::new()),
        }
    }

    /// Creates a cache and resets the store to a clean namespace
    pub async fn connect(store: Arc<dyn ValueStore>) -> Result<Self, DomainError> {
        store.flush().await?;
        debug!("Store flushed for new cache");

        Ok(Self::new(store))
    }

    /// Replaces the key generator
    pub fn with_key_generator(mut self, keys: Arc<dyn KeyGenerator>) -> Self {
        self.keys = keys;
        self
    }

    /// Returns the underlying store handle
    pub fn store_handle(&self) -> &Arc<dyn ValueStore> {
        &self.store
    }

    /// Writes `value` under a new key and returns that key
    pub async fn store(&self, value: impl Into<StoredValue>) -> Result<String, DomainError> {
        let value = value.into();
        let key = self.keys.generate();

        self.store.put(&key, &value.encode()).await?;
        debug!(key = %key, kind = value.kind(), "Stored value");

        Ok(key)
    }

    /// Reads the value under `key` and applies `decode` to its raw bytes
    ///
    /// An absent key yields `Ok(None)`; the decode transform is never run.
    pub async fn get<T, F>(&self, key: &str, decode: F) -> Result<Option<T>, DomainError>
    where
        F: FnOnce(Vec<u8>) -> Result<T, DomainError>,
    {
        match self.store.get_raw(key).await? {
            Some(raw) => decode(raw).map(Some),
            None => Ok(None),
        }
    }

    pub async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError> {
        self.get(key, decode_bytes).await
    }

    pub async fn get_string(&self, key: &str) -> Result<Option<String>, DomainError> {
        self.get(key, decode_string).await
    }

    pub async fn get_int(&self, key: &str) -> Result<Option<i64>, DomainError> {
        self.get(key, decode_int).await
    }

    pub async fn get_float(&self, key: &str) -> Result<Option<f64>, DomainError> {
        self.get(key, decode_float).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::key::SequentialKeyGenerator;
    use crate::domain::store::MockValueStore;
    use crate::infrastructure::store::InMemoryStore;
    use std::collections::HashSet;

    fn cache() -> TypedCache {
        TypedCache::new(Arc::new(InMemoryStore::new()))
    }

    #[tokio::test]
    async fn test_store_and_get_int() {
        let cache = cache();

        let key = cache.store(123).await.unwrap();

        assert_eq!(cache.get_int(&key).await.unwrap(), Some(123));
    }

    #[tokio::test]
    async fn test_store_and_get_string() {
        let cache = cache();

        let key = cache.store("bar").await.unwrap();

        assert_eq!(cache.get_string(&key).await.unwrap(), Some("bar".to_string()));
    }

    #[tokio::test]
    async fn test_store_and_get_bytes() {
        let cache = cache();

        let key = cache.store(b"foo").await.unwrap();

        assert_eq!(cache.get_bytes(&key).await.unwrap(), Some(b"foo".to_vec()));
    }

    #[tokio::test]
    async fn test_store_and_get_float() {
        let cache = cache();

        let key = cache.store(2.5).await.unwrap();

        assert_eq!(cache.get_float(&key).await.unwrap(), Some(2.5));
    }

    #[tokio::test]
    async fn test_raw_bytes_match_encoding() {
        let cache = cache();
        let values = [
            StoredValue::from("héllo"),
            StoredValue::from(vec![0u8, 159, 255]),
            StoredValue::from(i64::MIN),
            StoredValue::from(-0.25),
        ];

        for value in values {
            let key = cache.store(value.clone()).await.unwrap();
            assert_eq!(cache.get_bytes(&key).await.unwrap(), Some(value.encode()));
        }
    }

    #[tokio::test]
    async fn test_get_missing_key_is_none() {
        let cache = cache();

        assert_eq!(cache.get_string("missing").await.unwrap(), None);
        assert_eq!(cache.get_int("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_with_custom_decode() {
        let cache = cache();
        let key = cache.store("abc").await.unwrap();

        let length = cache.get(&key, |raw| Ok(raw.len())).await.unwrap();

        assert_eq!(length, Some(3));
    }

    #[tokio::test]
    async fn test_get_int_on_text_is_decode_error() {
        let cache = cache();
        let key = cache.store("bar").await.unwrap();

        let result = cache.get_int(&key).await;

        assert!(matches!(result, Err(DomainError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_store_keys_are_unique() {
        let cache = cache();
        let mut keys = HashSet::new();

        for i in 0..200 {
            assert!(keys.insert(cache.store(i).await.unwrap()));
        }
    }

    #[tokio::test]
    async fn test_custom_key_generator() {
        let cache = cache().with_key_generator(Arc::new(SequentialKeyGenerator::new("key")));

        assert_eq!(cache.store(1).await.unwrap(), "key1");
        assert_eq!(cache.store(2).await.unwrap(), "key2");
    }

    #[tokio::test]
    async fn test_connect_flushes_store() {
        let store = Arc::new(InMemoryStore::new());
        store.put("stale", b"old").await.unwrap();

        let cache = TypedCache::connect(store.clone()).await.unwrap();

        assert_eq!(cache.get_bytes("stale").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_store_unavailable_is_surfaced() {
        let mut store = MockValueStore::new();
        store
            .expect_put()
            .times(1)
            .returning(|_, _| Err(DomainError::store("connection refused")));

        let cache = TypedCache::new(Arc::new(store));
        let result = cache.store("value").await;

        assert!(matches!(result, Err(DomainError::StoreUnavailable { .. })));
    }
}
