//! Typed cache whose `store` is counted and recorded

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::cache::{StoredValue, TypedCache};
use crate::domain::replay::{Replay, ReplayEngine};
use crate::domain::DomainError;

use super::operation::{instrument, Counted, Operation, Recorded};

/// Identity of the instrumented store operation
pub const STORE_IDENTITY: &str = "Cache.store";

/// `TypedCache::store` exposed as an operation
#[derive(Debug, Clone)]
pub struct StoreOperation {
    cache: TypedCache,
}

impl StoreOperation {
    pub fn new(cache: TypedCache) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl Operation for StoreOperation {
    type Args = (StoredValue,);
    type Output = String;

    fn identity(&self) -> &str {
        STORE_IDENTITY
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, DomainError> {
        self.cache.store(args.0).await
    }
}

/// A typed cache with call counting and history on `store`
///
/// Reads are not instrumented and go straight to the typed cache.
#[derive(Debug)]
pub struct InstrumentedCache {
    cache: TypedCache,
    store_op: Counted<Recorded<StoreOperation>>,
}

impl InstrumentedCache {
    pub fn new(cache: TypedCache) -> Self {
        let store = cache.store_handle().clone();
        let store_op = instrument(StoreOperation::new(cache.clone()), store);

        Self { cache, store_op }
    }

    /// Stores a value, counting the call and recording it in the history
    pub async fn store(&self, value: impl Into<StoredValue>) -> Result<String, DomainError> {
        self.store_op.call((value.into(),)).await
    }

    pub async fn get<T, F>(&self, key: &str, decode: F) -> Result<Option<T>, DomainError>
    where
        F: FnOnce(Vec<u8>) -> Result<T, DomainError>,
    {
        self.cache.get(key, decode).await
    }

    pub async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError> {
        self.cache.get_bytes(key).await
    }

    pub async fn get_string(&self, key: &str) -> Result<Option<String>, DomainError> {
        self.cache.get_string(key).await
    }

    pub async fn get_int(&self, key: &str) -> Result<Option<i64>, DomainError> {
        self.cache.get_int(key).await
    }

    pub async fn get_float(&self, key: &str) -> Result<Option<f64>, DomainError> {
        self.cache.get_float(key).await
    }

    /// Identity under which `store` calls are counted and recorded
    pub fn store_identity(&self) -> &str {
        self.store_op.identity()
    }

    pub fn typed(&self) -> &TypedCache {
        &self.cache
    }

    /// Replays the recorded `store` calls
    pub async fn replay_store(&self) -> Result<Replay, DomainError> {
        ReplayEngine::new(Arc::clone(self.cache.store_handle()))
            .replay_entries(self.store_identity())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::SequentialKeyGenerator;
    use crate::domain::replay::ReplayEntry;
    use crate::domain::store::ValueStore;
    use crate::infrastructure::store::InMemoryStore;

    fn instrumented() -> (Arc<InMemoryStore>, InstrumentedCache) {
        let store = Arc::new(InMemoryStore::new());
        let cache = TypedCache::new(store.clone())
            .with_key_generator(Arc::new(SequentialKeyGenerator::new("key")));

        (store, InstrumentedCache::new(cache))
    }

    #[tokio::test]
    async fn test_store_counts_calls() {
        let (store, cache) = instrumented();

        cache.store(b"first").await.unwrap();
        cache.store(b"second").await.unwrap();
        cache.store(b"third").await.unwrap();

        assert_eq!(store.get_raw(STORE_IDENTITY).await.unwrap(), Some(b"3".to_vec()));
    }

    #[tokio::test]
    async fn test_store_history_replays_in_order() {
        let (_store, cache) = instrumented();

        let keys = [
            cache.store(1).await.unwrap(),
            cache.store(2).await.unwrap(),
            cache.store(3).await.unwrap(),
        ];

        let replay = cache.replay_store().await.unwrap();

        assert_eq!(replay.count, 3);
        assert_eq!(
            replay.entries,
            vec![
                ReplayEntry::new("(1,)", "key1"),
                ReplayEntry::new("(2,)", "key2"),
                ReplayEntry::new("(3,)", "key3"),
            ]
        );
        assert_eq!(keys, ["key1", "key2", "key3"]);
    }

    #[tokio::test]
    async fn test_stored_values_are_readable() {
        let (_store, cache) = instrumented();

        let int_key = cache.store(123).await.unwrap();
        let str_key = cache.store("bar").await.unwrap();
        let bytes_key = cache.store(b"foo").await.unwrap();
        let float_key = cache.store(0.5).await.unwrap();

        assert_eq!(cache.get_int(&int_key).await.unwrap(), Some(123));
        assert_eq!(cache.get_string(&str_key).await.unwrap(), Some("bar".to_string()));
        assert_eq!(cache.get_bytes(&bytes_key).await.unwrap(), Some(b"foo".to_vec()));
        assert_eq!(cache.get_float(&float_key).await.unwrap(), Some(0.5));
        assert_eq!(
            cache.get(&str_key, |raw| Ok(raw.len())).await.unwrap(),
            Some(3)
        );
    }

    #[tokio::test]
    async fn test_reads_are_not_counted() {
        let (store, cache) = instrumented();

        let key = cache.store("bar").await.unwrap();
        cache.get_string(&key).await.unwrap();
        cache.get_string("missing").await.unwrap();

        assert_eq!(store.get_raw(STORE_IDENTITY).await.unwrap(), Some(b"1".to_vec()));
    }

    #[tokio::test]
    async fn test_string_arguments_are_quoted() {
        let (_store, cache) = instrumented();

        cache.store("bar").await.unwrap();
        cache.store(b"foo").await.unwrap();

        let replay = cache.replay_store().await.unwrap();
        let inputs: Vec<&str> = replay.entries.iter().map(|e| e.input.as_str()).collect();

        assert_eq!(inputs, vec!["('bar',)", "(b'foo',)"]);
    }

    #[tokio::test]
    async fn test_many_stores_all_survive() {
        let (_store, cache) = instrumented();
        let mut keys = Vec::new();

        for i in 0..2_000i64 {
            keys.push(cache.store(i).await.unwrap());
        }

        for (i, key) in keys.iter().enumerate() {
            assert_eq!(cache.get_int(key).await.unwrap(), Some(i as i64));
        }

        let replay = cache.replay_store().await.unwrap();
        assert_eq!(replay.count, 2_000);
        assert_eq!(replay.entries.len(), 2_000);
        assert_eq!(replay.entries[1_999], ReplayEntry::new("(1999,)", "key2000"));
    }

    #[test]
    fn test_store_identity() {
        let (_store, cache) = instrumented();
        assert_eq!(cache.store_identity(), "Cache.store");
    }
}
