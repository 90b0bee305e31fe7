//! In-memory value store implementation using moka

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use tokio::time::Instant;
use tracing::debug;

use crate::domain::store::{effective_ttl, ValueStore};
use crate::domain::DomainError;

/// Shared list body, appended in place
type ListHandle = Arc<Mutex<Vec<Vec<u8>>>>;

#[derive(Debug, Clone)]
enum SlotData {
    Value(Vec<u8>),
    List(ListHandle),
}

/// Entry stored in moka
#[derive(Debug, Clone)]
struct Slot {
    data: SlotData,
    /// Expiry instant on the tokio clock, `None` for persistent keys
    expires_at: Option<Instant>,
}

impl Slot {
    fn persistent(data: SlotData) -> Self {
        Self {
            data,
            expires_at: None,
        }
    }

    fn is_live(&self) -> bool {
        match self.expires_at {
            Some(at) => Instant::now() < at,
            None => true,
        }
    }
}

fn wrong_type(key: &str) -> DomainError {
    DomainError::store(format!(
        "WRONGTYPE Operation against key '{}' holding the wrong kind of value",
        key
    ))
}

fn parse_counter(data: &[u8]) -> Option<i64> {
    std::str::from_utf8(data).ok()?.parse().ok()
}

fn lock_list<'a>(
    items: &'a ListHandle,
    list_key: &str,
) -> Result<MutexGuard<'a, Vec<Vec<u8>>>, DomainError> {
    items
        .lock()
        .map_err(|e| DomainError::store(format!("List '{}' is poisoned: {}", list_key, e)))
}

/// Thread-safe in-memory store
///
/// Mirrors the Redis semantics the cache layer relies on: expired keys read
/// as absent, INCR keeps an existing TTL, TTLs are whole seconds, and
/// counters and lists are updated atomically per key. The moka cache is
/// unbounded, so nothing is evicted; keys only leave through expiry or
/// `flush`.
#[derive(Debug)]
pub struct InMemoryStore {
    cache: MokaCache<String, Slot>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store
    pub fn new() -> Self {
        Self {
            cache: MokaCache::builder().build(),
        }
    }

    /// Returns the live slot for `key`, dropping it if expired
    async fn live_slot(&self, key: &str) -> Option<Slot> {
        let slot = self.cache.get(key).await?;

        if slot.is_live() {
            Some(slot)
        } else {
            self.cache.invalidate(key).await;
            None
        }
    }

    /// Returns the list under `list_key`, creating an empty one if absent
    async fn list_handle(&self, list_key: &str) -> Result<ListHandle, DomainError> {
        let entry = self
            .cache
            .entry(list_key.to_string())
            .and_upsert_with(|current| {
                let next = match current.map(|entry| entry.into_value()) {
                    Some(slot) if slot.is_live() => slot,
                    _ => Slot::persistent(SlotData::List(ListHandle::default())),
                };

                std::future::ready(next)
            })
            .await;

        match &entry.value().data {
            SlotData::List(items) => Ok(items.clone()),
            SlotData::Value(_) => Err(wrong_type(list_key)),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ValueStore for InMemoryStore {
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), DomainError> {
        self.cache
            .insert(
                key.to_string(),
                Slot::persistent(SlotData::Value(value.to_vec())),
            )
            .await;
        Ok(())
    }

    async fn put_with_expiry(
        &self,
        key: &str,
        value: &[u8],
        ttl: Duration,
    ) -> Result<(), DomainError> {
        let slot = Slot {
            data: SlotData::Value(value.to_vec()),
            expires_at: Some(Instant::now() + effective_ttl(ttl)),
        };

        self.cache.insert(key.to_string(), slot).await;
        Ok(())
    }

    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError> {
        match self.live_slot(key).await {
            Some(Slot {
                data: SlotData::Value(data),
                ..
            }) => Ok(Some(data)),
            Some(_) => Err(wrong_type(key)),
            None => Ok(None),
        }
    }

    async fn increment(&self, counter_key: &str) -> Result<i64, DomainError> {
        let mut incremented = None;

        let entry = self
            .cache
            .entry(counter_key.to_string())
            .and_upsert_with(|current| {
                let next = match current.map(|entry| entry.into_value()) {
                    Some(slot) if slot.is_live() => {
                        let counter = match &slot.data {
                            SlotData::Value(data) => parse_counter(data),
                            SlotData::List(_) => None,
                        };

                        // Non-integer values and lists are left untouched
                        match counter.and_then(|n| n.checked_add(1)) {
                            Some(n) => {
                                incremented = Some(n);
                                Slot {
                                    data: SlotData::Value(n.to_string().into_bytes()),
                                    expires_at: slot.expires_at,
                                }
                            }
                            None => slot,
                        }
                    }
                    _ => {
                        incremented = Some(1);
                        Slot::persistent(SlotData::Value(b"1".to_vec()))
                    }
                };

                std::future::ready(next)
            })
            .await;

        match (incremented, &entry.value().data) {
            (Some(n), _) => Ok(n),
            (None, SlotData::List(_)) => Err(wrong_type(counter_key)),
            (None, SlotData::Value(_)) => Err(DomainError::store(format!(
                "Value at key '{}' is not an integer or out of range",
                counter_key
            ))),
        }
    }

    async fn append_to_list(&self, list_key: &str, value: &[u8]) -> Result<(), DomainError> {
        let items = self.list_handle(list_key).await?;
        lock_list(&items, list_key)?.push(value.to_vec());

        Ok(())
    }

    async fn append_pair(
        &self,
        first_key: &str,
        first: &[u8],
        second_key: &str,
        second: &[u8],
    ) -> Result<(), DomainError> {
        // Both lists are resolved before either is touched
        let firsts = self.list_handle(first_key).await?;
        let seconds = self.list_handle(second_key).await?;

        if Arc::ptr_eq(&firsts, &seconds) {
            let mut items = lock_list(&firsts, first_key)?;
            items.push(first.to_vec());
            items.push(second.to_vec());

            return Ok(());
        }

        // Address order keeps concurrent pairs on the same lists deadlock free
        let (mut first_items, mut second_items) = if Arc::as_ptr(&firsts) < Arc::as_ptr(&seconds) {
            let first_items = lock_list(&firsts, first_key)?;
            (first_items, lock_list(&seconds, second_key)?)
        } else {
            let second_items = lock_list(&seconds, second_key)?;
            (lock_list(&firsts, first_key)?, second_items)
        };

        first_items.push(first.to_vec());
        second_items.push(second.to_vec());

        Ok(())
    }

    async fn read_list(&self, list_key: &str) -> Result<Vec<Vec<u8>>, DomainError> {
        match self.live_slot(list_key).await {
            Some(Slot {
                data: SlotData::List(items),
                ..
            }) => {
                let list = lock_list(&items, list_key)?.clone();
                Ok(list)
            }
            Some(_) => Err(wrong_type(list_key)),
            None => Ok(Vec::new()),
        }
    }

    async fn expire_after(&self, key: &str, ttl: Duration) -> Result<bool, DomainError> {
        match self.live_slot(key).await {
            Some(slot) => {
                let updated = Slot {
                    data: slot.data,
                    expires_at: Some(Instant::now() + effective_ttl(ttl)),
                };

                self.cache.insert(key.to_string(), updated).await;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn flush(&self) -> Result<(), DomainError> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        debug!("In-memory store flushed");
        Ok(())
    }
}
