//! Expiring cache in front of a fetcher

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tracing::{debug, warn};

use crate::domain::cache::{decode_int, decode_string};
use crate::domain::store::ValueStore;
use crate::domain::DomainError;

use super::fetcher::Fetcher;

/// Default lifetime of a cached body
pub const DEFAULT_FETCH_TTL: Duration = Duration::from_secs(10);

/// Store key of the request counter for `resource`
pub fn count_key(resource: &str) -> String {
    format!("count:{}", resource)
}

/// Store key of the cached body for `resource`
pub fn cached_key(resource: &str) -> String {
    format!("cached:{}", resource)
}

/// Configuration for the expiring fetch cache
#[derive(Debug, Clone)]
pub struct FetchCacheConfig {
    /// Lifetime of every cached body
    pub ttl: Duration,
}

impl Default for FetchCacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_FETCH_TTL,
        }
    }
}

impl FetchCacheConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Memoizes fetched bodies for a fixed TTL and counts every request
///
/// Expiry is left to the store: a body that is present is within its TTL.
#[derive(Debug, Clone)]
pub struct ExpiringFetchCache {
    store: Arc<dyn ValueStore>,
    fetcher: Arc<dyn Fetcher>,
    config: FetchCacheConfig,
}

impl ExpiringFetchCache {
    pub fn new(store: Arc<dyn ValueStore>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self::with_config(store, fetcher, FetchCacheConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn ValueStore>,
        fetcher: Arc<dyn Fetcher>,
        config: FetchCacheConfig,
    ) -> Self {
        Self {
            store,
            fetcher,
            config,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }

    /// Returns the body of `resource`, from the cache when present
    ///
    /// The request counter is incremented first and is not rolled back if
    /// the fetch fails. A failed fetch writes nothing to the cache.
    pub async fn get(&self, resource: &str) -> Result<String, DomainError> {
        let requests = self.store.increment(&count_key(resource)).await?;
        let key = cached_key(resource);

        if let Some(raw) = self.store.get_raw(&key).await? {
            counter!("recall_cache_fetch_total", "outcome" => "hit").increment(1);
            debug!(resource, requests, "Fetch cache hit");

            return decode_string(raw);
        }

        let body = match self.fetcher.fetch(resource).await {
            Ok(body) => body,
            Err(err) => {
                counter!("recall_cache_fetch_total", "outcome" => "error").increment(1);
                warn!(resource, requests, error = %err, "Fetch failed");

                return Err(err);
            }
        };

        self.store
            .put_with_expiry(&key, body.as_bytes(), self.config.ttl)
            .await?;

        counter!("recall_cache_fetch_total", "outcome" => "miss").increment(1);
        debug!(
            resource,
            requests,
            ttl_secs = self.config.ttl.as_secs(),
            "Fetch cache miss, body cached"
        );

        Ok(body)
    }

    /// Number of times `resource` has been requested, hits and misses alike
    pub async fn request_count(&self, resource: &str) -> Result<i64, DomainError> {
        match self.store.get_raw(&count_key(resource)).await? {
            Some(raw) => decode_int(raw),
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fetch::fetcher::MockFetcher;
    use crate::infrastructure::store::InMemoryStore;

    const URL: &str = "http://slowwly.example.com/page";

    fn fetcher_returning(body: &'static str, times: usize) -> MockFetcher {
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|resource| resource == URL)
            .times(times)
            .returning(move |_| Ok(body.to_string()));
        fetcher
    }

    #[tokio::test(start_paused = true)]
    async fn test_hits_within_ttl_fetch_once() {
        let store = Arc::new(InMemoryStore::new());
        let cache = ExpiringFetchCache::new(store, Arc::new(fetcher_returning("<html/>", 1)));

        assert_eq!(cache.get(URL).await.unwrap(), "<html/>");
        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(cache.get(URL).await.unwrap(), "<html/>");
        assert_eq!(cache.get(URL).await.unwrap(), "<html/>");

        assert_eq!(cache.request_count(URL).await.unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetches_after_ttl() {
        let store = Arc::new(InMemoryStore::new());
        let cache = ExpiringFetchCache::new(store, Arc::new(fetcher_returning("<html/>", 2)));

        cache.get(URL).await.unwrap();
        cache.get(URL).await.unwrap();
        tokio::time::advance(Duration::from_secs(11)).await;
        cache.get(URL).await.unwrap();

        assert_eq!(cache.request_count(URL).await.unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_body_stored_with_ttl() {
        let store = Arc::new(InMemoryStore::new());
        let config = FetchCacheConfig::default().with_ttl(Duration::from_secs(30));
        let cache = ExpiringFetchCache::with_config(
            store.clone(),
            Arc::new(fetcher_returning("body", 1)),
            config,
        );

        cache.get(URL).await.unwrap();

        assert_eq!(
            store.get_raw(&cached_key(URL)).await.unwrap(),
            Some(b"body".to_vec())
        );
        tokio::time::advance(Duration::from_secs(31)).await;
        assert!(store.get_raw(&cached_key(URL)).await.unwrap().is_none());
        assert_eq!(store.get_raw(&count_key(URL)).await.unwrap(), Some(b"1".to_vec()));
    }

    #[tokio::test]
    async fn test_fetch_failure_writes_nothing_but_counts() {
        let store = Arc::new(InMemoryStore::new());
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .times(1)
            .returning(|resource| Err(DomainError::fetch(resource, "connection refused")));

        let cache = ExpiringFetchCache::new(store.clone(), Arc::new(fetcher));
        let result = cache.get(URL).await;

        assert!(matches!(result, Err(DomainError::Fetch { .. })));
        assert!(store.get_raw(&cached_key(URL)).await.unwrap().is_none());
        assert_eq!(cache.request_count(URL).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_resources_are_counted_separately() {
        let store = Arc::new(InMemoryStore::new());
        let mut fetcher = MockFetcher::new();
        fetcher
            .expect_fetch()
            .times(2)
            .returning(|resource| Ok(format!("body of {}", resource)));

        let cache = ExpiringFetchCache::new(store, Arc::new(fetcher));

        assert_eq!(cache.get("a").await.unwrap(), "body of a");
        assert_eq!(cache.get("b").await.unwrap(), "body of b");
        assert_eq!(cache.get("a").await.unwrap(), "body of a");

        assert_eq!(cache.request_count("a").await.unwrap(), 2);
        assert_eq!(cache.request_count("b").await.unwrap(), 1);
        assert_eq!(cache.request_count("never").await.unwrap(), 0);
    }

    #[test]
    fn test_keys() {
        assert_eq!(count_key("http://x"), "count:http://x");
        assert_eq!(cached_key("http://x"), "cached:http://x");
    }

    #[test]
    fn test_default_ttl() {
        assert_eq!(FetchCacheConfig::default().ttl, Duration::from_secs(10));
    }
}
