//! Fetch domain - Expiring cache in front of a slow resource fetch

mod cache;
mod fetcher;

pub use cache::{cached_key, count_key, ExpiringFetchCache, FetchCacheConfig, DEFAULT_FETCH_TTL};
pub use fetcher::Fetcher;

#[cfg(test)]
pub use fetcher::MockFetcher;
