//! Fetch infrastructure - Fetcher implementations

mod http;

pub use http::HttpFetcher;
