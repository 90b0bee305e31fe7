//! Fetch and request-count commands

use std::sync::Arc;

use crate::domain::fetch::ExpiringFetchCache;
use crate::infrastructure::fetch::HttpFetcher;

use super::Context;

pub async fn fetch(context: &Context, url: &str) -> anyhow::Result<()> {
    let body = fetch_cache(context)?.get(url).await?;

    println!("{}", body);
    Ok(())
}

pub async fn requests(context: &Context, url: &str) -> anyhow::Result<()> {
    let count = fetch_cache(context)?.request_count(url).await?;

    println!("{}", count);
    Ok(())
}

fn fetch_cache(context: &Context) -> anyhow::Result<ExpiringFetchCache> {
    let fetcher = HttpFetcher::with_timeout(context.config.fetch.timeout())?;

    Ok(ExpiringFetchCache::with_config(
        context.store.clone(),
        Arc::new(fetcher),
        context.config.fetch.cache_config(),
    ))
}
