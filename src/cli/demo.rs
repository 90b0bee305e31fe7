//! Walkthrough of storing, reading back and replaying

use crate::domain::instrument::InstrumentedCache;
use crate::domain::DomainError;

use super::cache::{render_value, NIL};
use super::{Context, ReadAs};

pub async fn run(context: &Context) -> anyhow::Result<()> {
    let cache = InstrumentedCache::new(context.typed_cache().await?);

    for line in walkthrough(&cache).await? {
        println!("{}", line);
    }

    Ok(())
}

/// Stores one value of each kind, reads each back with its matching
/// getter and finishes with the replay report
pub async fn walkthrough(cache: &InstrumentedCache) -> Result<Vec<String>, DomainError> {
    let stored = [
        (cache.store("foo").await?, ReadAs::String),
        (cache.store(b"bar").await?, ReadAs::Bytes),
        (cache.store(3).await?, ReadAs::Int),
        (cache.store(1.5).await?, ReadAs::Float),
    ];

    let mut lines = Vec::with_capacity(stored.len() + 1);

    for (key, read_as) in &stored {
        let value = render_value(cache.typed(), key, *read_as).await?;
        lines.push(format!("{} -> {}", key, value.as_deref().unwrap_or(NIL)));
    }

    lines.push(cache.replay_store().await?.to_string());

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::domain::cache::{SequentialKeyGenerator, TypedCache};
    use crate::infrastructure::store::InMemoryStore;

    #[tokio::test]
    async fn test_walkthrough() {
        let typed = TypedCache::new(Arc::new(InMemoryStore::new()))
            .with_key_generator(Arc::new(SequentialKeyGenerator::new("key")));
        let cache = InstrumentedCache::new(typed);

        let lines = walkthrough(&cache).await.unwrap();

        assert_eq!(
            lines,
            vec![
                "key1 -> foo".to_string(),
                "key2 -> b'bar'".to_string(),
                "key3 -> 3".to_string(),
                "key4 -> 1.5".to_string(),
                "Cache.store was called 4 times:\n\
                 Cache.store(*('foo',)) -> key1\n\
                 Cache.store(*(b'bar',)) -> key2\n\
                 Cache.store(*(3,)) -> key3\n\
                 Cache.store(*(1.5,)) -> key4"
                    .to_string(),
            ]
        );
    }
}
