//! Store, get and replay commands

use anyhow::Context as _;

use crate::domain::cache::{format_float, StoredValue, TypedCache};
use crate::domain::instrument::{InstrumentedCache, Normalize};
use crate::domain::replay::ReplayEngine;
use crate::domain::DomainError;

use super::{Context, ReadAs, ValueKind};

/// Shown for keys with no value
pub const NIL: &str = "(nil)";

pub async fn store(context: &Context, value: &str, kind: ValueKind) -> anyhow::Result<()> {
    let cache = InstrumentedCache::new(context.typed_cache().await?);
    let key = cache.store(parse_value(value, kind)?).await?;

    println!("{}", key);
    Ok(())
}

pub async fn get(context: &Context, key: &str, read_as: ReadAs) -> anyhow::Result<()> {
    // Reads never flush.
    let cache = TypedCache::new(context.store.clone());
    let rendered = render_value(&cache, key, read_as).await?;

    println!("{}", rendered.as_deref().unwrap_or(NIL));
    Ok(())
}

pub async fn replay(context: &Context, identity: &str) -> anyhow::Result<()> {
    let report = ReplayEngine::new(context.store.clone())
        .replay(identity)
        .await?;

    println!("{}", report);
    Ok(())
}

/// Converts command line text into a value of the requested kind
pub fn parse_value(value: &str, kind: ValueKind) -> anyhow::Result<StoredValue> {
    let parsed = match kind {
        ValueKind::Str => StoredValue::from(value),
        ValueKind::Int => StoredValue::Int(
            value
                .parse()
                .with_context(|| format!("'{}' is not an integer", value))?,
        ),
        ValueKind::Float => StoredValue::Float(
            value
                .parse()
                .with_context(|| format!("'{}' is not a number", value))?,
        ),
        ValueKind::Bytes => StoredValue::from(value.as_bytes()),
    };

    Ok(parsed)
}

/// Reads `key` and renders it as text, `None` if absent
pub async fn render_value(
    cache: &TypedCache,
    key: &str,
    read_as: ReadAs,
) -> Result<Option<String>, DomainError> {
    match read_as {
        ReadAs::String => cache.get_string(key).await,
        ReadAs::Int => Ok(cache.get_int(key).await?.map(|v| v.to_string())),
        ReadAs::Float => Ok(cache.get_float(key).await?.map(format_float)),
        ReadAs::Bytes => Ok(cache.get_bytes(key).await?.map(|b| b.normalize())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::infrastructure::store::InMemoryStore;

    #[test]
    fn test_parse_value_kinds() {
        assert_eq!(parse_value("foo", ValueKind::Str).unwrap(), StoredValue::from("foo"));
        assert_eq!(parse_value("-7", ValueKind::Int).unwrap(), StoredValue::Int(-7));
        assert_eq!(parse_value("2.5", ValueKind::Float).unwrap(), StoredValue::Float(2.5));
        assert_eq!(
            parse_value("raw", ValueKind::Bytes).unwrap(),
            StoredValue::Bytes(b"raw".to_vec())
        );
    }

    #[test]
    fn test_parse_value_rejects_bad_numbers() {
        let err = parse_value("seven", ValueKind::Int).unwrap_err();
        assert_eq!(err.to_string(), "'seven' is not an integer");

        assert!(parse_value("1.2.3", ValueKind::Float).is_err());
    }

    #[tokio::test]
    async fn test_render_value() {
        let cache = TypedCache::new(Arc::new(InMemoryStore::new()));
        let key = cache.store(3).await.unwrap();

        assert_eq!(
            render_value(&cache, &key, ReadAs::String).await.unwrap(),
            Some("3".to_string())
        );
        assert_eq!(
            render_value(&cache, &key, ReadAs::Int).await.unwrap(),
            Some("3".to_string())
        );
        assert_eq!(
            render_value(&cache, &key, ReadAs::Float).await.unwrap(),
            Some("3.0".to_string())
        );
        assert_eq!(
            render_value(&cache, &key, ReadAs::Bytes).await.unwrap(),
            Some("b'3'".to_string())
        );
    }

    #[tokio::test]
    async fn test_render_missing_key() {
        let cache = TypedCache::new(Arc::new(InMemoryStore::new()));

        let rendered = render_value(&cache, "missing", ReadAs::Int).await.unwrap();

        assert_eq!(rendered, None);
    }

    #[tokio::test]
    async fn test_render_decode_error() {
        let cache = TypedCache::new(Arc::new(InMemoryStore::new()));
        let key = cache.store("not a number").await.unwrap();

        let result = render_value(&cache, &key, ReadAs::Int).await;

        assert!(matches!(result, Err(DomainError::Decode { .. })));
    }
}
