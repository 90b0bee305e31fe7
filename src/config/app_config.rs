use std::time::Duration;

use serde::Deserialize;

use crate::domain::fetch::{FetchCacheConfig, DEFAULT_FETCH_TTL};
use crate::infrastructure::store::StoreConfig;

/// Redis instance used when nothing else is configured
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Expiring fetch cache settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Lifetime of cached bodies in seconds
    pub ttl_secs: u64,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_FETCH_TTL.as_secs(),
            timeout_secs: 30,
        }
    }
}

impl FetchConfig {
    pub fn cache_config(&self) -> FetchCacheConfig {
        FetchCacheConfig::default().with_ttl(Duration::from_secs(self.ttl_secs))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    /// Loads the configuration for the binary
    ///
    /// Unlike `AppConfig::default`, the store defaults to a local Redis so
    /// state outlives a single invocation.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .set_default("store.backend", "redis")?
            .set_default("store.redis_url", DEFAULT_REDIS_URL)?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::store::StoreType;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.store.backend, StoreType::InMemory);
        assert_eq!(config.fetch.ttl_secs, 10);
        assert_eq!(config.fetch.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{"store": {"backend": "redis", "redis_url": "redis://localhost"}, "fetch": {"ttl_secs": 60}}"#,
        )
        .unwrap();

        assert_eq!(config.store.backend, StoreType::Redis);
        assert_eq!(config.fetch.cache_config().ttl, Duration::from_secs(60));
        assert_eq!(config.fetch.timeout_secs, 30);
        assert!(matches!(config.logging.format, LogFormat::Pretty));
    }

    #[test]
    fn test_load_defaults_to_local_redis() {
        let config = AppConfig::load().unwrap();

        assert_eq!(config.store.backend, StoreType::Redis);
        assert_eq!(config.store.redis_url.as_deref(), Some(DEFAULT_REDIS_URL));
    }

    #[test]
    fn test_log_format_lowercase() {
        let format: LogFormat = serde_json::from_str(r#""json""#).unwrap();
        assert!(matches!(format, LogFormat::Json));
    }
}
