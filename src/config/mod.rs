mod app_config;

pub use app_config::{AppConfig, DEFAULT_REDIS_URL, FetchConfig, LogFormat, LoggingConfig};
