mod app_config;

pub use app_config::{AppConfig, CachingConfig, LogFormat, LoggingConfig, ProviderSettings};
