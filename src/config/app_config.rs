use std::time::Duration;

use serde::Deserialize;

use crate::domain::CacheError;
use crate::domain::cache::ProviderKind;
use crate::infrastructure::cache::{DistributedOptions, InProcessOptions, ProviderDefinition};
use crate::infrastructure::observability::MetricsConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
    pub caching: CachingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Cache providers to register at startup, in order
///
/// Omitting `providers` yields the same single `"default"` provider as omitting
/// the whole section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CachingConfig {
    pub providers: Vec<ProviderSettings>,
}

impl Default for CachingConfig {
    fn default() -> Self {
        Self {
            providers: vec![ProviderSettings::in_process("default")],
        }
    }
}

/// One provider entry as it appears in configuration
///
/// Only the fields relevant to `kind` are read; the rest fall back to the
/// backend's defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderSettings {
    pub name: String,
    #[serde(default)]
    pub kind: ProviderKind,

    // in-process
    pub max_capacity: Option<u64>,
    pub sweep_interval_secs: Option<u64>,

    // distributed
    pub configuration: Option<String>,
    pub database: Option<i64>,
    pub key_prefix: Option<String>,
    pub connect_timeout_ms: Option<u64>,
    pub operation_timeout_ms: Option<u64>,
}

impl ProviderSettings {
    pub fn in_process(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ProviderKind::InProcess,
            ..Default::default()
        }
    }

    pub fn distributed(name: impl Into<String>, configuration: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ProviderKind::Distributed,
            configuration: Some(configuration.into()),
            ..Default::default()
        }
    }

    /// Converts the settings into a validated definition
    pub fn to_definition(&self) -> Result<ProviderDefinition, CacheError> {
        match self.kind {
            ProviderKind::InProcess => {
                ProviderDefinition::in_process(self.name.clone(), self.in_process_options())
            }
            ProviderKind::Distributed => {
                ProviderDefinition::distributed(self.name.clone(), self.distributed_options()?)
            }
            ProviderKind::Custom => Err(CacheError::invalid_config(
                self.name.clone(),
                "custom providers must be registered in code",
            )),
        }
    }

    fn in_process_options(&self) -> InProcessOptions {
        let mut options = InProcessOptions::default();

        if let Some(capacity) = self.max_capacity {
            options = options.with_max_capacity(capacity);
        }

        match self.sweep_interval_secs {
            Some(0) => options.without_sweep(),
            Some(secs) => options.with_sweep_interval(Duration::from_secs(secs)),
            None => options,
        }
    }

    fn distributed_options(&self) -> Result<DistributedOptions, CacheError> {
        let configuration = self.configuration.as_deref().ok_or_else(|| {
            CacheError::invalid_config(
                self.name.clone(),
                "distributed providers require a configuration string",
            )
        })?;

        let mut options = DistributedOptions::new(configuration);

        if let Some(database) = self.database {
            options = options.with_database(database);
        }
        if let Some(prefix) = &self.key_prefix {
            options = options.with_key_prefix(prefix.clone());
        }
        if let Some(ms) = self.connect_timeout_ms {
            options = options.with_connect_timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = self.operation_timeout_ms {
            options = options.with_operation_timeout(Duration::from_millis(ms));
        }

        Ok(options)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
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
