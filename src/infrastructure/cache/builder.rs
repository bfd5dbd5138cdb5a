//! Registration builder - collects provider definitions before the factory is frozen

use std::sync::Arc;

use crate::config::CachingConfig;
use crate::domain::CacheError;
use crate::domain::cache::{ProviderConstructor, ProviderName};

use super::definition::{ProviderDefinition, ProviderOptions};
use super::distributed::DistributedOptions;
use super::factory::CacheProviderFactory;
use super::in_process::InProcessOptions;

/// Accumulates named provider definitions during startup
///
/// Every registration is validated immediately, so misconfiguration surfaces
/// here rather than on first use. Once [`build`](Self::build) succeeds the
/// builder is spent and rejects further calls.
///
/// ```ignore
/// let mut builder = CacheRegistrationBuilder::new();
/// builder
///     .use_in_process("default", InProcessOptions::default())?
///     .use_distributed("redis", DistributedOptions::new("10.10.188.136:6379,allowadmin=true"))?;
/// let factory = builder.build()?;
/// ```
#[derive(Debug, Default)]
pub struct CacheRegistrationBuilder {
    definitions: Vec<ProviderDefinition>,
    finalized: bool,
}

impl CacheRegistrationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every provider listed in configuration, in order
    pub fn from_config(config: &CachingConfig) -> Result<Self, CacheError> {
        let mut builder = Self::new();

        for settings in &config.providers {
            builder.register(settings.to_definition()?)?;
        }

        Ok(builder)
    }

    pub fn use_in_process(
        &mut self,
        name: impl Into<String>,
        options: InProcessOptions,
    ) -> Result<&mut Self, CacheError> {
        self.add(name.into(), ProviderOptions::InProcess(options))
    }

    pub fn use_distributed(
        &mut self,
        name: impl Into<String>,
        options: DistributedOptions,
    ) -> Result<&mut Self, CacheError> {
        self.add(name.into(), ProviderOptions::Distributed(options))
    }

    /// Registers a provider built by caller-supplied code
    pub fn use_custom(
        &mut self,
        name: impl Into<String>,
        constructor: Arc<dyn ProviderConstructor>,
    ) -> Result<&mut Self, CacheError> {
        self.add(name.into(), ProviderOptions::Custom(constructor))
    }

    /// Registers an already validated definition
    pub fn register(&mut self, definition: ProviderDefinition) -> Result<&mut Self, CacheError> {
        self.ensure_open()?;
        self.ensure_unique(definition.name())?;

        tracing::debug!(
            provider = %definition.name(),
            kind = %definition.kind(),
            "Registered cache provider"
        );

        self.definitions.push(definition);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Freezes the registrations into a factory
    pub fn build(&mut self) -> Result<CacheProviderFactory, CacheError> {
        self.ensure_open()?;

        if self.definitions.is_empty() {
            return Err(CacheError::NoProvidersRegistered);
        }

        self.finalized = true;
        let definitions = std::mem::take(&mut self.definitions);

        tracing::info!(
            providers = ?definitions.iter().map(|d| d.name().as_str()).collect::<Vec<_>>(),
            "Cache provider factory built"
        );

        Ok(CacheProviderFactory::new(definitions))
    }

    fn add(&mut self, name: String, options: ProviderOptions) -> Result<&mut Self, CacheError> {
        self.ensure_open()?;

        // duplicates win over option errors
        let name = ProviderName::new(name)?;
        self.ensure_unique(&name)?;

        let definition = ProviderDefinition::new(name, options)?;
        self.register(definition)
    }

    fn ensure_open(&self) -> Result<(), CacheError> {
        if self.finalized {
            return Err(CacheError::BuilderAlreadyFinalized);
        }
        Ok(())
    }

    fn ensure_unique(&self, name: &ProviderName) -> Result<(), CacheError> {
        if self.definitions.iter().any(|d| d.name() == name) {
            return Err(CacheError::duplicate_provider(name.as_str()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderSettings;
    use crate::domain::cache::{MockProviderConstructor, ProviderKind};

    #[test]
    fn test_register_and_build() {
        let mut builder = CacheRegistrationBuilder::new();
        builder
            .use_in_process("default", InProcessOptions::default())
            .unwrap()
            .use_distributed(
                "redis",
                DistributedOptions::new("10.10.188.136:6379,allowadmin=true"),
            )
            .unwrap();

        assert_eq!(builder.len(), 2);

        let factory = builder.build().unwrap();
        assert!(factory.contains("default"));
        assert!(factory.contains("redis"));
        assert_eq!(factory.definition_kind("redis"), Some(ProviderKind::Distributed));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut builder = CacheRegistrationBuilder::new();
        builder
            .use_in_process("default", InProcessOptions::default().with_max_capacity(5))
            .unwrap();

        let result = builder.use_distributed("default", DistributedOptions::new("localhost"));
        assert!(matches!(
            result,
            Err(CacheError::DuplicateProvider { ref name }) if name == "default"
        ));

        assert_eq!(builder.len(), 1);
        let factory = builder.build().unwrap();
        assert_eq!(factory.definition_kind("default"), Some(ProviderKind::InProcess));
    }

    #[test]
    fn test_duplicate_reported_before_invalid_options() {
        let mut builder = CacheRegistrationBuilder::new();
        builder
            .use_distributed("redis", DistributedOptions::new("localhost"))
            .unwrap();

        let result = builder.use_distributed("redis", DistributedOptions::new(""));
        assert!(matches!(result, Err(CacheError::DuplicateProvider { .. })));
    }

    #[test]
    fn test_duplicate_registered_definition_rejected() {
        let mut builder = CacheRegistrationBuilder::new();
        builder
            .register(ProviderDefinition::in_process("default", InProcessOptions::default()).unwrap())
            .unwrap();

        let result = builder.register(
            ProviderDefinition::in_process("default", InProcessOptions::default()).unwrap(),
        );
        assert!(matches!(result, Err(CacheError::DuplicateProvider { .. })));
    }

    #[test]
    fn test_invalid_options_rejected_at_registration() {
        let mut builder = CacheRegistrationBuilder::new();

        let result = builder.use_distributed("redis", DistributedOptions::new("   "));
        assert!(matches!(
            result,
            Err(CacheError::InvalidProviderConfig { .. })
        ));
        assert!(builder.is_empty());
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut builder = CacheRegistrationBuilder::new();

        let result = builder.use_in_process("", InProcessOptions::default());
        assert!(matches!(
            result,
            Err(CacheError::InvalidProviderConfig { .. })
        ));
    }

    #[test]
    fn test_build_without_providers() {
        let mut builder = CacheRegistrationBuilder::new();

        assert!(matches!(
            builder.build(),
            Err(CacheError::NoProvidersRegistered)
        ));

        // still usable after a failed build
        builder
            .use_in_process("default", InProcessOptions::default())
            .unwrap();
        assert!(builder.build().is_ok());
    }

    #[test]
    fn test_builder_spent_after_build() {
        let mut builder = CacheRegistrationBuilder::new();
        builder
            .use_in_process("default", InProcessOptions::default())
            .unwrap();
        builder.build().unwrap();

        assert!(matches!(
            builder.use_in_process("other", InProcessOptions::default()),
            Err(CacheError::BuilderAlreadyFinalized)
        ));
        assert!(matches!(
            builder.use_custom("double", Arc::new(MockProviderConstructor::new())),
            Err(CacheError::BuilderAlreadyFinalized)
        ));
        assert!(matches!(
            builder.build(),
            Err(CacheError::BuilderAlreadyFinalized)
        ));
    }

    #[test]
    fn test_from_config() {
        let config = CachingConfig {
            providers: vec![
                ProviderSettings::in_process("default"),
                ProviderSettings::distributed("redis", "10.10.188.136:6379,allowadmin=true"),
            ],
        };

        let mut builder = CacheRegistrationBuilder::from_config(&config).unwrap();
        let factory = builder.build().unwrap();

        let names: Vec<&str> = factory.names().iter().map(ProviderName::as_str).collect();
        assert_eq!(names, vec!["default", "redis"]);
    }

    #[test]
    fn test_from_config_duplicate() {
        let config = CachingConfig {
            providers: vec![
                ProviderSettings::in_process("default"),
                ProviderSettings::in_process("default"),
            ],
        };

        assert!(matches!(
            CacheRegistrationBuilder::from_config(&config),
            Err(CacheError::DuplicateProvider { .. })
        ));
    }
}
