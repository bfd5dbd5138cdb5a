//! Provider definitions captured at registration time

use std::sync::Arc;

use crate::domain::CacheError;
use crate::domain::cache::{ProviderConstructor, ProviderKind, ProviderName};

use super::distributed::DistributedOptions;
use super::in_process::InProcessOptions;

/// Backend-specific options, one variant per [`ProviderKind`]
#[derive(Debug, Clone)]
pub enum ProviderOptions {
    InProcess(InProcessOptions),
    Distributed(DistributedOptions),
    Custom(Arc<dyn ProviderConstructor>),
}

impl ProviderOptions {
    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderOptions::InProcess(_) => ProviderKind::InProcess,
            ProviderOptions::Distributed(_) => ProviderKind::Distributed,
            ProviderOptions::Custom(_) => ProviderKind::Custom,
        }
    }

    /// Runs the backend's own validation; never connects
    pub fn validate(&self, name: &ProviderName) -> Result<(), CacheError> {
        match self {
            ProviderOptions::InProcess(options) => options.validate(name.as_str()),
            ProviderOptions::Distributed(options) => options.validate(name.as_str()),
            ProviderOptions::Custom(_) => Ok(()),
        }
    }
}

/// A named provider waiting to be constructed
#[derive(Debug, Clone)]
pub struct ProviderDefinition {
    name: ProviderName,
    options: ProviderOptions,
}

impl ProviderDefinition {
    /// Creates a definition, validating the name and options
    pub fn new(name: impl Into<String>, options: ProviderOptions) -> Result<Self, CacheError> {
        let name = ProviderName::new(name)?;
        options.validate(&name)?;

        Ok(Self { name, options })
    }

    pub fn in_process(name: impl Into<String>, options: InProcessOptions) -> Result<Self, CacheError> {
        Self::new(name, ProviderOptions::InProcess(options))
    }

    pub fn distributed(
        name: impl Into<String>,
        options: DistributedOptions,
    ) -> Result<Self, CacheError> {
        Self::new(name, ProviderOptions::Distributed(options))
    }

    pub fn custom(
        name: impl Into<String>,
        constructor: Arc<dyn ProviderConstructor>,
    ) -> Result<Self, CacheError> {
        Self::new(name, ProviderOptions::Custom(constructor))
    }

    pub fn name(&self) -> &ProviderName {
        &self.name
    }

    pub fn kind(&self) -> ProviderKind {
        self.options.kind()
    }

    pub fn options(&self) -> &ProviderOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::MockProviderConstructor;

    #[test]
    fn test_in_process_definition() {
        let definition =
            ProviderDefinition::in_process("default", InProcessOptions::default()).unwrap();

        assert_eq!(definition.name().as_str(), "default");
        assert_eq!(definition.kind(), ProviderKind::InProcess);
    }

    #[test]
    fn test_distributed_definition() {
        let definition = ProviderDefinition::distributed(
            "redis",
            DistributedOptions::new("10.10.188.136:6379,allowadmin=true"),
        )
        .unwrap();

        assert_eq!(definition.kind(), ProviderKind::Distributed);
    }

    #[test]
    fn test_custom_definition() {
        let constructor: Arc<dyn ProviderConstructor> = Arc::new(MockProviderConstructor::new());
        let definition = ProviderDefinition::custom("double", constructor).unwrap();

        assert_eq!(definition.kind(), ProviderKind::Custom);
    }

    #[test]
    fn test_invalid_name_rejected() {
        let result = ProviderDefinition::in_process("", InProcessOptions::default());
        assert!(matches!(result, Err(CacheError::InvalidProviderConfig { .. })));
    }

    #[test]
    fn test_invalid_options_rejected() {
        let result = ProviderDefinition::distributed("redis", DistributedOptions::new(""));
        assert!(matches!(
            result,
            Err(CacheError::InvalidProviderConfig { ref name, .. }) if name == "redis"
        ));

        let result = ProviderDefinition::in_process(
            "default",
            InProcessOptions::default().with_max_capacity(0),
        );
        assert!(matches!(result, Err(CacheError::InvalidProviderConfig { .. })));
    }
}
