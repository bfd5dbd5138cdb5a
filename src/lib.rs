//! Cache Registry
//!
//! Named cache providers behind one interface:
//! - In-process caching (moka) and distributed caching (Redis)
//! - Per-entry TTL with lazy expiry
//! - Lazy, single-flight provider construction
//! - Typed access over a JSON payload

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::CacheError;
pub use domain::cache::{
    CacheProvider, CacheProviderExt, ProviderConstructor, ProviderKind, ProviderName,
};
pub use infrastructure::cache::{
    CacheProviderFactory, CacheRegistrationBuilder, DistributedOptions, InProcessOptions,
    ProviderDefinition,
};

/// Registers every configured provider and freezes the factory
pub fn build_factory(config: &AppConfig) -> Result<CacheProviderFactory, CacheError> {
    CacheRegistrationBuilder::from_config(&config.caching)?.build()
}
