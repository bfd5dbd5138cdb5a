//! Cache domain - provider contract, names and entries

mod entry;
mod kind;
mod name;
mod provider;

pub use entry::{CacheEntry, MAX_EXPIRING_TTL, effective_ttl};
pub use kind::ProviderKind;
pub use name::{MAX_PROVIDER_NAME_LENGTH, ProviderName};
pub use provider::{CacheProvider, CacheProviderExt, ProviderConstructor};

#[cfg(test)]
pub use provider::MockProviderConstructor;
#[cfg(test)]
pub use provider::mock::MockCacheProvider;
