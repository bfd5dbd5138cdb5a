//! Cache provider contract

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use super::ProviderName;
use crate::domain::CacheError;

#[cfg(test)]
use mockall::automock;

/// Uniform get/set/remove/exists contract implemented by every cache backend
///
/// This trait moves raw JSON strings so it stays dyn-compatible; use
/// [`CacheProviderExt`] for typed access.
///
/// TTL policy, shared by every implementation: `Some(ttl)` with a non-zero duration
/// expires the entry `ttl` after the write, `None` or `Some(Duration::ZERO)` keeps it
/// until it is removed or evicted. Expiry is checked on every read, so `get_raw` and
/// `exists` always agree.
#[async_trait]
pub trait CacheProvider: Send + Sync + Debug {
    /// Name this provider was registered under
    fn name(&self) -> &str;

    /// Gets a raw JSON value, `None` if missing or expired
    async fn get_raw(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores a raw JSON value, replacing any existing entry
    async fn set_raw(&self, key: &str, value: &str, ttl: Option<Duration>)
    -> Result<(), CacheError>;

    /// Deletes an entry; missing keys are not an error
    async fn remove(&self, key: &str) -> Result<(), CacheError>;

    /// Whether a non-expired entry is present
    async fn exists(&self, key: &str) -> Result<bool, CacheError>;
}

/// Typed get/set on top of [`CacheProvider`]
pub trait CacheProviderExt: CacheProvider {
    /// Gets a typed value.
    ///
    /// Fails with [`CacheError::TypeMismatch`] when the stored payload is not a `V`.
    fn get<'a, V>(
        &'a self,
        key: &'a str,
    ) -> impl std::future::Future<Output = Result<Option<V>, CacheError>> + Send + 'a
    where
        V: DeserializeOwned + Send + 'a,
    {
        async move {
            match self.get_raw(key).await? {
                Some(data) => serde_json::from_str(&data).map(Some).map_err(|e| {
                    CacheError::type_mismatch(key, std::any::type_name::<V>(), e.to_string())
                }),
                None => Ok(None),
            }
        }
    }

    /// Sets a typed value
    fn set<'a, V>(
        &'a self,
        key: &'a str,
        value: &'a V,
        ttl: Option<Duration>,
    ) -> impl std::future::Future<Output = Result<(), CacheError>> + Send + 'a
    where
        V: Serialize + Send + Sync + ?Sized,
    {
        async move {
            let data = serde_json::to_string(value)
                .map_err(|e| CacheError::serialization(key, e.to_string()))?;
            self.set_raw(key, &data, ttl).await
        }
    }
}

impl<T: CacheProvider + ?Sized> CacheProviderExt for T {}

/// Builds a provider for a `Custom` registration
///
/// Invoked by the factory on first access to the name, and again after a failed attempt.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProviderConstructor: Send + Sync + Debug {
    async fn construct(&self, name: &ProviderName) -> Result<Box<dyn CacheProvider>, CacheError>;
}
