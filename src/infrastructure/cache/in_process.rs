//! In-process cache provider using moka

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache as MokaCache;
use tokio::task::JoinHandle;

use crate::domain::CacheError;
use crate::domain::cache::{CacheEntry, CacheProvider};
use crate::infrastructure::observability::{OperationTimer, record_cache_operation};

/// Options for an in-process provider
#[derive(Debug, Clone, PartialEq)]
pub struct InProcessOptions {
    /// Maximum number of entries before capacity-based eviction
    pub max_capacity: u64,
    /// Interval of the background sweep reclaiming expired entries
    pub sweep_interval: Option<Duration>,
}

impl Default for InProcessOptions {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            sweep_interval: Some(Duration::from_secs(60)),
        }
    }
}

impl InProcessOptions {
    /// Sets the maximum capacity
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }

    /// Sets the background sweep interval
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = Some(interval);
        self
    }

    /// Disables the background sweep; expired entries are still never returned
    pub fn without_sweep(mut self) -> Self {
        self.sweep_interval = None;
        self
    }

    pub fn validate(&self, name: &str) -> Result<(), CacheError> {
        if self.max_capacity == 0 {
            return Err(CacheError::invalid_config(
                name,
                "max_capacity must be greater than 0",
            ));
        }

        if self.sweep_interval.is_some_and(|interval| interval.is_zero()) {
            return Err(CacheError::invalid_config(
                name,
                "sweep_interval must be greater than 0",
            ));
        }

        Ok(())
    }
}

/// Lets moka drop entries once their own deadline passes
struct EntryExpiry;

impl Expiry<String, CacheEntry<String>> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry<String>,
        created_at: Instant,
    ) -> Option<Duration> {
        value.remaining_at(created_at)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry<String>,
        updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.remaining_at(updated_at)
    }
}

/// Thread-safe in-process cache provider
///
/// Expiry is checked on every read. moka evicts expired entries on its own
/// housekeeping schedule, and the optional sweep task forces that housekeeping
/// when the cache sits idle. Neither affects what readers observe.
#[derive(Debug)]
pub struct InProcessProvider {
    name: String,
    cache: MokaCache<String, CacheEntry<String>>,
    sweeper: Option<JoinHandle<()>>,
}

impl InProcessProvider {
    /// Creates a provider with the given options.
    ///
    /// The sweep task is only started when called inside a tokio runtime.
    pub fn new(name: impl Into<String>, options: InProcessOptions) -> Self {
        let name = name.into();
        let cache = MokaCache::builder()
            .name(&name)
            .max_capacity(options.max_capacity)
            .expire_after(EntryExpiry)
            .build();

        let sweeper = options
            .sweep_interval
            .and_then(|interval| spawn_sweeper(&name, cache.clone(), interval));

        tracing::debug!(
            provider = %name,
            max_capacity = options.max_capacity,
            sweep = sweeper.is_some(),
            "In-process cache allocated"
        );

        Self {
            name,
            cache,
            sweeper,
        }
    }

    /// Number of physically stored entries after pending housekeeping
    pub async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    async fn live_entry(&self, key: &str) -> Option<CacheEntry<String>> {
        self.cache.get(key).await.filter(|entry| !entry.is_expired())
    }
}

fn spawn_sweeper(
    name: &str,
    cache: MokaCache<String, CacheEntry<String>>,
    interval: Duration,
) -> Option<JoinHandle<()>> {
    let handle = tokio::runtime::Handle::try_current().ok()?;
    let name = name.to_string();

    Some(handle.spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            cache.run_pending_tasks().await;
            tracing::trace!(provider = %name, entries = cache.entry_count(), "Cache sweep");
        }
    }))
}

impl Drop for InProcessProvider {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }
    }
}

#[async_trait]
impl CacheProvider for InProcessProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_raw(&self, key: &str) -> Result<Option<String>, CacheError> {
        let timer = OperationTimer::start();
        let value = self.live_entry(key).await.map(CacheEntry::into_value);

        let outcome = if value.is_some() { "hit" } else { "miss" };
        record_cache_operation(&self.name, "get", outcome, timer.elapsed());

        Ok(value)
    }

    async fn set_raw(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let timer = OperationTimer::start();
        let entry = CacheEntry::new(value.to_string(), ttl);

        self.cache.insert(key.to_string(), entry).await;
        record_cache_operation(&self.name, "set", "ok", timer.elapsed());

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        let timer = OperationTimer::start();
        self.cache.invalidate(key).await;
        record_cache_operation(&self.name, "remove", "ok", timer.elapsed());

        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let timer = OperationTimer::start();
        let exists = self.live_entry(key).await.is_some();

        let outcome = if exists { "hit" } else { "miss" };
        record_cache_operation(&self.name, "exists", outcome, timer.elapsed());

        Ok(exists)
    }
}
