//! Provider factory - resolves named providers on demand

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::join_all;
use tokio::sync::{Mutex, OnceCell};

use crate::domain::CacheError;
use crate::domain::cache::{CacheProvider, ProviderKind, ProviderName};
use crate::infrastructure::observability::{OperationTimer, record_provider_construction};

use super::definition::{ProviderDefinition, ProviderOptions};
use super::distributed::DistributedProvider;
use super::in_process::InProcessProvider;

/// One registered name: its definition and, once built, its provider
#[derive(Debug)]
struct ProviderSlot {
    definition: ProviderDefinition,
    instance: OnceCell<Box<dyn CacheProvider>>,
    /// Held for the duration of a construction attempt; keeps the last failure
    attempt: Mutex<Option<String>>,
    /// Bumped each time an attempt fails
    failures: AtomicU64,
}

impl ProviderSlot {
    fn new(definition: ProviderDefinition) -> Self {
        Self {
            definition,
            instance: OnceCell::new(),
            attempt: Mutex::new(None),
            failures: AtomicU64::new(0),
        }
    }

    /// Returns the provider, running at most one construction at a time.
    ///
    /// Callers that queued behind a failing attempt get that attempt's error
    /// instead of starting another one; the next call after that retries.
    async fn get_or_construct(&self) -> Result<&dyn CacheProvider, CacheError> {
        if let Some(provider) = self.instance.get() {
            return Ok(provider.as_ref());
        }

        let seen = self.failures.load(Ordering::Acquire);
        let mut last_failure = self.attempt.lock().await;

        if let Some(provider) = self.instance.get() {
            return Ok(provider.as_ref());
        }

        if self.failures.load(Ordering::Acquire) != seen {
            let message = last_failure.clone().unwrap_or_default();
            return Err(CacheError::initialization(self.definition.name().as_str(), message));
        }

        match construct(&self.definition).await {
            Ok(provider) => {
                *last_failure = None;
                let provider = self.instance.get_or_init(|| async move { provider }).await;
                Ok(provider.as_ref())
            }
            Err(error) => {
                *last_failure = Some(match &error {
                    CacheError::ProviderInitialization { message, .. } => message.clone(),
                    other => other.to_string(),
                });
                self.failures.fetch_add(1, Ordering::AcqRel);
                Err(error)
            }
        }
    }
}

/// Immutable table of named cache providers
///
/// Produced by [`CacheRegistrationBuilder::build`](super::CacheRegistrationBuilder::build).
/// The set of names never changes afterwards, so lookups take no lock. Each name
/// owns a once-cell: concurrent first calls wait on a single construction and
/// share its outcome, and a failed construction leaves the cell empty for the
/// next caller to retry.
///
/// Providers are borrowed from the factory and cannot outlive it.
#[derive(Debug)]
pub struct CacheProviderFactory {
    slots: HashMap<ProviderName, ProviderSlot>,
    order: Vec<ProviderName>,
}

impl CacheProviderFactory {
    /// Definitions must carry unique names; the builder guarantees it
    pub(super) fn new(definitions: Vec<ProviderDefinition>) -> Self {
        let order: Vec<ProviderName> = definitions.iter().map(|d| d.name().clone()).collect();
        let slots = definitions
            .into_iter()
            .map(|definition| {
                let name = definition.name().clone();
                (name, ProviderSlot::new(definition))
            })
            .collect();

        Self { slots, order }
    }

    /// Get a provider by name, constructing it on first use
    pub async fn get_provider(&self, name: &str) -> Result<&dyn CacheProvider, CacheError> {
        let slot = self
            .slots
            .get(name)
            .ok_or_else(|| CacheError::unknown_provider(name))?;

        slot.get_or_construct().await
    }

    /// Registered names in registration order
    pub fn names(&self) -> &[ProviderName] {
        &self.order
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Backend kind a name was registered with
    pub fn definition_kind(&self, name: &str) -> Option<ProviderKind> {
        self.slots.get(name).map(|slot| slot.definition.kind())
    }

    /// Whether the provider for `name` has been constructed
    pub fn is_initialized(&self, name: &str) -> bool {
        self.slots
            .get(name)
            .is_some_and(|slot| slot.instance.initialized())
    }

    /// Constructs every provider concurrently, reporting each outcome
    pub async fn warm_up(&self) -> Vec<(ProviderName, Result<(), CacheError>)> {
        let attempts = self.order.iter().map(|name| async move {
            let result = match self.slots.get(name) {
                Some(slot) => slot.get_or_construct().await.map(|_| ()),
                None => Err(CacheError::unknown_provider(name.as_str())),
            };
            (name.clone(), result)
        });

        join_all(attempts).await
    }

    /// Releases every constructed provider and its backend connection
    pub fn shutdown(self) {
        {
            let initialized: Vec<&str> = self
                .order
                .iter()
                .filter(|name| self.is_initialized(name.as_str()))
                .map(ProviderName::as_str)
                .collect();

            tracing::info!(
                providers = ?initialized,
                registered = self.order.len(),
                "Shutting down cache providers"
            );
        }

        drop(self);
    }
}

async fn construct(definition: &ProviderDefinition) -> Result<Box<dyn CacheProvider>, CacheError> {
    let name = definition.name();
    let kind = definition.kind();
    let timer = OperationTimer::start();

    tracing::debug!(provider = %name, %kind, "Constructing cache provider");

    let result: Result<Box<dyn CacheProvider>, CacheError> = match definition.options() {
        ProviderOptions::InProcess(options) => Ok(Box::new(InProcessProvider::new(
            name.as_str(),
            options.clone(),
        ))),
        ProviderOptions::Distributed(options) => DistributedProvider::connect(name.as_str(), options)
            .await
            .map(|provider| Box::new(provider) as Box<dyn CacheProvider>),
        ProviderOptions::Custom(constructor) => constructor.construct(name).await,
    };

    let result = result.map_err(|e| match e {
        e @ CacheError::ProviderInitialization { .. } => e,
        other => CacheError::initialization(name.as_str(), other.to_string()),
    });

    record_provider_construction(
        name.as_str(),
        &kind.to_string(),
        result.is_ok(),
        timer.elapsed(),
    );

    match &result {
        Ok(_) => tracing::info!(
            provider = %name,
            %kind,
            elapsed = ?timer.elapsed(),
            "Created cache provider"
        ),
        Err(e) => tracing::error!(
            provider = %name,
            %kind,
            error = %e,
            "Failed to create cache provider"
        ),
    }

    result
}
