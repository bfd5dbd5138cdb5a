use std::time::Duration;

use thiserror::Error;

/// Errors raised by the cache registry and its providers
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Provider '{name}' is already registered")]
    DuplicateProvider { name: String },

    #[error("Invalid configuration for provider '{name}': {message}")]
    InvalidProviderConfig { name: String, message: String },

    #[error("No cache providers were registered")]
    NoProvidersRegistered,

    #[error("Registration builder has already been finalized")]
    BuilderAlreadyFinalized,

    #[error("Unknown cache provider: '{name}'")]
    UnknownProvider { name: String },

    #[error("Failed to initialize provider '{name}': {message}")]
    ProviderInitialization { name: String, message: String },

    #[error("Backend for provider '{provider}' unavailable: {message}")]
    BackendUnavailable { provider: String, message: String },

    #[error("Operation '{operation}' on provider '{provider}' timed out after {timeout:?}")]
    Timeout {
        provider: String,
        operation: &'static str,
        timeout: Duration,
    },

    #[error("Type mismatch for key '{key}': expected {expected}: {message}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        message: String,
    },

    #[error("Failed to serialize value for key '{key}': {message}")]
    Serialization { key: String, message: String },
}

impl CacheError {
    pub fn duplicate_provider(name: impl Into<String>) -> Self {
        Self::DuplicateProvider { name: name.into() }
    }

    pub fn invalid_config(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidProviderConfig {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn unknown_provider(name: impl Into<String>) -> Self {
        Self::UnknownProvider { name: name.into() }
    }

    pub fn initialization(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderInitialization {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn backend_unavailable(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn timeout(provider: impl Into<String>, operation: &'static str, timeout: Duration) -> Self {
        Self::Timeout {
            provider: provider.into(),
            operation,
            timeout,
        }
    }

    pub fn type_mismatch(
        key: impl Into<String>,
        expected: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            key: key.into(),
            expected,
            message: message.into(),
        }
    }

    pub fn serialization(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Serialization {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Whether retrying the same call later can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProviderInitialization { .. } | Self::BackendUnavailable { .. } | Self::Timeout { .. }
        )
    }
}
