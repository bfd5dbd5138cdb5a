//! Provider name value object

use std::borrow::Borrow;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::CacheError;

/// Maximum length for provider names
pub const MAX_PROVIDER_NAME_LENGTH: usize = 64;

/// No whitespace or control characters anywhere in the name
static PROVIDER_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s\p{Cc}]+$").expect("provider name pattern is valid"));

/// Name a cache provider is registered and resolved under.
///
/// Names are case-sensitive: `"Redis"` and `"redis"` are two different providers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderName(String);

impl ProviderName {
    /// Create a new ProviderName after validation
    pub fn new(name: impl Into<String>) -> Result<Self, CacheError> {
        let name = name.into();

        if name.trim().is_empty() {
            return Err(CacheError::invalid_config(name, "provider name cannot be empty"));
        }

        if name.len() > MAX_PROVIDER_NAME_LENGTH {
            let message = format!(
                "provider name too long: {} characters (max {})",
                name.len(),
                MAX_PROVIDER_NAME_LENGTH
            );
            return Err(CacheError::invalid_config(name, message));
        }

        if !PROVIDER_NAME_PATTERN.is_match(&name) {
            return Err(CacheError::invalid_config(
                name,
                "provider name cannot contain whitespace or control characters",
            ));
        }

        Ok(Self(name))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProviderName {
    type Error = CacheError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ProviderName {
    type Error = CacheError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProviderName> for String {
    fn from(name: ProviderName) -> Self {
        name.0
    }
}

impl Borrow<str> for ProviderName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProviderName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
