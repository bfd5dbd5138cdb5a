//! Cache entries and the shared expiration policy

use std::time::{Duration, Instant};

/// Longest TTL that still expires; anything above it is kept forever.
///
/// Half of `i64::MAX` milliseconds, so a deadline stays representable both as a
/// local `Instant` and as a Redis expire time.
pub const MAX_EXPIRING_TTL: Duration = Duration::from_millis(i64::MAX as u64 / 2);

/// Normalizes a caller-supplied TTL.
///
/// `None`, a zero duration and anything above [`MAX_EXPIRING_TTL`] all mean
/// "never expire"; every provider applies this rule so the same call behaves
/// identically against every backend.
pub fn effective_ttl(ttl: Option<Duration>) -> Option<Duration> {
    ttl.filter(|ttl| !ttl.is_zero() && *ttl <= MAX_EXPIRING_TTL)
}

/// A value plus the instant after which it is logically absent
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    /// Creates an entry expiring `ttl` from now
    pub fn new(value: V, ttl: Option<Duration>) -> Self {
        Self::new_at(value, ttl, Instant::now())
    }

    /// Creates an entry expiring `ttl` after `now`
    pub fn new_at(value: V, ttl: Option<Duration>, now: Instant) -> Self {
        // A TTL too large to represent is treated as no expiry at all
        let expires_at = effective_ttl(ttl).and_then(|ttl| now.checked_add(ttl));

        Self { value, expires_at }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_value(self) -> V {
        self.value
    }

    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// An entry is absent once `now >= expires_at`
    pub fn is_expired_at(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(expires_at) if now >= expires_at)
    }

    /// Time left before expiry, `None` for entries that never expire
    pub fn remaining_at(&self, now: Instant) -> Option<Duration> {
        self.expires_at
            .map(|expires_at| expires_at.saturating_duration_since(now))
    }
}
