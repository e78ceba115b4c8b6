//! Stored values and invocation records.

use derive_getters::Getters;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tokio::time::Instant;

/// Last successful result for a cache key.
///
/// Entries never expire on their own. Freshness is computed at read time
/// from `stored_at`, and a stale entry stays readable as a fallback until
/// the cache is cleared.
#[derive(Debug, Clone, Getters)]
pub struct CacheEntry {
    value: JsonValue,
    stored_at: Instant,
}

impl CacheEntry {
    pub(crate) fn new(value: JsonValue, stored_at: Instant) -> Self {
        Self { value, stored_at }
    }

    /// Time elapsed between storing the value and `now`.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.stored_at)
    }

    /// Check if the entry is still within `cache_time` at `now`.
    pub fn is_fresh(&self, cache_time: Duration, now: Instant) -> bool {
        self.age(now) < cache_time
    }
}

/// When an operation last actually invoked its fetch.
///
/// Shared by every argument variant of the operation.
#[derive(Debug, Clone, Copy, Getters)]
pub struct ThrottleRecord {
    last_invoked_at: Instant,
}

impl ThrottleRecord {
    pub(crate) fn new(last_invoked_at: Instant) -> Self {
        Self { last_invoked_at }
    }

    /// Remaining part of the throttle window at `now`, if still inside it.
    pub fn remaining(&self, throttle_time: Duration, now: Instant) -> Option<Duration> {
        let elapsed = now.saturating_duration_since(self.last_invoked_at);
        if elapsed < throttle_time {
            Some(throttle_time - elapsed)
        } else {
            None
        }
    }
}
