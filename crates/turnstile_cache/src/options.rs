//! Per-call caching options.

use derive_getters::Getters;
use std::time::Duration;

/// Options for a single cached call.
///
/// Unset fields fall back to the operation's configured
/// [`OperationPolicy`](crate::OperationPolicy), then to the global
/// [`CacheConfig`](crate::CacheConfig) defaults. An explicit zero duration
/// is honored as given.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use turnstile_cache::CallOptions;
///
/// let options = CallOptions::new()
///     .with_cache_time(Duration::from_secs(60))
///     .with_throttle_time(Duration::from_secs(10));
/// assert_eq!(*options.cache_time(), Some(Duration::from_secs(60)));
/// assert!(!options.force_fresh());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Getters)]
pub struct CallOptions {
    /// How long a stored value is returned without fetching
    cache_time: Option<Duration>,
    /// Minimum spacing between real fetches of the same operation
    throttle_time: Option<Duration>,
    /// Skip the freshness and throttle checks
    #[getter(skip)]
    force_fresh: Option<bool>,
}

impl CallOptions {
    /// Options with every field unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that always invoke the fetch.
    pub fn fresh() -> Self {
        Self::new().with_force_fresh(true)
    }

    /// Set the freshness window.
    pub fn with_cache_time(mut self, cache_time: Duration) -> Self {
        self.cache_time = Some(cache_time);
        self
    }

    /// Set the minimum spacing between real fetches.
    pub fn with_throttle_time(mut self, throttle_time: Duration) -> Self {
        self.throttle_time = Some(throttle_time);
        self
    }

    /// Set whether the freshness and throttle checks are bypassed.
    pub fn with_force_fresh(mut self, force_fresh: bool) -> Self {
        self.force_fresh = Some(force_fresh);
        self
    }

    /// Whether the freshness and throttle checks are bypassed.
    pub fn force_fresh(&self) -> bool {
        self.force_fresh.unwrap_or(false)
    }

    /// Fill every unset field from `fallback`.
    pub fn or(self, fallback: CallOptions) -> CallOptions {
        CallOptions {
            cache_time: self.cache_time.or(fallback.cache_time),
            throttle_time: self.throttle_time.or(fallback.throttle_time),
            force_fresh: self.force_fresh.or(fallback.force_fresh),
        }
    }
}

/// Fully resolved options for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct Policy {
    /// Freshness window
    cache_time: Duration,
    /// Minimum spacing between real fetches
    throttle_time: Duration,
    /// Whether the freshness and throttle checks are bypassed
    force_fresh: bool,
}

impl Policy {
    pub(crate) fn new(cache_time: Duration, throttle_time: Duration, force_fresh: bool) -> Self {
        Self {
            cache_time,
            throttle_time,
            force_fresh,
        }
    }
}
