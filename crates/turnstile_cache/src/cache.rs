//! Read-call cache implementation.

use crate::{
    CacheConfig, CacheEntry, CacheKey, CallError, CallOptions, Policy, ThrottleRecord,
    backoff_delays, read_in_batches,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, info, instrument, warn};
use turnstile_error::{CacheError, CacheErrorKind, RetryableError};

/// Both tables plus the fetches currently running, behind one lock.
#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<CacheKey, CacheEntry>,
    throttles: HashMap<String, ThrottleRecord>,
    /// Dropping the sender wakes every call waiting on that key.
    in_flight: HashMap<CacheKey, watch::Sender<()>>,
}

/// What a call should do after inspecting the tables.
enum Lookup {
    /// Fresh entry
    Hit(JsonValue),
    /// Expired entry returned because the operation is throttled
    Stale(JsonValue),
    /// Another call is fetching this key
    Join(watch::Receiver<()>),
    /// Throttled with nothing cached: wait, then fetch
    Wait(Duration),
    /// Fetch now; the invocation is already recorded
    Invoke(Option<InFlight>),
}

/// Marks a key as being fetched until dropped.
struct InFlight {
    state: Arc<Mutex<CacheState>>,
    key: CacheKey,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        lock(&self.state).in_flight.remove(&self.key);
    }
}

fn lock(state: &Mutex<CacheState>) -> MutexGuard<'_, CacheState> {
    // Every critical section leaves the tables consistent, so a panic
    // elsewhere does not invalidate them.
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cache for idempotent remote reads.
///
/// Wraps an async read so that repeated calls with the same operation and
/// arguments:
/// - reuse a stored result while it is fresh (`cache_time`),
/// - invoke the read at most once per `throttle_time` per operation,
///   falling back to a stale result when one exists,
/// - retry rate-limit rejections with jittered exponential backoff.
///
/// Results are stored as JSON, so any `Serialize + DeserializeOwned` type
/// can be cached. Clones share the same tables; separately constructed
/// caches are independent.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use turnstile_cache::{CallOptions, ReadCache};
///
/// # #[tokio::main]
/// # async fn main() {
/// let cache = ReadCache::default();
/// let options = CallOptions::new()
///     .with_cache_time(Duration::from_secs(60))
///     .with_throttle_time(Duration::from_secs(10));
///
/// let get_price = |event_id: u64| async move { Ok::<_, String>(event_id * 100) };
///
/// let first = cache.cached_call(get_price, 42, "getPrice", options).await.unwrap();
/// let second = cache.cached_call(get_price, 42, "getPrice", options).await.unwrap();
/// assert_eq!(first, second);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReadCache {
    config: Arc<CacheConfig>,
    state: Arc<Mutex<CacheState>>,
}

impl ReadCache {
    /// Create an empty cache with configuration.
    pub fn new(config: CacheConfig) -> Self {
        debug!(
            cache_time_ms = config.cache_time_ms(),
            throttle_time_ms = config.throttle_time_ms(),
            max_attempts = config.max_attempts(),
            coalesce_in_flight = config.coalesce_in_flight(),
            "Creating new ReadCache"
        );
        Self {
            config: Arc::new(config),
            state: Arc::default(),
        }
    }

    /// Configuration this cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Call `fetch(args)` through the cache.
    ///
    /// # Arguments
    ///
    /// * `fetch` - Idempotent read to wrap
    /// * `args` - Arguments passed to `fetch`; also part of the cache key
    /// * `operation` - Logical read name, shared by all argument variants
    /// * `options` - Per-call overrides of the configured policy
    ///
    /// # Errors
    ///
    /// - [`CallError::Fetch`] with the read's own error when it fails with a
    ///   non-rate-limit error, or with a rate-limit error on the last attempt
    /// - [`CallError::Cache`] when `args` cannot be serialized, a cached
    ///   value does not decode as `T`, or the attempt budget is zero
    #[instrument(skip(self, fetch, args, options))]
    pub async fn cached_call<A, T, E, F, Fut>(
        &self,
        fetch: F,
        args: A,
        operation: &str,
        options: CallOptions,
    ) -> Result<T, CallError<E>>
    where
        A: Serialize + Clone,
        T: Serialize + DeserializeOwned,
        E: RetryableError,
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = CacheKey::new(operation, &args)?;
        let policy = self.config.resolve(operation, options);

        let flight = match self.lookup(&key, &policy) {
            Lookup::Hit(value) => {
                debug!(%key, "Cache hit");
                return decode(&key, value);
            }
            Lookup::Stale(value) => {
                debug!(%key, "Throttled, serving stale entry");
                return decode(&key, value);
            }
            Lookup::Join(mut done) => {
                debug!(%key, "Waiting for in-flight fetch");
                // Resolves once the leading call drops its sender.
                let _ = done.changed().await;
                if let Some(value) = self.fresh_value(&key, &policy) {
                    return decode(&key, value);
                }
                debug!(%key, "In-flight fetch produced nothing, fetching");
                self.begin_invocation(&key)
            }
            Lookup::Wait(remaining) => {
                debug!(%key, wait_ms = remaining.as_millis() as u64, "Throttled, waiting");
                tokio::time::sleep(remaining).await;
                self.begin_invocation(&key)
            }
            Lookup::Invoke(flight) => flight,
        };

        let result = self.fetch_with_retry(&fetch, &args, &key).await;
        if let Ok(value) = &result {
            self.store(&key, value);
        }
        drop(flight);
        result
    }

    /// Remove cached state for one operation, or for all operations.
    ///
    /// With `Some(operation)`, every entry of that operation and its
    /// throttle record are removed. With `None`, both tables are emptied.
    /// Unknown operations are a no-op.
    pub fn clear_cache(&self, operation: Option<&str>) {
        let mut state = lock(&self.state);
        match operation {
            Some(operation) => {
                let before = state.entries.len();
                state.entries.retain(|key, _| key.operation() != operation);
                state.throttles.remove(operation);
                info!(
                    operation,
                    cleared = before - state.entries.len(),
                    "Cleared operation cache"
                );
            }
            None => {
                let count = state.entries.len();
                state.entries.clear();
                state.throttles.clear();
                info!(cleared = count, "Cleared cache");
            }
        }
    }

    /// Run `read` over `items` in batches sized by the configuration.
    ///
    /// See [`read_in_batches`] for the semantics.
    pub async fn read_in_batches<I, T, E, F, Fut>(
        &self,
        items: impl IntoIterator<Item = I>,
        read: F,
    ) -> Vec<T>
    where
        F: Fn(I) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        read_in_batches(
            items,
            *self.config.batch_size(),
            self.config.batch_pause(),
            read,
        )
        .await
    }

    /// Check whether a value is stored for `operation` called with `args`.
    pub fn contains<A: Serialize + ?Sized>(&self, operation: &str, args: &A) -> bool {
        CacheKey::new(operation, args)
            .map(|key| lock(&self.state).entries.contains_key(&key))
            .unwrap_or(false)
    }

    /// When `operation` last invoked its fetch, if ever.
    pub fn last_invoked_at(&self, operation: &str) -> Option<Instant> {
        lock(&self.state)
            .throttles
            .get(operation)
            .map(|record| *record.last_invoked_at())
    }

    /// Get number of cached entries.
    pub fn len(&self) -> usize {
        lock(&self.state).entries.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        lock(&self.state).entries.is_empty()
    }

    /// Get number of operations with a throttle record.
    pub fn throttle_count(&self) -> usize {
        lock(&self.state).throttles.len()
    }

    fn lookup(&self, key: &CacheKey, policy: &Policy) -> Lookup {
        let mut state = lock(&self.state);
        let now = Instant::now();
        let force_fresh = *policy.force_fresh();

        let entry = state.entries.get(key);
        if !force_fresh
            && let Some(entry) = entry
            && entry.is_fresh(*policy.cache_time(), now)
        {
            return Lookup::Hit(entry.value().clone());
        }

        let throttled = if force_fresh {
            None
        } else {
            state
                .throttles
                .get(key.operation())
                .and_then(|record| record.remaining(*policy.throttle_time(), now))
        };

        if throttled.is_some()
            && let Some(entry) = entry
        {
            return Lookup::Stale(entry.value().clone());
        }

        if !force_fresh
            && *self.config.coalesce_in_flight()
            && let Some(sender) = state.in_flight.get(key)
        {
            return Lookup::Join(sender.subscribe());
        }

        if let Some(remaining) = throttled {
            return Lookup::Wait(remaining);
        }

        Lookup::Invoke(self.record_invocation(&mut state, key, now))
    }

    fn begin_invocation(&self, key: &CacheKey) -> Option<InFlight> {
        let mut state = lock(&self.state);
        self.record_invocation(&mut state, key, Instant::now())
    }

    /// Stamp the throttle record and, when coalescing, claim the key.
    fn record_invocation(
        &self,
        state: &mut CacheState,
        key: &CacheKey,
        now: Instant,
    ) -> Option<InFlight> {
        state
            .throttles
            .insert(key.operation().to_string(), ThrottleRecord::new(now));

        if !*self.config.coalesce_in_flight() || state.in_flight.contains_key(key) {
            return None;
        }

        let (sender, _) = watch::channel(());
        state.in_flight.insert(key.clone(), sender);
        Some(InFlight {
            state: Arc::clone(&self.state),
            key: key.clone(),
        })
    }

    fn fresh_value(&self, key: &CacheKey, policy: &Policy) -> Option<JsonValue> {
        let state = lock(&self.state);
        state
            .entries
            .get(key)
            .filter(|entry| entry.is_fresh(*policy.cache_time(), Instant::now()))
            .map(|entry| entry.value().clone())
    }

    fn store<T: Serialize>(&self, key: &CacheKey, value: &T) {
        match serde_json::to_value(value) {
            Ok(json) => {
                lock(&self.state)
                    .entries
                    .insert(key.clone(), CacheEntry::new(json, Instant::now()));
                debug!(%key, "Stored fetch result");
            }
            Err(e) => warn!(%key, error = %e, "Fetch result is not serializable, not caching"),
        }
    }

    async fn fetch_with_retry<A, T, E, F, Fut>(
        &self,
        fetch: &F,
        args: &A,
        key: &CacheKey,
    ) -> Result<T, CallError<E>>
    where
        A: Clone,
        E: RetryableError,
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = *self.config.max_attempts();
        if max_attempts == 0 {
            return Err(CacheError::new(CacheErrorKind::RetriesExhausted {
                operation: key.operation().to_string(),
                attempts: max_attempts,
            })
            .into());
        }

        let cap = Duration::from_millis(*self.config.max_backoff_ms());
        // Set by a failed attempt from its error's `retry_after`; the
        // strategy is advanced right after that attempt fails.
        let hint: Arc<Mutex<Option<Duration>>> = Arc::default();
        let strategy = backoff_delays(
            Duration::from_millis(*self.config.backoff_base_ms()),
            cap,
            max_attempts,
        )
        .map({
            let hint = Arc::clone(&hint);
            move |computed| {
                hint.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .take()
                    .map_or(computed, |requested| requested.min(cap))
            }
        });

        let hint = &hint;
        let mut attempt = 0u32;
        Retry::spawn(strategy, || {
            attempt += 1;
            let current = attempt;
            let pending = fetch(args.clone());
            async move {
                match pending.await {
                    Ok(value) => Ok(value),
                    Err(e) if e.is_retryable() && current < max_attempts => {
                        let retry_after = e.retry_after();
                        warn!(
                            operation = key.operation(),
                            attempt = current,
                            max_attempts,
                            retry_after_ms = retry_after.map(|d| d.as_millis() as u64),
                            error = %e,
                            "Rate limit hit, backing off before retry"
                        );
                        *hint.lock().unwrap_or_else(PoisonError::into_inner) = retry_after;
                        Err(RetryError::Transient { err: e, retry_after })
                    }
                    Err(e) => {
                        debug!(
                            operation = key.operation(),
                            attempt = current,
                            error = %e,
                            "Fetch failed, not retrying"
                        );
                        Err(RetryError::Permanent(e))
                    }
                }
            }
        })
        .await
        .map_err(CallError::Fetch)
    }
}

fn decode<T: DeserializeOwned, E>(key: &CacheKey, value: JsonValue) -> Result<T, CallError<E>> {
    serde_json::from_value(value).map_err(|e| {
        CacheError::new(CacheErrorKind::Decode {
            operation: key.operation().to_string(),
            message: e.to_string(),
        })
        .into()
    })
}
