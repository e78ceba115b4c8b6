//! Read-through caching for idempotent remote reads.
//!
//! This crate wraps remote read calls (ledger views, RPC getters) so that
//! repeated reads are served from memory while fresh, real invocations are
//! spaced out per operation, and rate-limit rejections are retried with
//! jittered exponential backoff.
//!
//! - [`ReadCache`] - the cache itself: [`ReadCache::cached_call`] and
//!   [`ReadCache::clear_cache`]
//! - [`CallOptions`] - per-call overrides of the configured policy
//! - [`TurnstileConfig`] / [`CacheConfig`] - TOML-backed defaults and
//!   per-operation policies
//! - [`read_in_batches`] - bounded fan-out for listing many items
//!
//! Fetch errors are classified with
//! [`RetryableError`](turnstile_error::RetryableError).

#![warn(missing_docs)]

mod backoff;
mod batch;
mod cache;
mod config;
mod entry;
mod error;
mod key;
mod options;

pub use backoff::backoff_delays;
pub use batch::read_in_batches;
pub use cache::ReadCache;
pub use config::{CacheConfig, CacheConfigBuilder, OperationPolicy, TurnstileConfig};
pub use entry::{CacheEntry, ThrottleRecord};
pub use error::CallError;
pub use key::CacheKey;
pub use options::{CallOptions, Policy};
