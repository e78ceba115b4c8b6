//! Turnstile - read-call caching for ledger RPC clients
//!
//! Turnstile sits between a ledger client and its RPC endpoint. Read calls
//! go through a [`ReadCache`], which serves fresh results from memory,
//! spaces out real invocations per operation, and retries rate-limit
//! rejections with jittered exponential backoff.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use turnstile::{CallOptions, ReadCache, TurnstileConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TurnstileConfig::load()?;
//!     let cache = ReadCache::new(config.cache);
//!
//!     let event = cache
//!         .cached_call(|id| client.get_event(id), 42u64, "getEvent", CallOptions::new())
//!         .await?;
//!     println!("Event: {:?}", event);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `turnstile-error` - Error types and the `RetryableError` contract
//! - `turnstile-cache` - The read-call cache, policies and batched reads
//!
//! This crate (`turnstile`) re-exports both, and ships the `turnstile`
//! binary for inspecting effective policies and cache keys.

mod cli;

pub use cli::{Cli, Commands, cache_key, policy_lines};

// Re-export core crates
pub use turnstile_cache::*;
pub use turnstile_error::*;
