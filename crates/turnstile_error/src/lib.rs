//! Error types for the Turnstile workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Fetch failures produced by wrapped remote reads are not converted into
//! these types. The cache hands them back untouched; [`RetryableError`] is
//! the only contract they must satisfy.
//!
//! # Examples
//!
//! ```
//! use turnstile_error::{ConfigError, TurnstileResult};
//!
//! fn load() -> TurnstileResult<u64> {
//!     Err(ConfigError::load("cache_time_ms is not a number"))?
//! }
//!
//! match load() {
//!     Ok(ms) => println!("cache time: {}", ms),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod config;
mod error;
mod json;
mod retry;

pub use cache::{CacheError, CacheErrorKind};
pub use config::{ConfigError, ConfigErrorKind};
pub use error::{TurnstileError, TurnstileErrorKind, TurnstileResult};
pub use json::JsonError;
pub use retry::{RetryableError, is_rate_limit_message};
