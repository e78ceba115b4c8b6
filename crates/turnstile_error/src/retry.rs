//! Classification of fetch failures for retry decisions.

use std::time::Duration;

/// Markers that identify a rate-limit failure in an otherwise opaque message.
const RATE_LIMIT_MARKERS: [&str; 3] = ["rate limit", "429", "too many requests"];

/// Returns true if an error message looks like a rate-limit rejection.
///
/// Matching is case-insensitive so that both `"Too Many Requests"` reason
/// phrases and lower-case RPC messages are recognized.
///
/// # Examples
///
/// ```
/// use turnstile_error::is_rate_limit_message;
///
/// assert!(is_rate_limit_message("HTTP 429: slow down"));
/// assert!(is_rate_limit_message("Too Many Requests"));
/// assert!(!is_rate_limit_message("contract not deployed"));
/// ```
pub fn is_rate_limit_message(message: &str) -> bool {
    let message = message.to_lowercase();
    RATE_LIMIT_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}

/// Trait for fetch errors that may be retried with backoff.
///
/// Only rate-limit rejections are worth retrying: every other failure is
/// propagated to the caller on the first attempt. Error types that carry a
/// status code should override [`is_retryable`](Self::is_retryable); the
/// default falls back to scanning the `Display` output for rate-limit markers.
///
/// # Examples
///
/// ```
/// use turnstile_error::RetryableError;
///
/// #[derive(Debug)]
/// enum RpcError {
///     Status(u16),
///     Other(String),
/// }
///
/// impl std::fmt::Display for RpcError {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         match self {
///             RpcError::Status(code) => write!(f, "status {}", code),
///             RpcError::Other(msg) => write!(f, "{}", msg),
///         }
///     }
/// }
///
/// impl RetryableError for RpcError {
///     fn is_retryable(&self) -> bool {
///         match self {
///             RpcError::Status(code) => *code == 429,
///             RpcError::Other(_) => turnstile_error::is_rate_limit_message(&self.to_string()),
///         }
///     }
/// }
///
/// assert!(RpcError::Status(429).is_retryable());
/// assert!(!RpcError::Status(500).is_retryable());
/// assert!(RpcError::Other("rate limit reached".into()).is_retryable());
/// ```
pub trait RetryableError: std::fmt::Display {
    /// Returns true if this error is a rate-limit rejection.
    fn is_retryable(&self) -> bool {
        is_rate_limit_message(&self.to_string())
    }

    /// Server-provided delay before the next attempt, if known.
    ///
    /// When `Some`, the cache sleeps this long (bounded by its backoff cap)
    /// instead of the jittered exponential delay.
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

impl RetryableError for String {}

impl RetryableError for &'static str {}
