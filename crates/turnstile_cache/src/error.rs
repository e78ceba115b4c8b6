//! Errors returned from cached calls.

use std::fmt;
use turnstile_error::{CacheError, RetryableError};

/// Failure of a cached call.
///
/// Fetch failures are handed back exactly as the wrapped read produced
/// them; the cache never substitutes default values.
#[derive(Debug, Clone)]
pub enum CallError<E> {
    /// The wrapped fetch failed
    Fetch(E),
    /// The cache itself failed
    Cache(CacheError),
}

impl<E> CallError<E> {
    /// The fetch error, if the wrapped read failed.
    pub fn fetch_error(&self) -> Option<&E> {
        match self {
            CallError::Fetch(e) => Some(e),
            CallError::Cache(_) => None,
        }
    }

    /// Consume the error, returning the fetch error if there is one.
    pub fn into_fetch_error(self) -> Option<E> {
        match self {
            CallError::Fetch(e) => Some(e),
            CallError::Cache(_) => None,
        }
    }

    /// The cache error, if the cache itself failed.
    pub fn cache_error(&self) -> Option<&CacheError> {
        match self {
            CallError::Fetch(_) => None,
            CallError::Cache(e) => Some(e),
        }
    }
}

impl<E: RetryableError> CallError<E> {
    /// True if the call ultimately failed on a rate-limit rejection.
    pub fn is_rate_limited(&self) -> bool {
        self.fetch_error().is_some_and(RetryableError::is_retryable)
    }
}

impl<E: fmt::Display> fmt::Display for CallError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::Fetch(e) => write!(f, "Fetch failed: {}", e),
            CallError::Cache(e) => write!(f, "{}", e),
        }
    }
}

impl<E> std::error::Error for CallError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CallError::Fetch(e) => Some(e),
            CallError::Cache(e) => Some(e),
        }
    }
}

impl<E> From<CacheError> for CallError<E> {
    fn from(err: CacheError) -> Self {
        CallError::Cache(err)
    }
}
