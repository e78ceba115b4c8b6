//! Top-level error wrapper types.

use crate::{CacheError, ConfigError, JsonError};

/// Every failure the Turnstile crates can raise on their own.
///
/// # Examples
///
/// ```
/// use turnstile_error::{ConfigError, TurnstileError};
///
/// let err: TurnstileError = ConfigError::invalid("batch_size", "must be at least 1").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum TurnstileErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Malformed JSON arguments
    #[from(JsonError)]
    Json(JsonError),
    /// Read-call cache error
    #[from(CacheError)]
    Cache(CacheError),
}

/// Turnstile error with kind discrimination.
///
/// # Examples
///
/// ```
/// use turnstile_error::{ConfigError, TurnstileResult};
///
/// fn might_fail() -> TurnstileResult<()> {
///     Err(ConfigError::load("missing [cache] table"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Turnstile Error: {}", _0)]
pub struct TurnstileError(Box<TurnstileErrorKind>);

impl TurnstileError {
    /// Create a new error from a kind.
    pub fn new(kind: TurnstileErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &TurnstileErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to TurnstileErrorKind
impl<T> From<T> for TurnstileError
where
    T: Into<TurnstileErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Turnstile operations.
pub type TurnstileResult<T> = std::result::Result<T, TurnstileError>;
