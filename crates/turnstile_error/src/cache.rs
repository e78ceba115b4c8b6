//! Read-call cache error types.

/// Kinds of failures raised by the cache itself, as opposed to the wrapped fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum CacheErrorKind {
    /// Call arguments could not be serialized into a cache key
    #[display("Failed to serialize arguments for {}: {}", operation, message)]
    Serialization {
        /// Operation the arguments belong to
        operation: String,
        /// Serializer message
        message: String,
    },
    /// A cached value could not be decoded into the requested type
    #[display("Failed to decode cached value for {}: {}", operation, message)]
    Decode {
        /// Operation the cached value belongs to
        operation: String,
        /// Deserializer message
        message: String,
    },
    /// The attempt budget ran out without a result or a propagated error
    #[display("Max retries ({}) exceeded for {}", attempts, operation)]
    RetriesExhausted {
        /// Operation that was being fetched
        operation: String,
        /// Attempt budget that was configured
        attempts: u32,
    },
}

/// Cache error with location tracking.
///
/// # Examples
///
/// ```
/// use turnstile_error::{CacheError, CacheErrorKind};
///
/// let err = CacheError::new(CacheErrorKind::RetriesExhausted {
///     operation: "getEvent".to_string(),
///     attempts: 3,
/// });
/// assert!(format!("{}", err).contains("Max retries (3) exceeded for getEvent"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Cache Error: {} at line {} in {}", kind, line, file)]
pub struct CacheError {
    /// The kind of error that occurred
    pub kind: CacheErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl CacheError {
    /// Create a new cache error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CacheErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &CacheErrorKind {
        &self.kind
    }
}
