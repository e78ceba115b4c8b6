//! Configuration error types.

/// Ways loading cache configuration can fail.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ConfigErrorKind {
    /// A source could not be read or parsed
    #[display("Failed to load configuration: {}", _0)]
    Load(String),
    /// A setting parsed but holds a value the cache cannot run with
    #[display("Invalid {}: {}", setting, reason)]
    Invalid {
        /// Name of the offending setting
        setting: &'static str,
        /// What is wrong with its value
        reason: String,
    },
}

/// Configuration error with source location.
///
/// # Examples
///
/// ```
/// use turnstile_error::{ConfigError, ConfigErrorKind};
///
/// let err = ConfigError::invalid("max_attempts", "must be at least 1");
/// assert!(matches!(
///     err.kind(),
///     ConfigErrorKind::Invalid { setting: "max_attempts", .. }
/// ));
/// assert!(err.to_string().contains("Invalid max_attempts: must be at least 1"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    /// What went wrong
    pub kind: ConfigErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new configuration error at the current location.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// A source that could not be read or parsed.
    #[track_caller]
    pub fn load(message: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::Load(message.into()))
    }

    /// A setting whose value is out of range.
    #[track_caller]
    pub fn invalid(setting: &'static str, reason: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::Invalid {
            setting,
            reason: reason.into(),
        })
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ConfigErrorKind {
        &self.kind
    }
}
