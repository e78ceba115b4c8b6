//! Errors for JSON supplied on the command line.

/// Call arguments that are not valid JSON.
///
/// # Examples
///
/// ```
/// use turnstile_error::JsonError;
///
/// let err = JsonError::new("[1,", "EOF while parsing a list");
/// assert_eq!(err.input, "[1,");
/// assert!(err.to_string().contains("EOF while parsing"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("JSON Error: {} in arguments {:?} at line {} in {}", message, input, line, file)]
pub struct JsonError {
    /// Text that was rejected
    pub input: String,
    /// Parser message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl JsonError {
    /// Record that `input` failed to parse with `message`.
    #[track_caller]
    pub fn new(input: impl Into<String>, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            input: input.into(),
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
