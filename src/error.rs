//! Structured application errors.
//!
//! Every error carries a stable [`ErrorCode`], a message, an optional
//! context string, an optional cause and free-form string metadata used
//! for diagnostics (field names, raw values, paths).

use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;

/// Boxed cause attached to an [`AppError`].
pub type Cause = Box<dyn StdError + Send + Sync + 'static>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    /// General internal failure; prefer a more specific code when one fits.
    Internal,
    /// Keeps the process from starting. Fixable in the process configuration.
    SystemConfiguration,
    /// The process or one of its dependencies cannot service the request.
    ServiceUnavailable,
    /// An internal argument check failed. Usually a bug.
    IllegalArgument,
    /// Client-provided data is invalid.
    Validation,
    /// The operation cannot run in the current state.
    IllegalState,
    /// A referenced entity does not exist.
    NotFound,
    /// The entity an operation would create already exists.
    AlreadyExists,
    /// Accessing a resource such as a file failed.
    Io,
}

impl ErrorCode {
    /// Stable numeric value of the code.
    pub fn value(self) -> u8 {
        match self {
            ErrorCode::Internal => 1,
            ErrorCode::SystemConfiguration => 2,
            ErrorCode::ServiceUnavailable => 3,
            ErrorCode::IllegalArgument => 4,
            ErrorCode::Validation => 5,
            ErrorCode::IllegalState => 6,
            ErrorCode::NotFound => 7,
            ErrorCode::AlreadyExists => 8,
            ErrorCode::Io => 9,
        }
    }

    /// Machine-readable name of the code.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Internal => "internal",
            ErrorCode::SystemConfiguration => "system-configuration",
            ErrorCode::ServiceUnavailable => "service-unavailable",
            ErrorCode::IllegalArgument => "illegal-argument",
            ErrorCode::Validation => "validation",
            ErrorCode::IllegalState => "illegal-state",
            ErrorCode::NotFound => "not-found",
            ErrorCode::AlreadyExists => "already-exists",
            ErrorCode::Io => "io",
        }
    }

    /// HTTP status a service front-end should answer with, if the code maps to one.
    pub fn http_status(self) -> Option<u16> {
        match self {
            ErrorCode::Internal | ErrorCode::IllegalArgument | ErrorCode::SystemConfiguration => {
                Some(500)
            }
            ErrorCode::ServiceUnavailable => Some(503),
            ErrorCode::Validation => Some(400),
            ErrorCode::AlreadyExists | ErrorCode::IllegalState => Some(409),
            ErrorCode::NotFound => Some(404),
            ErrorCode::Io => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application error with code, message and diagnostic metadata.
#[derive(Debug)]
pub struct AppError {
    code: ErrorCode,
    message: String,
    context: Option<String>,
    cause: Option<Cause>,
    metadata: BTreeMap<String, String>,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            cause: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Identify the operation that was in progress when the error occurred.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Attach the underlying error.
    pub fn with_cause(mut self, cause: impl Into<Cause>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Add a string key/value pair to the metadata. Empty keys are ignored.
    pub fn with_str(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        if !key.is_empty() {
            self.metadata.insert(key, value.into());
        }
        self
    }

    // Convenience constructors

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    pub fn system_configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SystemConfiguration, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    pub fn illegal_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::IllegalArgument, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, message)
    }

    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::IllegalState, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AlreadyExists, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Io, message)
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Underlying error, if one was attached.
    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Look up a single metadata value.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.code)?;
        if let Some(ref context) = self.context {
            write!(f, "{}: ", context)?;
        }
        f.write_str(&self.message)?;
        if let Some(ref cause) = self.cause {
            write!(f, "; Cause={}", cause)?;
        }
        Ok(())
    }
}

impl StdError for AppError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

/// Result type for configuration and bootstrap operations.
pub type AppResult<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_context_and_cause() {
        let err = AppError::internal(format!("there was a {}", "problem"))
            .with_context("some context")
            .with_cause("the cause");

        assert_eq!(err.code(), ErrorCode::Internal);
        assert_eq!(err.code().as_str(), "internal");
        assert_eq!(err.cause().map(|c| c.to_string()).as_deref(), Some("the cause"));
        assert_eq!(
            err.to_string(),
            "[internal] some context: there was a problem; Cause=the cause"
        );
    }

    #[test]
    fn test_display_minimal() {
        let err = AppError::not_found("numCats field not found");
        assert_eq!(err.to_string(), "[not-found] numCats field not found");
        assert!(err.context().is_none());
        assert!(StdError::source(&err).is_none());
    }

    #[test]
    fn test_constructor_codes() {
        assert_eq!(AppError::internal("e").code(), ErrorCode::Internal);
        assert_eq!(
            AppError::system_configuration("e").code(),
            ErrorCode::SystemConfiguration
        );
        assert_eq!(
            AppError::service_unavailable("e").code(),
            ErrorCode::ServiceUnavailable
        );
        assert_eq!(AppError::illegal_argument("e").code(), ErrorCode::IllegalArgument);
        assert_eq!(AppError::validation("e").code(), ErrorCode::Validation);
        assert_eq!(AppError::illegal_state("e").code(), ErrorCode::IllegalState);
        assert_eq!(AppError::not_found("e").code(), ErrorCode::NotFound);
        assert_eq!(AppError::already_exists("e").code(), ErrorCode::AlreadyExists);
        assert_eq!(AppError::io("e").code(), ErrorCode::Io);
    }

    #[test]
    fn test_metadata_ignores_empty_keys() {
        let err = AppError::system_configuration("bad")
            .with_str("fieldName", "port")
            .with_str("", "dropped");
        assert_eq!(err.metadata_value("fieldName"), Some("port"));
        assert_eq!(err.metadata().len(), 1);
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(ErrorCode::SystemConfiguration.http_status(), Some(500));
        assert_eq!(ErrorCode::ServiceUnavailable.http_status(), Some(503));
        assert_eq!(ErrorCode::Validation.http_status(), Some(400));
        assert_eq!(ErrorCode::IllegalState.http_status(), Some(409));
        assert_eq!(ErrorCode::AlreadyExists.http_status(), Some(409));
        assert_eq!(ErrorCode::NotFound.http_status(), Some(404));
        assert_eq!(ErrorCode::Io.http_status(), None);
    }

    #[test]
    fn test_code_serializes_kebab_case() {
        let json = serde_json::to_string(&ErrorCode::SystemConfiguration).unwrap();
        assert_eq!(json, "\"system-configuration\"");
        assert_eq!(ErrorCode::NotFound.value(), 7);
    }
}
