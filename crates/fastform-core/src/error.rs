//! Core error types for fastform.
//!
//! This module provides the error enum [`FastFormError`] covering
//! configuration, validation, submission, serialization, and IO failures,
//! plus the [`ValidationError`] produced by individual validators.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// A single validation failure reported by a validator.
///
/// Validation errors carry a human-readable message, a short machine code
/// (e.g. `"required"`, `"min"`), and optional parameters that were used to
/// build the message.
///
/// # Examples
///
/// ```
/// use fastform_core::error::ValidationError;
///
/// let err = ValidationError::new("Ensure this value has at least 3 characters.", "min")
///     .with_param("min", "3");
/// assert_eq!(err.code, "min");
/// assert_eq!(err.params.get("min").map(String::as_str), Some("3"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The error message shown to the user.
    pub message: String,
    /// A short code identifying the type of validation failure.
    pub code: String,
    /// Additional parameters providing context for the error message.
    pub params: HashMap<String, String>,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a message and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            params: HashMap::new(),
        }
    }

    /// Adds a parameter to this validation error.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// The primary error type for fastform.
///
/// Missing registrations are not errors: an
/// unregistered container or field type degrades rendering instead of
/// failing.
#[derive(Error, Debug)]
pub enum FastFormError {
    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── Validation ───────────────────────────────────────────────────

    /// A value failed validation.
    #[error("Validation error: {0}")]
    ValidationError(ValidationError),

    // ── Submission ───────────────────────────────────────────────────

    /// The caller's submit handler reported a failure.
    #[error("Submit failed: {0}")]
    SubmitError(String),

    /// The form owning a context has been unmounted.
    #[error("Form has been unmounted")]
    Unmounted,

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<ValidationError> for FastFormError {
    fn from(err: ValidationError) -> Self {
        Self::ValidationError(err)
    }
}

impl From<serde_json::Error> for FastFormError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// A convenience type alias for `Result<T, FastFormError>`.
pub type FastFormResult<T> = Result<T, FastFormError>;
