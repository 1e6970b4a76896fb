//! Shared Error Types
//!
//! This module defines the errors raised while validating request payloads
//! before any domain logic runs. They carry the machine-readable code that is
//! returned to the client.
//!
//! # Error Categories
//!
//! - `ValidationError` - A field is missing or violates a listing rule
//!
//! # Usage
//!
//! ```rust
//! use swapin::shared::error::SharedError;
//!
//! let error = SharedError::validation("price", "INVALID_PRICE", "Price must be at least 1000");
//! assert_eq!(error.code(), "INVALID_PRICE");
//! ```
use thiserror::Error;

/// Errors produced by boundary validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SharedError {
    /// Data validation error
    #[error("{message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Machine-readable code, e.g. `INVALID_TITLE`
        code: &'static str,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new validation error
    pub fn validation(
        field: impl Into<String>,
        code: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::ValidationError {
            field: field.into(),
            code,
            message: message.into(),
        }
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::ValidationError { code, .. } => code,
        }
    }
}
