/**
 * API Error Types
 *
 * `ApiError` is the single error type surfaced to HTTP clients.
 *
 * # Error Categories
 *
 * | Variant            | Status | Code                    |
 * |--------------------|--------|-------------------------|
 * | `AuthRequired`     | 401    | `AUTH_REQUIRED`         |
 * | `InvalidToken`     | 401    | `INVALID_TOKEN`         |
 * | `RateLimited`      | 429    | `RATE_LIMIT`            |
 * | `MethodNotAllowed` | 405    | `METHOD_NOT_ALLOWED`    |
 * | `Validation`       | 400    | field specific          |
 * | `NotFound`         | 404    | entity specific         |
 * | `Forbidden`        | 403    | `FORBIDDEN`, `NOT_OWNER`, `NOT_AUTHORIZED` |
 * | `InvalidState`     | 400    | `INVALID_STATUS`, ...   |
 * | `Internal`         | 500    | `INTERNAL_ERROR`        |
 */

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No bearer credential on the request
    #[error("Authentication required")]
    AuthRequired,

    /// The credential did not verify
    #[error("Invalid authentication token")]
    InvalidToken,

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Missing or invalid request field
    #[error("{message}")]
    Validation { code: &'static str, message: String },

    #[error("{message}")]
    NotFound { code: &'static str, message: String },

    /// Ownership or participant check failed
    #[error("{message}")]
    Forbidden { code: &'static str, message: String },

    /// The entity is not in a state that permits the operation
    #[error("{message}")]
    InvalidState { code: &'static str, message: String },

    /// Anything unexpected; `details` is only shown outside production
    #[error("Internal server error")]
    Internal { details: String },
}

impl ApiError {
    /// Create a validation error
    ///
    /// # Arguments
    ///
    /// * `code` - Machine-readable code, e.g. `INVALID_TITLE`
    /// * `message` - Human-readable message
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            message: message.into(),
        }
    }

    pub fn forbidden(code: &'static str, message: impl Into<String>) -> Self {
        Self::Forbidden {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_state(code: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidState {
            code,
            message: message.into(),
        }
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::Internal {
            details: details.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthRequired | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Validation { .. } | Self::InvalidState { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::AuthRequired => "AUTH_REQUIRED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::RateLimited => "RATE_LIMIT",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::Validation { code, .. }
            | Self::NotFound { code, .. }
            | Self::Forbidden { code, .. }
            | Self::InvalidState { code, .. } => code,
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_mapping() {
        assert_eq!(ApiError::AuthRequired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::RateLimited.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            ApiError::invalid_state("INVALID_STATUS", "Swap is not pending").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::forbidden("NOT_OWNER", "nope").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::internal("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_codes() {
        assert_eq!(ApiError::RateLimited.code(), "RATE_LIMIT");
        assert_eq!(ApiError::validation("INVALID_PRICE", "too cheap").code(), "INVALID_PRICE");
        assert_eq!(ApiError::not_found("SWAP_NOT_FOUND", "Swap not found").code(), "SWAP_NOT_FOUND");
        assert_eq!(ApiError::internal("db down").code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_internal_message_hides_details() {
        let error = ApiError::internal("connection refused");
        assert_eq!(error.message(), "Internal server error");
    }
}
