/**
 * Error Conversion
 *
 * Turns `ApiError` into the JSON error envelope and lifts lower-layer errors
 * (store, boundary validation, extractor rejections) into `ApiError`.
 *
 * # Response Format
 *
 * ```json
 * {
 *   "error": "Error message",
 *   "code": "ERROR_CODE",
 *   "timestamp": "2024-05-01T12:00:00.000000Z",
 *   "details": "only for internal errors outside production"
 * }
 * ```
 */

use std::sync::OnceLock;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use crate::backend::error::types::ApiError;
use crate::backend::store::StoreError;
use crate::shared::time::format_timestamp;
use crate::shared::SharedError;

static PRODUCTION: OnceLock<bool> = OnceLock::new();

/// Record whether internal error details must be hidden
///
/// Only the first call has an effect.
pub fn set_production(production: bool) {
    let _ = PRODUCTION.set(production);
}

pub fn is_production() -> bool {
    PRODUCTION.get().copied().unwrap_or(false)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let mut body = serde_json::json!({
            "error": self.message(),
            "code": self.code(),
            "timestamp": format_timestamp(&Utc::now()),
        });

        if let ApiError::Internal { details } = &self {
            tracing::error!("Internal error: {}", details);
            if !is_production() {
                body["details"] = serde_json::Value::String(details.clone());
            }
        }

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::internal(err.to_string())
    }
}

/// Map the store errors a workflow expects onto domain error codes
///
/// Everything not named here still becomes an internal error.
pub trait StoreResultExt<T> {
    /// `StoreError::NotFound` (an update on a missing document) becomes a 404
    fn or_not_found(self, code: &'static str, message: &str) -> Result<T, ApiError>;

    /// `StoreError::PreconditionFailed` (a batch guard did not hold) becomes
    /// an `InvalidState` error
    fn or_invalid_state(self, code: &'static str, message: &str) -> Result<T, ApiError>;
}

impl<T> StoreResultExt<T> for Result<T, StoreError> {
    fn or_not_found(self, code: &'static str, message: &str) -> Result<T, ApiError> {
        self.map_err(|err| match err {
            StoreError::NotFound { .. } => ApiError::not_found(code, message),
            other => other.into(),
        })
    }

    fn or_invalid_state(self, code: &'static str, message: &str) -> Result<T, ApiError> {
        self.map_err(|err| match err {
            StoreError::PreconditionFailed { collection, id, field } => {
                tracing::warn!(%collection, %id, %field, "Batch precondition failed");
                ApiError::invalid_state(code, message)
            }
            other => other.into(),
        })
    }
}

impl From<SharedError> for ApiError {
    fn from(err: SharedError) -> Self {
        ApiError::validation(err.code(), err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!("Rejected request body: {}", rejection.body_text());
        ApiError::validation("INVALID_REQUEST", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::warn!("Rejected query string: {}", rejection.body_text());
        ApiError::validation("INVALID_REQUEST", rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_envelope_shape() {
        let response = ApiError::validation("INVALID_TITLE", "Title must be at least 3 characters")
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["code"], "INVALID_TITLE");
        assert_eq!(body["error"], "Title must be at least 3 characters");
        assert!(body["timestamp"].is_string());
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_internal_error_includes_details_outside_production() {
        let response = ApiError::from(StoreError::NotAnObject).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["code"], "INTERNAL_ERROR");
        assert_eq!(body["error"], "Internal server error");
        assert!(body["details"].as_str().unwrap().contains("JSON object"));
    }

    #[test]
    fn test_store_result_mapping() {
        let missing: Result<(), StoreError> = Err(StoreError::NotFound {
            collection: "users".into(),
            id: "u1".into(),
        });
        assert_eq!(
            missing.or_not_found("USER_NOT_FOUND", "User not found").unwrap_err().code(),
            "USER_NOT_FOUND"
        );

        let raced: Result<(), StoreError> = Err(StoreError::PreconditionFailed {
            collection: "swaps".into(),
            id: "s1".into(),
            field: "status".into(),
        });
        let error = raced.or_invalid_state("INVALID_STATUS", "Swap is no longer pending").unwrap_err();
        assert_eq!(error.code(), "INVALID_STATUS");
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);

        let other: Result<(), StoreError> = Err(StoreError::NotAnObject);
        assert_eq!(other.or_not_found("X", "x").unwrap_err().code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_shared_error_keeps_code() {
        let error: ApiError = SharedError::validation("price", "INVALID_PRICE", "too low").into();
        assert_eq!(error.code(), "INVALID_PRICE");
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }
}
