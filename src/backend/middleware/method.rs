//! Method gate: axum answers a known path with the wrong method with an
//! empty 405. This rewrites that response into the JSON error envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::backend::error::ApiError;

pub async fn method_not_allowed_envelope(response: Response) -> Response {
    if response.status() == StatusCode::METHOD_NOT_ALLOWED {
        return ApiError::MethodNotAllowed.into_response();
    }
    response
}
