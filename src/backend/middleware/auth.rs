/**
 * Authentication Middleware
 *
 * Protects the API routes. Extracts the bearer token from the
 * `Authorization` header, verifies it through the configured
 * `IdentityVerifier` and attaches the caller identity to the request
 * extensions.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::backend::auth::Identity;
use crate::backend::error::ApiError;
use crate::backend::server::state::AppState;

/// Caller identity stored in request extensions
#[derive(Clone, Debug)]
pub struct AuthenticatedUser(pub Identity);

/// Authentication middleware
///
/// - Missing or non-`Bearer` header: 401 `AUTH_REQUIRED`
/// - Token that fails verification: 401 `INVALID_TOKEN`
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request).ok_or_else(|| {
        tracing::warn!(path = %request.uri().path(), "Missing or malformed Authorization header");
        ApiError::AuthRequired
    })?;

    let identity = app_state.identity.verify(token).await.map_err(|e| {
        tracing::warn!("Invalid token: {}", e);
        ApiError::InvalidToken
    })?;

    request.extensions_mut().insert(AuthenticatedUser(identity));

    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Axum extractor for the authenticated caller
///
/// Only valid on routes behind `auth_middleware`.
#[derive(Clone, Debug)]
pub struct AuthUser(pub Identity);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("AuthenticatedUser not found in request extensions");
                ApiError::AuthRequired
            })?;

        Ok(AuthUser(user.0))
    }
}
