/**
 * Rate Limit Middleware
 *
 * Keys the limiter by the authenticated uid, falling back to the first
 * `X-Forwarded-For` address. Limiter failures let the request through with
 * a warning.
 */

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use super::auth::AuthenticatedUser;
use crate::backend::error::ApiError;
use crate::backend::ratelimit::RateDecision;
use crate::backend::server::state::AppState;

pub async fn rate_limit_middleware(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = caller_key(&request);

    match app_state.rate_limiter.try_acquire(&key, Utc::now()).await {
        Ok(RateDecision::Allowed { remaining }) => {
            tracing::trace!(key = %key, remaining, "Rate limit check passed");
        }
        Ok(RateDecision::Limited) => {
            tracing::warn!(key = %key, "Rate limit exceeded");
            return Err(ApiError::RateLimited);
        }
        Err(e) => {
            tracing::warn!(key = %key, "Rate limiter unavailable, allowing request: {}", e);
        }
    }

    Ok(next.run(request).await)
}

fn caller_key(request: &Request) -> String {
    if let Some(user) = request.extensions().get::<AuthenticatedUser>() {
        return format!("uid:{}", user.0.uid);
    }
    let ip = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .unwrap_or("unknown");
    format!("ip:{ip}")
}
