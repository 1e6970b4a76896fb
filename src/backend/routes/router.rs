/**
 * Router Configuration
 *
 * Combines the API route table with the unauthenticated health check and
 * the router-wide layers.
 *
 * # Layers
 *
 * Outermost first:
 *
 * 1. `TraceLayer` - request span and latency logging
 * 2. `CorsLayer` - `CORS_ALLOW_ORIGIN`, or any origin when unset
 * 3. Method envelope - turns axum's bare 405 into the JSON error body
 */

use axum::{http::HeaderValue, middleware::map_response, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::backend::error::ApiError;
use crate::backend::middleware::method_not_allowed_envelope;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn unknown_route() -> ApiError {
    ApiError::not_found("NOT_FOUND", "Route not found")
}

fn cors_layer(allow_origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match allow_origin.and_then(|origin| HeaderValue::from_str(origin).ok()) {
        Some(origin) => layer.allow_origin(origin),
        None => layer.allow_origin(Any),
    }
}

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Application state shared by every handler
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new().route("/health", get(health));
    let router = configure_api_routes(router, &app_state);
    let cors = cors_layer(app_state.config.cors_allow_origin.as_deref());

    router
        .fallback(unknown_route)
        .layer(map_response(method_not_allowed_envelope))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
