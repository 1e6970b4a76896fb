//! Saved Delivery Locations
//!
//! Free-form address records under `users/{uid}/deliveryLocations`. Saving
//! with an existing `locationId` merges the new fields into it; saving
//! without one creates a new location.

use axum::{extract::State, Json};
use serde_json::{json, Map, Value};

use super::types::LocationIdRequest;
use crate::backend::error::ApiResult;
use crate::backend::extract::{required, Payload};
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::backend::store::{new_document_id, query_json, Patch, Query, WriteBatch};
use crate::shared::collections::{self, user_sub};

/// Returns the id the location was stored under
pub async fn save_location(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(mut fields): Payload<Map<String, Value>>,
) -> ApiResult<Json<Value>> {
    let location_id = match fields.remove("locationId") {
        Some(Value::String(id)) if !id.trim().is_empty() => id,
        _ => new_document_id(),
    };
    fields.remove("id");

    let patch = fields
        .into_iter()
        .fold(Patch::new(), |patch, (field, value)| patch.set(field, value))
        .server_timestamp("updatedAt");

    let mut batch = WriteBatch::new();
    batch.merge(
        user_sub(&user.uid, collections::DELIVERY_LOCATIONS),
        location_id.clone(),
        patch,
    );
    app_state.store.commit(batch).await?;

    Ok(Json(json!({ "success": true, "locationId": location_id })))
}

pub async fn get_locations(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<Value>>> {
    let query = Query::collection(user_sub(&user.uid, collections::DELIVERY_LOCATIONS));
    Ok(Json(query_json(app_state.store.as_ref(), &query).await?))
}

pub async fn delete_location(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(request): Payload<LocationIdRequest>,
) -> ApiResult<Json<Value>> {
    let location_id = required(request.location_id, "MISSING_FIELDS", "locationId is required")?;

    let mut batch = WriteBatch::new();
    batch.delete(user_sub(&user.uid, collections::DELIVERY_LOCATIONS), location_id);
    app_state.store.commit(batch).await?;

    Ok(Json(json!({ "success": true })))
}
