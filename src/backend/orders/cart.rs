//! Cart Handlers
//!
//! Entries live under `users/{uid}/cart/{itemId}`; adding an item that is
//! already in the cart replaces its quantity.

use axum::{extract::State, Json};
use futures_util::future::try_join_all;
use serde_json::{json, Value};

use super::types::{CartItem, CartRequest};
use crate::backend::catalog::handlers::load_item;
use crate::backend::error::{ApiError, ApiResult};
use crate::backend::extract::{required, Payload};
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::backend::store::{get_as, query_as, Patch, Query, WriteBatch};
use crate::shared::collections::{self, user_sub};
use crate::shared::{CartEntry, Item};

pub async fn add_to_cart(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(request): Payload<CartRequest>,
) -> ApiResult<Json<Value>> {
    let item_id = required(request.item_id, "MISSING_FIELDS", "itemId is required")?;
    let quantity = request.quantity.unwrap_or(1);
    if quantity == 0 {
        return Err(ApiError::validation("INVALID_QUANTITY", "Quantity must be at least 1"));
    }
    load_item(app_state.store.as_ref(), &item_id).await?;

    let mut batch = WriteBatch::new();
    batch.merge(
        user_sub(&user.uid, collections::CART),
        item_id.clone(),
        Patch::new()
            .set("itemId", item_id)
            .set("quantity", quantity)
            .server_timestamp("addedAt"),
    );
    app_state.store.commit(batch).await?;

    Ok(Json(json!({ "success": true })))
}

pub async fn remove_from_cart(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(request): Payload<CartRequest>,
) -> ApiResult<Json<Value>> {
    let item_id = required(request.item_id, "MISSING_FIELDS", "itemId is required")?;

    let mut batch = WriteBatch::new();
    batch.delete(user_sub(&user.uid, collections::CART), item_id);
    app_state.store.commit(batch).await?;

    Ok(Json(json!({ "success": true })))
}

/// The caller's cart joined with current item details
///
/// Entries whose item no longer exists are left out.
pub async fn get_cart(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<CartItem>>> {
    let store = app_state.store.as_ref();
    let entries: Vec<CartEntry> =
        query_as(store, &Query::collection(user_sub(&user.uid, collections::CART))).await?;

    let items = try_join_all(
        entries
            .iter()
            .map(|entry| get_as::<Item>(store, collections::ITEMS, &entry.item_id)),
    )
    .await?;

    let cart = entries
        .into_iter()
        .zip(items)
        .filter_map(|(entry, item)| {
            item.map(|item| CartItem {
                item,
                quantity: entry.quantity,
                added_at: entry.added_at,
            })
        })
        .collect();

    Ok(Json(cart))
}
