//! Wishlist Handlers
//!
//! Items a user wants to keep an eye on, stored under
//! `users/{uid}/wishlist/{itemId}`.

use axum::{extract::State, Json};
use futures_util::future::try_join_all;
use serde_json::{json, Value};

use super::handlers::load_item;
use super::types::{ItemIdRequest, WishlistItem};
use crate::backend::error::ApiResult;
use crate::backend::extract::{required, Payload};
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::backend::store::{get_as, query_as, Direction, Patch, Query, WriteBatch};
use crate::shared::collections::{self, user_sub};
use crate::shared::time::format_timestamp;
use crate::shared::{Item, WishlistEntry};

/// Add an existing item to the caller's wishlist
///
/// Adding the same item twice only refreshes `addedAt`.
pub async fn add_to_wishlist(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(request): Payload<ItemIdRequest>,
) -> ApiResult<Json<Value>> {
    let item_id = required(request.item_id, "MISSING_FIELDS", "itemId is required")?;
    load_item(app_state.store.as_ref(), &item_id).await?;

    let mut batch = WriteBatch::new();
    batch.set(
        user_sub(&user.uid, collections::WISHLIST),
        item_id.clone(),
        Patch::new().set("itemId", item_id).server_timestamp("addedAt"),
    );
    app_state.store.commit(batch).await?;

    Ok(Json(json!({ "success": true })))
}

pub async fn remove_from_wishlist(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(request): Payload<ItemIdRequest>,
) -> ApiResult<Json<Value>> {
    let item_id = required(request.item_id, "MISSING_FIELDS", "itemId is required")?;

    let mut batch = WriteBatch::new();
    batch.delete(user_sub(&user.uid, collections::WISHLIST), item_id);
    app_state.store.commit(batch).await?;

    Ok(Json(json!({ "success": true })))
}

/// The caller's wishlist, newest first, joined with the current items
///
/// Entries whose item was deleted are returned without `item`.
pub async fn get_wishlist(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<WishlistItem>>> {
    let store = app_state.store.as_ref();
    let entries: Vec<WishlistEntry> = query_as(
        store,
        &Query::collection(user_sub(&user.uid, collections::WISHLIST))
            .order_by("addedAt", Direction::Descending),
    )
    .await?;

    let items = try_join_all(
        entries
            .iter()
            .map(|entry| get_as::<Item>(store, collections::ITEMS, &entry.item_id)),
    )
    .await?;

    Ok(Json(
        entries
            .into_iter()
            .zip(items)
            .map(|(entry, item)| WishlistItem {
                item_id: entry.item_id,
                added_at: entry.added_at.as_ref().map(format_timestamp),
                item,
            })
            .collect(),
    ))
}
