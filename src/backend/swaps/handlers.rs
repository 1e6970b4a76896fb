/**
 * Swap HTTP Handlers
 *
 * # Atomicity
 *
 * Every state change is a single `WriteBatch`:
 *
 * - **propose** - swap document, `offers` counter, analytics event and the
 *   receiver's notification; guarded on both items still being active
 * - **accept** - swap status, both item statuses, two delivery legs and one
 *   notification per party; guarded on the swap still being pending and
 *   both items still being active
 * - **decline** - swap status and the proposer's notification; guarded on
 *   the swap still being pending
 *
 * When two requests race, the loser's guard fails and nothing it staged is
 * written. Pushes go out only after a successful commit.
 */

use axum::{extract::State, Json};
use serde_json::{json, Value};

use super::types::{ProposeSwapRequest, SwapIdRequest};
use super::workflow::{check_proposal, check_response, delivery_legs, net_amount, SwapRejection};
use crate::backend::catalog::handlers::load_item;
use crate::backend::error::{ApiError, ApiResult};
use crate::backend::extract::{required, Payload};
use crate::backend::middleware::AuthUser;
use crate::backend::notifications::{NewNotification, NotificationDispatcher};
use crate::backend::server::state::AppState;
use crate::backend::store::{
    get_as, new_document_id, query_as, Direction, DocumentStore, Patch, Query, StoreError,
    WriteBatch,
};
use crate::shared::collections;
use crate::shared::{AnalyticsEvent, AnalyticsKind, ItemStatus, NotificationType, Swap, SwapStatus};

async fn load_swap(store: &dyn DocumentStore, swap_id: &str) -> ApiResult<Swap> {
    get_as::<Swap>(store, collections::SWAPS, swap_id)
        .await?
        .ok_or_else(|| ApiError::not_found("SWAP_NOT_FOUND", "Swap not found"))
}

/// Map a failed batch guard back to the rule it enforced
///
/// Guards on the swap document check its status; guards on items check that
/// they are still active.
fn rejection_for(err: StoreError) -> ApiError {
    match err {
        StoreError::PreconditionFailed { collection, id, .. } => {
            tracing::warn!(%collection, %id, "Swap batch lost a race");
            if collection == collections::SWAPS {
                SwapRejection::InvalidStatus.into()
            } else {
                SwapRejection::InactiveItems.into()
            }
        }
        other => other.into(),
    }
}

/// Propose exchanging one of the caller's items for someone else's
///
/// # Returns
///
/// The created swap including its id
///
/// # Errors
///
/// * `400 MISSING_ITEMS` - Either item id is missing
/// * `404 ITEM_NOT_FOUND` - Either item does not exist
/// * `403 NOT_OWNER` - The caller does not own the offered item
/// * `400 SELF_SWAP` - The caller owns the requested item
/// * `400 INACTIVE_ITEMS` - Either item is no longer active
pub async fn propose_swap(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(request): Payload<ProposeSwapRequest>,
) -> ApiResult<Json<Swap>> {
    let offered_id = required(request.item_offered_id, "MISSING_ITEMS", "Missing item IDs")?;
    let requested_id = required(request.item_requested_id, "MISSING_ITEMS", "Missing item IDs")?;

    let store = app_state.store.as_ref();
    let (offered, requested) =
        futures_util::try_join!(load_item(store, &offered_id), load_item(store, &requested_id))?;

    check_proposal(&offered, &requested, &user.uid)?;

    let mut swap = Swap {
        id: String::new(),
        item_offered_id: offered_id.clone(),
        item_requested_id: requested_id.clone(),
        item_offered_title: offered.title.clone(),
        item_requested_title: requested.title.clone(),
        offered_by_user_id: user.uid.clone(),
        requested_from_user_id: requested.owner_id.clone(),
        net_amount: net_amount(&offered, &requested),
        message: request.message.unwrap_or_default(),
        status: SwapStatus::Pending,
        ..Default::default()
    };
    let swap_id = new_document_id();

    let mut event = AnalyticsEvent::new(AnalyticsKind::SwapProposed);
    event.swap_id = Some(swap_id.clone());
    event.offered_by_user_id = Some(user.uid.clone());
    event.requested_from_user_id = Some(requested.owner_id.clone());

    let active = ItemStatus::Active.as_str();
    let mut batch = WriteBatch::new();
    batch
        .require(collections::ITEMS, offered_id.clone(), "status", active)
        .require(collections::ITEMS, requested_id.clone(), "status", active)
        .create(
            collections::SWAPS,
            swap_id.clone(),
            Patch::from_document(&swap)?
                .server_timestamp("createdAt")
                .server_timestamp("updatedAt"),
        )
        .update(collections::ITEMS, requested_id.clone(), Patch::new().increment("offers", 1))
        .create(
            collections::ANALYTICS,
            new_document_id(),
            Patch::from_document(&event)?.server_timestamp("timestamp"),
        );
    let pending = NotificationDispatcher::stage(
        &mut batch,
        NewNotification::new(
            requested.owner_id.clone(),
            NotificationType::SwapProposed,
            "New Swap Offer",
            format!(
                "Someone wants to swap \"{}\" for your \"{}\"",
                offered.title, requested.title
            ),
        )
        .item(requested_id.clone(), requested.title.clone())
        .swap(swap_id.clone()),
    )?;

    let committed_at = store.commit(batch).await.map_err(rejection_for)?;
    app_state.notifier.deliver(&[pending]).await;

    tracing::info!(
        %swap_id,
        offered_by = %user.uid,
        requested_from = %requested.owner_id,
        net_amount = swap.net_amount,
        "Swap proposed"
    );

    swap.id = swap_id;
    swap.created_at = Some(committed_at);
    swap.updated_at = Some(committed_at);
    Ok(Json(swap))
}

/// Accept a pending swap addressed to the caller
///
/// # Errors
///
/// * `404 SWAP_NOT_FOUND` - No such swap
/// * `403 NOT_AUTHORIZED` - The caller is not the receiver
/// * `400 INVALID_STATUS` - The swap is no longer pending
/// * `400 INACTIVE_ITEMS` - Either item was swapped or withdrawn meanwhile
pub async fn accept_swap(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(request): Payload<SwapIdRequest>,
) -> ApiResult<Json<Value>> {
    let swap_id = required(request.swap_id, "MISSING_FIELDS", "swapId is required")?;
    let store = app_state.store.as_ref();
    let swap = load_swap(store, &swap_id).await?;
    check_response(&swap, &user.uid)?;

    let mut batch = WriteBatch::new();
    batch
        .require(collections::SWAPS, swap_id.clone(), "status", SwapStatus::Pending.as_str())
        .require(collections::ITEMS, swap.item_offered_id.clone(), "status", ItemStatus::Active.as_str())
        .require(collections::ITEMS, swap.item_requested_id.clone(), "status", ItemStatus::Active.as_str())
        .update(
            collections::SWAPS,
            swap_id.clone(),
            Patch::new()
                .set("status", SwapStatus::Accepted.as_str())
                .server_timestamp("acceptedAt")
                .server_timestamp("updatedAt"),
        );
    for item_id in [&swap.item_offered_id, &swap.item_requested_id] {
        batch.update(
            collections::ITEMS,
            item_id.clone(),
            Patch::new()
                .set("status", ItemStatus::Swapped.as_str())
                .server_timestamp("updatedAt"),
        );
    }
    for leg in delivery_legs(&swap) {
        batch.create(
            collections::DELIVERIES,
            new_document_id(),
            Patch::from_document(&leg)?
                .server_timestamp("createdAt")
                .server_timestamp("updatedAt"),
        );
    }

    let to_proposer = NotificationDispatcher::stage(
        &mut batch,
        NewNotification::new(
            swap.offered_by_user_id.clone(),
            NotificationType::SwapAccepted,
            "Swap Accepted!",
            "Your swap offer has been accepted. Proceed with delivery.",
        )
        .item(swap.item_offered_id.clone(), swap.item_offered_title.clone())
        .swap(swap_id.clone()),
    )?;
    let to_receiver = NotificationDispatcher::stage(
        &mut batch,
        NewNotification::new(
            swap.requested_from_user_id.clone(),
            NotificationType::SwapAccepted,
            "Swap Accepted!",
            "You accepted the swap offer. Proceed with delivery.",
        )
        .item(swap.item_requested_id.clone(), swap.item_requested_title.clone())
        .swap(swap_id.clone()),
    )?;

    store.commit(batch).await.map_err(rejection_for)?;
    app_state.notifier.deliver(&[to_proposer, to_receiver]).await;

    tracing::info!(%swap_id, receiver = %user.uid, "Swap accepted");
    Ok(Json(json!({ "success": true })))
}

/// Decline a pending swap addressed to the caller
///
/// # Errors
///
/// * `404 SWAP_NOT_FOUND` - No such swap
/// * `403 NOT_AUTHORIZED` - The caller is not the receiver
/// * `400 INVALID_STATUS` - The swap was already accepted or declined
pub async fn decline_swap(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(request): Payload<SwapIdRequest>,
) -> ApiResult<Json<Value>> {
    let swap_id = required(request.swap_id, "MISSING_FIELDS", "swapId is required")?;
    let store = app_state.store.as_ref();
    let swap = load_swap(store, &swap_id).await?;
    check_response(&swap, &user.uid)?;

    let mut batch = WriteBatch::new();
    batch
        .require(collections::SWAPS, swap_id.clone(), "status", SwapStatus::Pending.as_str())
        .update(
            collections::SWAPS,
            swap_id.clone(),
            Patch::new()
                .set("status", SwapStatus::Declined.as_str())
                .server_timestamp("declinedAt")
                .server_timestamp("updatedAt"),
        );
    let pending = NotificationDispatcher::stage(
        &mut batch,
        NewNotification::new(
            swap.offered_by_user_id.clone(),
            NotificationType::SwapDeclined,
            "Swap Declined",
            format!("Your offer for \"{}\" was declined.", swap.item_requested_title),
        )
        .item(swap.item_requested_id.clone(), swap.item_requested_title.clone())
        .swap(swap_id.clone()),
    )?;

    store.commit(batch).await.map_err(rejection_for)?;
    app_state.notifier.deliver(&[pending]).await;

    tracing::info!(%swap_id, receiver = %user.uid, "Swap declined");
    Ok(Json(json!({ "success": true })))
}

/// Swaps the caller proposed, followed by swaps addressed to them
pub async fn get_user_swaps(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<Swap>>> {
    let store = app_state.store.as_ref();
    let proposed = Query::collection(collections::SWAPS)
        .where_eq("offeredByUserId", user.uid.clone())
        .order_by("createdAt", Direction::Descending);
    let received = Query::collection(collections::SWAPS)
        .where_eq("requestedFromUserId", user.uid.clone())
        .order_by("createdAt", Direction::Descending);

    let (mut swaps, received): (Vec<Swap>, Vec<Swap>) =
        futures_util::try_join!(query_as(store, &proposed), query_as(store, &received))?;
    swaps.extend(received);

    Ok(Json(swaps))
}
