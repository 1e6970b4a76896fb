/**
 * Delivery HTTP Handlers
 *
 * Every endpoint that reads or changes a single delivery requires the caller
 * to be one of its parties (`fromUserId`, `toUserId`, `buyerId` or
 * `sellerId`). Delivered and cancelled deliveries are final.
 */

use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use super::pricing::{quote, CostQuote};
use super::types::{
    CancelDeliveryRequest, CreateDeliveryRequest, CreateDeliveryResponse, DeliveryCostRequest,
    DeliveryDetails, DeliveryQuery, DeliveryStatusResponse, UpdateAddressRequest,
    UpdateStatusRequest,
};
use crate::backend::error::{ApiError, ApiResult, StoreResultExt};
use crate::backend::extract::{required, Params, Payload};
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::backend::store::{
    get_as, new_document_id, query_as, Direction, DocumentStore, Patch, Query, WriteBatch,
};
use crate::shared::collections;
use crate::shared::{Delivery, DeliveryMethod, DeliveryStatus, Item, Order};

const HISTORY_LIMIT: usize = 20;
const DEFAULT_ESTIMATE_DAYS: i64 = 7;

fn not_authorized() -> ApiError {
    ApiError::forbidden("NOT_AUTHORIZED", "Not authorized to access this delivery")
}

/// Load a delivery the caller takes part in
async fn load_delivery(store: &dyn DocumentStore, delivery_id: &str, uid: &str) -> ApiResult<Delivery> {
    let delivery = get_as::<Delivery>(store, collections::DELIVERIES, delivery_id)
        .await?
        .ok_or_else(|| ApiError::not_found("DELIVERY_NOT_FOUND", "Delivery not found"))?;
    if !delivery.involves(uid) {
        tracing::warn!(%delivery_id, %uid, "Delivery access refused");
        return Err(not_authorized());
    }
    Ok(delivery)
}

fn ensure_open(delivery: &Delivery) -> ApiResult<()> {
    if delivery.status.is_final() {
        return Err(ApiError::invalid_state(
            "INVALID_STATUS",
            format!("Delivery is already {}", delivery.status.as_str()),
        ));
    }
    Ok(())
}

/// Create a delivery for one of the caller's orders
///
/// # Errors
///
/// * `404 ORDER_NOT_FOUND` - No such order
/// * `403 NOT_AUTHORIZED` - The caller is not the buyer
pub async fn create_delivery(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(request): Payload<CreateDeliveryRequest>,
) -> ApiResult<Json<CreateDeliveryResponse>> {
    let order_id = required(request.order_id, "MISSING_FIELDS", "orderId is required")?;
    let order = get_as::<Order>(app_state.store.as_ref(), collections::ORDERS, &order_id)
        .await?
        .ok_or_else(|| ApiError::not_found("ORDER_NOT_FOUND", "Order not found"))?;
    if order.buyer_id != user.uid {
        return Err(not_authorized());
    }

    let delivery = Delivery {
        order_id: Some(order_id.clone()),
        item_id: order.item_id.clone(),
        buyer_id: Some(user.uid.clone()),
        seller_id: Some(order.seller_id.clone()),
        status: DeliveryStatus::Pending,
        delivery_address: request.delivery_address,
        delivery_method: Some(request.delivery_method.unwrap_or_default()),
        estimated_delivery: Some(Utc::now() + Duration::days(DEFAULT_ESTIMATE_DAYS)),
        ..Default::default()
    };
    let delivery_id = new_document_id();

    let mut batch = WriteBatch::new();
    batch.create(
        collections::DELIVERIES,
        delivery_id.clone(),
        Patch::from_document(&delivery)?
            .server_timestamp("createdAt")
            .server_timestamp("updatedAt"),
    );
    app_state.store.commit(batch).await?;

    tracing::info!(%delivery_id, %order_id, "Delivery created");

    Ok(Json(CreateDeliveryResponse {
        success: true,
        delivery_id,
        message: "Delivery created successfully!".to_string(),
    }))
}

/// A delivery with details of the item being handed over
pub async fn get_delivery(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Params(query): Params<DeliveryQuery>,
) -> ApiResult<Json<DeliveryDetails>> {
    let delivery_id = required(query.delivery_id, "MISSING_FIELDS", "id is required")?;
    let store = app_state.store.as_ref();
    let delivery = load_delivery(store, &delivery_id, &user.uid).await?;
    let item_details = get_as::<Item>(store, collections::ITEMS, &delivery.item_id).await?;

    Ok(Json(DeliveryDetails {
        delivery,
        item_details,
    }))
}

pub async fn get_delivery_status(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Params(query): Params<DeliveryQuery>,
) -> ApiResult<Json<DeliveryStatusResponse>> {
    let delivery_id = required(query.delivery_id, "MISSING_FIELDS", "deliveryId is required")?;
    let delivery = load_delivery(app_state.store.as_ref(), &delivery_id, &user.uid).await?;

    Ok(Json(DeliveryStatusResponse {
        status: delivery.status,
        estimated_delivery: delivery.estimated_delivery,
        delivery_address: delivery.delivery_address,
        delivery_method: delivery.delivery_method,
    }))
}

pub async fn update_delivery_address(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(request): Payload<UpdateAddressRequest>,
) -> ApiResult<Json<Value>> {
    let delivery_id = required(request.delivery_id, "MISSING_FIELDS", "deliveryId is required")?;
    let address = request
        .address
        .ok_or_else(|| ApiError::validation("MISSING_FIELDS", "address is required"))?;
    let delivery = load_delivery(app_state.store.as_ref(), &delivery_id, &user.uid).await?;
    ensure_open(&delivery)?;

    let mut batch = WriteBatch::new();
    batch.update(
        collections::DELIVERIES,
        delivery_id,
        Patch::new()
            .set("deliveryAddress", address)
            .server_timestamp("updatedAt"),
    );
    app_state
        .store
        .commit(batch)
        .await
        .or_not_found("DELIVERY_NOT_FOUND", "Delivery not found")?;

    Ok(Json(json!({ "success": true })))
}

/// Move a delivery to a new status, optionally attaching a tracking number
///
/// Any status string is accepted; the well-known ones are `confirmed`,
/// `shipped`, `in_transit` and `delivered`.
pub async fn update_delivery_status(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(request): Payload<UpdateStatusRequest>,
) -> ApiResult<Json<Value>> {
    let delivery_id = required(request.delivery_id, "MISSING_FIELDS", "deliveryId is required")?;
    let status = match request.status {
        Some(DeliveryStatus::Other(raw)) if raw.trim().is_empty() => None,
        other => other,
    }
    .ok_or_else(|| ApiError::validation("MISSING_FIELDS", "status is required"))?;

    let store = app_state.store.as_ref();
    let delivery = load_delivery(store, &delivery_id, &user.uid).await?;
    ensure_open(&delivery)?;

    let mut patch = Patch::new()
        .set("status", status.as_str())
        .server_timestamp("updatedAt");
    if let Some(tracking) = request.tracking_number.filter(|t| !t.trim().is_empty()) {
        patch = patch.set("trackingNumber", tracking);
    }

    let mut batch = WriteBatch::new();
    batch
        .require(collections::DELIVERIES, delivery_id.clone(), "status", delivery.status.as_str())
        .update(collections::DELIVERIES, delivery_id.clone(), patch);
    store
        .commit(batch)
        .await
        .or_invalid_state("INVALID_STATUS", "Delivery changed concurrently, please retry")?;

    tracing::info!(
        %delivery_id,
        from = delivery.status.as_str(),
        to = status.as_str(),
        "Delivery status updated"
    );

    Ok(Json(json!({
        "success": true,
        "message": "Delivery status updated successfully!"
    })))
}

pub async fn cancel_delivery(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(request): Payload<CancelDeliveryRequest>,
) -> ApiResult<Json<Value>> {
    let delivery_id = required(request.delivery_id, "MISSING_FIELDS", "deliveryId is required")?;
    let store = app_state.store.as_ref();
    let delivery = load_delivery(store, &delivery_id, &user.uid).await?;
    ensure_open(&delivery)?;

    let mut batch = WriteBatch::new();
    batch
        .require(collections::DELIVERIES, delivery_id.clone(), "status", delivery.status.as_str())
        .update(
            collections::DELIVERIES,
            delivery_id.clone(),
            Patch::new()
                .set("status", DeliveryStatus::Cancelled.as_str())
                .set("cancellationReason", request.reason.unwrap_or_default())
                .server_timestamp("cancelledAt")
                .server_timestamp("updatedAt"),
        );
    store
        .commit(batch)
        .await
        .or_invalid_state("INVALID_STATUS", "Delivery changed concurrently, please retry")?;

    tracing::info!(%delivery_id, by = %user.uid, "Delivery cancelled");

    Ok(Json(json!({
        "success": true,
        "message": "Delivery cancelled successfully!"
    })))
}

/// Deliveries of the caller's purchases, newest first
pub async fn get_delivery_history(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<Delivery>>> {
    let query = Query::collection(collections::DELIVERIES)
        .where_eq("buyerId", user.uid)
        .order_by("createdAt", Direction::Descending)
        .limit(HISTORY_LIMIT);
    Ok(Json(query_as(app_state.store.as_ref(), &query).await?))
}

pub async fn calculate_delivery_cost(
    AuthUser(_user): AuthUser,
    Payload(request): Payload<DeliveryCostRequest>,
) -> ApiResult<Json<CostQuote>> {
    let weight = request.item_weight.unwrap_or(0.0);
    if !weight.is_finite() || weight < 0.0 {
        return Err(ApiError::validation("INVALID_WEIGHT", "itemWeight must be a non-negative number"));
    }
    let method: DeliveryMethod = request.delivery_method.unwrap_or_default();
    Ok(Json(quote(method, weight)))
}
