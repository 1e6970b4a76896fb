/**
 * Order and Payment HTTP Handlers
 *
 * Each step of the pipeline commits as one batch guarded on the status it
 * expects, so replaying a request or racing two of them cannot move an order
 * or payment twice.
 *
 * Payment collection itself happens outside the backend: the client reports
 * the provider's transaction id through `verifyPayment`. Refund requests are
 * recorded for manual processing and do not reverse the order or delivery.
 */

use axum::{extract::State, Json};

use super::types::{
    BuyNowRequest, BuyNowResponse, InitializePaymentRequest, InitializePaymentResponse,
    PaymentQuery, PaymentStatusResponse, RefundRequest, RefundResponse, VerifyPaymentRequest,
};
use super::workflow::{
    check_payable, check_purchase, check_refundable, check_verifiable, order_total,
    OrderRejection,
};
use crate::backend::catalog::handlers::load_item;
use crate::backend::error::{ApiError, ApiResult};
use crate::backend::extract::{required, Params, Payload};
use crate::backend::middleware::AuthUser;
use crate::backend::notifications::{NewNotification, NotificationDispatcher};
use crate::backend::server::state::AppState;
use crate::backend::store::{
    get_as, new_document_id, query_as, Direction, DocumentStore, Patch, Query, StoreError,
    WriteBatch,
};
use crate::shared::collections;
use crate::shared::{
    Delivery, DeliveryStatus, ItemStatus, NotificationPriority, NotificationType, Order,
    OrderStatus, Payment, PaymentStatus, Refund, RefundStatus,
};

const PAYMENT_HISTORY_LIMIT: usize = 20;

async fn load_order(store: &dyn DocumentStore, order_id: &str) -> ApiResult<Order> {
    get_as::<Order>(store, collections::ORDERS, order_id)
        .await?
        .ok_or_else(|| ApiError::not_found("ORDER_NOT_FOUND", "Order not found"))
}

async fn load_payment(store: &dyn DocumentStore, payment_id: &str) -> ApiResult<Payment> {
    get_as::<Payment>(store, collections::PAYMENTS, payment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("PAYMENT_NOT_FOUND", "Payment not found"))
}

/// Translate a lost status guard into the rejection it stands for
fn guard_failed(err: StoreError, rejection: OrderRejection) -> ApiError {
    match err {
        StoreError::PreconditionFailed { collection, id, .. } => {
            tracing::warn!(%collection, %id, "Order batch lost a race");
            rejection.into()
        }
        other => other.into(),
    }
}

/// Place an order for an item
///
/// Creates the order and its pending delivery and tells the seller, all in
/// one commit.
///
/// # Errors
///
/// * `404 ITEM_NOT_FOUND` - No such item
/// * `400 SELF_PURCHASE` - The caller owns the item
/// * `400 ITEM_UNAVAILABLE` - The item is not active
/// * `400 INVALID_QUANTITY` - Quantity below 1
pub async fn process_buy_now(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(request): Payload<BuyNowRequest>,
) -> ApiResult<Json<BuyNowResponse>> {
    let item_id = required(request.item_id, "MISSING_FIELDS", "itemId is required")?;
    let quantity = request.quantity.unwrap_or(1);
    let store = app_state.store.as_ref();

    let item = load_item(store, &item_id).await?;
    check_purchase(&item, &user.uid, quantity)?;

    let order_id = new_document_id();
    let order = Order {
        buyer_id: user.uid.clone(),
        seller_id: item.owner_id.clone(),
        item_id: item_id.clone(),
        item_title: item.title.clone(),
        item_price: item.price,
        quantity,
        total_amount: order_total(item.price, quantity),
        status: OrderStatus::Pending,
        delivery_address: request.delivery_address.clone(),
        ..Default::default()
    };
    let delivery = Delivery {
        order_id: Some(order_id.clone()),
        item_id: item_id.clone(),
        buyer_id: Some(user.uid.clone()),
        seller_id: Some(item.owner_id.clone()),
        status: DeliveryStatus::Pending,
        delivery_address: request.delivery_address,
        ..Default::default()
    };

    let mut batch = WriteBatch::new();
    batch
        .require(collections::ITEMS, item_id.clone(), "status", ItemStatus::Active.as_str())
        .create(
            collections::ORDERS,
            order_id.clone(),
            Patch::from_document(&order)?
                .server_timestamp("createdAt")
                .server_timestamp("updatedAt"),
        )
        .create(
            collections::DELIVERIES,
            new_document_id(),
            Patch::from_document(&delivery)?
                .server_timestamp("createdAt")
                .server_timestamp("updatedAt"),
        );
    let pending = NotificationDispatcher::stage(
        &mut batch,
        NewNotification::new(
            item.owner_id.clone(),
            NotificationType::NewOrder,
            "New Order Received!",
            format!("Someone wants to buy your {}", item.title),
        )
        .item(item_id.clone(), item.title.clone())
        .order(order_id.clone())
        .priority(NotificationPriority::High),
    )?;

    store
        .commit(batch)
        .await
        .map_err(|e| guard_failed(e, OrderRejection::ItemUnavailable))?;
    app_state.notifier.deliver(&[pending]).await;

    tracing::info!(
        %order_id,
        buyer = %user.uid,
        seller = %item.owner_id,
        total = order.total_amount,
        "Order placed"
    );

    Ok(Json(BuyNowResponse {
        success: true,
        order_id,
        message: "Order placed successfully!".to_string(),
    }))
}

/// Open a payment for a pending order
///
/// # Errors
///
/// * `404 ORDER_NOT_FOUND` - No such order
/// * `403 NOT_AUTHORIZED` - The caller is not the buyer
/// * `400 INVALID_STATUS` - The order already has a payment
pub async fn initialize_payment(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(request): Payload<InitializePaymentRequest>,
) -> ApiResult<Json<InitializePaymentResponse>> {
    let order_id = required(request.order_id, "MISSING_FIELDS", "orderId is required")?;
    let payment_method = required(
        request.payment_method,
        "MISSING_FIELDS",
        "paymentMethod is required",
    )?;
    let store = app_state.store.as_ref();

    let order = load_order(store, &order_id).await?;
    check_payable(&order, &user.uid)?;

    let payment_id = new_document_id();
    let payment = Payment {
        order_id: order_id.clone(),
        buyer_id: user.uid.clone(),
        amount: order.total_amount,
        payment_method,
        status: PaymentStatus::Pending,
        ..Default::default()
    };

    let mut batch = WriteBatch::new();
    batch
        .require(collections::ORDERS, order_id.clone(), "status", OrderStatus::Pending.as_str())
        .create(
            collections::PAYMENTS,
            payment_id.clone(),
            Patch::from_document(&payment)?.server_timestamp("createdAt"),
        )
        .update(
            collections::ORDERS,
            order_id.clone(),
            Patch::new()
                .set("paymentId", payment_id.clone())
                .set("status", OrderStatus::PaymentPending.as_str())
                .server_timestamp("updatedAt"),
        );
    store
        .commit(batch)
        .await
        .map_err(|e| guard_failed(e, OrderRejection::OrderNotPending))?;

    tracing::info!(%order_id, %payment_id, amount = payment.amount, "Payment initialized");

    Ok(Json(InitializePaymentResponse {
        success: true,
        payment_id,
        amount: payment.amount,
    }))
}

/// Confirm a pending payment with the provider's transaction id
///
/// Marks the payment completed, the order paid and its delivery confirmed.
/// A delivery that was already delivered or cancelled is left alone.
///
/// # Errors
///
/// * `404 PAYMENT_NOT_FOUND` - No such payment
/// * `403 NOT_AUTHORIZED` - The caller is not the buyer
/// * `400 INVALID_STATUS` - The payment is not pending
pub async fn verify_payment(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(request): Payload<VerifyPaymentRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let payment_id = required(request.payment_id, "MISSING_FIELDS", "paymentId is required")?;
    let transaction_id = required(
        request.transaction_id,
        "MISSING_FIELDS",
        "transactionId is required",
    )?;
    let store = app_state.store.as_ref();

    let payment = load_payment(store, &payment_id).await?;
    check_verifiable(&payment, &user.uid)?;

    let delivery = Query::collection(collections::DELIVERIES)
        .where_eq("orderId", payment.order_id.clone())
        .limit(1);
    let delivery: Option<Delivery> = query_as(store, &delivery).await?.into_iter().next();

    let mut batch = WriteBatch::new();
    batch
        .require(collections::PAYMENTS, payment_id.clone(), "status", PaymentStatus::Pending.as_str())
        .update(
            collections::PAYMENTS,
            payment_id.clone(),
            Patch::new()
                .set("status", PaymentStatus::Completed.as_str())
                .set("transactionId", transaction_id)
                .server_timestamp("completedAt")
                .server_timestamp("updatedAt"),
        )
        .update(
            collections::ORDERS,
            payment.order_id.clone(),
            Patch::new()
                .set("status", OrderStatus::Paid.as_str())
                .server_timestamp("updatedAt"),
        );
    // Delivered or cancelled deliveries keep their status
    if let Some(delivery) = delivery.as_ref().filter(|d| !d.status.is_final()) {
        batch
            .require(collections::DELIVERIES, delivery.id.clone(), "status", delivery.status.as_str())
            .update(
                collections::DELIVERIES,
                delivery.id.clone(),
                Patch::new()
                    .set("status", DeliveryStatus::Confirmed.as_str())
                    .server_timestamp("updatedAt"),
            );
    }
    store.commit(batch).await.map_err(|e| match e {
        StoreError::PreconditionFailed { ref collection, .. } if collection == collections::DELIVERIES => {
            tracing::warn!(%payment_id, "Delivery changed while verifying payment");
            ApiError::invalid_state("CONFLICT", "Delivery changed while verifying payment, please retry")
        }
        other => guard_failed(other, OrderRejection::PaymentNotPending),
    })?;

    tracing::info!(%payment_id, order_id = %payment.order_id, "Payment verified");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Payment verified successfully!"
    })))
}

/// Current state of one of the caller's payments
pub async fn get_payment_status(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Params(query): Params<PaymentQuery>,
) -> ApiResult<Json<PaymentStatusResponse>> {
    let payment_id = required(query.payment_id, "MISSING_FIELDS", "paymentId is required")?;
    let payment = load_payment(app_state.store.as_ref(), &payment_id).await?;
    if payment.buyer_id != user.uid {
        return Err(OrderRejection::NotBuyer.into());
    }

    Ok(Json(PaymentStatusResponse {
        status: payment.status,
        amount: payment.amount,
        payment_method: payment.payment_method,
        created_at: payment.created_at,
    }))
}

/// Record a refund request against a payment
///
/// # Errors
///
/// * `404 PAYMENT_NOT_FOUND` - No such payment
/// * `403 NOT_AUTHORIZED` - The caller is not the buyer
/// * `400 REFUND_PENDING` - A refund was already requested
pub async fn process_refund(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(request): Payload<RefundRequest>,
) -> ApiResult<Json<RefundResponse>> {
    let payment_id = required(request.payment_id, "MISSING_FIELDS", "paymentId is required")?;
    let store = app_state.store.as_ref();

    let payment = load_payment(store, &payment_id).await?;
    check_refundable(&payment, &user.uid)?;

    let refund_id = new_document_id();
    let refund = Refund {
        payment_id: payment_id.clone(),
        order_id: payment.order_id.clone(),
        buyer_id: user.uid.clone(),
        amount: payment.amount,
        reason: request.reason.unwrap_or_default(),
        status: RefundStatus::Pending,
        ..Default::default()
    };

    let mut batch = WriteBatch::new();
    batch
        .require(collections::PAYMENTS, payment_id.clone(), "status", payment.status.as_str())
        .create(
            collections::REFUNDS,
            refund_id.clone(),
            Patch::from_document(&refund)?.server_timestamp("createdAt"),
        )
        .update(
            collections::PAYMENTS,
            payment_id.clone(),
            Patch::new()
                .set("status", PaymentStatus::RefundPending.as_str())
                .server_timestamp("updatedAt"),
        );
    store
        .commit(batch)
        .await
        .map_err(|e| guard_failed(e, OrderRejection::RefundPending))?;

    tracing::info!(%payment_id, %refund_id, amount = refund.amount, "Refund requested");

    Ok(Json(RefundResponse {
        success: true,
        refund_id,
        message: "Refund request submitted successfully!".to_string(),
    }))
}

/// The caller's most recent payments, newest first
pub async fn get_payment_history(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<Payment>>> {
    let query = Query::collection(collections::PAYMENTS)
        .where_eq("buyerId", user.uid)
        .order_by("createdAt", Direction::Descending)
        .limit(PAYMENT_HISTORY_LIMIT);
    let payments = query_as(app_state.store.as_ref(), &query).await?;
    Ok(Json(payments))
}
