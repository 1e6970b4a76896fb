//! Notification HTTP Handlers
//!
//! Inbox endpoints under `users/{uid}/notifications` plus the device token
//! and out-of-band (email, SMS) channels. Email and SMS have no provider
//! behind them; the messages are logged.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use super::dispatcher::NewNotification;
use super::types::{
    EmailNotificationRequest, FcmTokenRequest, MarkAllReadResponse, MarkReadRequest,
    NotificationsQuery, NotificationsResponse, PageInfo, SendNotificationRequest,
    SendNotificationResponse, SmsNotificationRequest,
};
use crate::backend::error::{ApiError, ApiResult, StoreResultExt};
use crate::backend::extract::{required, Paging, Params, Payload};
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::backend::store::{get_as, query_json, Direction, Patch, Query, WriteBatch};
use crate::shared::collections::{self, user_sub};
use crate::shared::{NotificationType, UserProfile};

const DEFAULT_PAGE_SIZE: usize = 20;

/// Send a custom notification to any user
///
/// # Returns
///
/// `{ success, notificationId }`
///
/// # Errors
///
/// * `400 MISSING_FIELDS` - No recipient or no title
pub async fn send_notification(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(request): Payload<SendNotificationRequest>,
) -> ApiResult<Json<SendNotificationResponse>> {
    let recipient = required(request.user_id, "MISSING_FIELDS", "Recipient userId is required")?;
    let title = required(request.title, "MISSING_FIELDS", "Title is required")?;

    let mut notification = NewNotification::new(
        recipient.clone(),
        request.kind.unwrap_or(NotificationType::Custom),
        title,
        request.message.unwrap_or_default(),
    );
    notification.item_id = request.item_id;
    notification.item_title = request.item_title;
    notification.swap_id = request.swap_id;
    if let Some(data) = request.data {
        notification = notification.data(data);
    }
    if let Some(priority) = request.priority {
        notification = notification.priority(priority);
    }

    let notification_id = app_state.notifier.send(notification).await?;
    tracing::info!(sender = %user.uid, %recipient, %notification_id, "Notification sent");

    Ok(Json(SendNotificationResponse {
        success: true,
        notification_id,
    }))
}

/// List the caller's notifications, newest first
pub async fn get_notifications(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Params(query): Params<NotificationsQuery>,
) -> ApiResult<Json<NotificationsResponse>> {
    let paging = Paging::new(query.page, query.limit, DEFAULT_PAGE_SIZE);
    let inbox = user_sub(&user.uid, collections::NOTIFICATIONS);

    let mut listing = Query::collection(inbox.clone())
        .order_by("timestamp", Direction::Descending)
        .offset(paging.offset())
        .limit(paging.limit);
    if query.unread_only {
        listing = listing.where_eq("isRead", false);
    }
    let unread = Query::collection(inbox).where_eq("isRead", false);

    let store = app_state.store.as_ref();
    let (notifications, unread_count) =
        futures_util::try_join!(query_json(store, &listing), store.count(&unread))?;

    Ok(Json(NotificationsResponse {
        notifications,
        unread_count,
        pagination: PageInfo {
            page: paging.page,
            limit: paging.limit,
        },
    }))
}

/// Mark one notification as read
///
/// # Errors
///
/// * `404 NOTIFICATION_NOT_FOUND` - No such notification in the caller's inbox
pub async fn mark_notification_read(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(request): Payload<MarkReadRequest>,
) -> ApiResult<Json<Value>> {
    let notification_id = required(request.notification_id, "MISSING_FIELDS", "notificationId is required")?;

    let mut batch = WriteBatch::new();
    batch.update(
        user_sub(&user.uid, collections::NOTIFICATIONS),
        notification_id,
        Patch::new().set("isRead", true),
    );
    app_state
        .store
        .commit(batch)
        .await
        .or_not_found("NOTIFICATION_NOT_FOUND", "Notification not found")?;

    Ok(Json(json!({ "success": true })))
}

/// Mark every unread notification as read in one batch
pub async fn mark_all_notifications_read(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<MarkAllReadResponse>> {
    let inbox = user_sub(&user.uid, collections::NOTIFICATIONS);
    let unread = app_state
        .store
        .query(&Query::collection(inbox.clone()).where_eq("isRead", false))
        .await?;

    let mut batch = WriteBatch::new();
    for snapshot in &unread {
        batch.update(inbox.clone(), snapshot.id.clone(), Patch::new().set("isRead", true));
    }
    if !batch.is_empty() {
        app_state.store.commit(batch).await?;
    }

    tracing::debug!(uid = %user.uid, updated = unread.len(), "Marked notifications read");
    Ok(Json(MarkAllReadResponse {
        success: true,
        updated: unread.len(),
    }))
}

/// Register the caller's push device token
///
/// # Errors
///
/// * `404 USER_NOT_FOUND` - The caller has no profile yet
pub async fn update_fcm_token(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(request): Payload<FcmTokenRequest>,
) -> ApiResult<Json<Value>> {
    let token = required(request.fcm_token, "MISSING_FIELDS", "fcmToken is required")?;

    let mut batch = WriteBatch::new();
    batch.update(
        collections::USERS,
        user.uid.clone(),
        Patch::new().set("fcmToken", token).server_timestamp("updatedAt"),
    );
    app_state
        .store
        .commit(batch)
        .await
        .or_not_found("USER_NOT_FOUND", "User not found")?;

    Ok(Json(json!({ "success": true })))
}

async fn load_recipient(app_state: &AppState, user_id: Option<String>) -> ApiResult<UserProfile> {
    let user_id = required(user_id, "MISSING_FIELDS", "userId is required")?;
    get_as::<UserProfile>(app_state.store.as_ref(), collections::USERS, &user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("USER_NOT_FOUND", "User not found"))
}

pub async fn send_email_notification(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(request): Payload<EmailNotificationRequest>,
) -> ApiResult<Json<Value>> {
    let recipient = load_recipient(&app_state, request.user_id).await?;

    tracing::info!(
        sender = %user.uid,
        to = recipient.email.as_deref().unwrap_or(""),
        subject = request.subject.as_deref().unwrap_or(""),
        "Email notification (no provider configured): {}",
        request.body.unwrap_or_default()
    );
    Ok(Json(json!({ "success": true })))
}

pub async fn send_sms_notification(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Payload(request): Payload<SmsNotificationRequest>,
) -> ApiResult<Json<Value>> {
    let recipient = load_recipient(&app_state, request.user_id).await?;

    tracing::info!(
        sender = %user.uid,
        to = recipient.phone_number.as_deref().unwrap_or(""),
        "SMS notification (no provider configured): {}",
        request.message.unwrap_or_default()
    );
    Ok(Json(json!({ "success": true })))
}
