//! Request and response types for the notification endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shared::{NotificationPriority, NotificationType};

/// Body of `POST /api/sendNotification`
///
/// Older clients address the recipient as `toUserId`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationRequest {
    #[serde(alias = "toUserId")]
    pub user_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<NotificationType>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub item_id: Option<String>,
    pub item_title: Option<String>,
    pub swap_id: Option<String>,
    pub priority: Option<NotificationPriority>,
    pub data: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationResponse {
    pub success: bool,
    pub notification_id: String,
}

/// Query of `GET /api/getNotifications`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Serialize)]
pub struct PageInfo {
    pub page: usize,
    pub limit: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationsResponse {
    pub notifications: Vec<Value>,
    pub unread_count: usize,
    pub pagination: PageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    pub notification_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MarkAllReadResponse {
    pub success: bool,
    pub updated: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FcmTokenRequest {
    pub fcm_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailNotificationRequest {
    pub user_id: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsNotificationRequest {
    pub user_id: Option<String>,
    pub message: Option<String>,
}
