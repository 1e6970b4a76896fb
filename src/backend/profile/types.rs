//! Request and response types for the profile endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::shared::UserProfile;

/// Body of `POST /api/createUserProfile`
///
/// Identity fields (`displayName`, `email`, `photoURL`) come from the
/// caller's token unless given here.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfileRequest {
    pub display_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<Value>,
    pub preferences: Option<Value>,
    pub fcm_token: Option<String>,
    pub verification_documents: Option<Vec<Value>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileWriteResponse {
    pub success: bool,
    pub created: bool,
    pub user: UserProfile,
}

/// Query carrying an optional `userId`; defaults to the caller
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: Option<String>,
}

/// A profile with a summary of recent activity
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDetails {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub recent_items: Vec<Value>,
    pub recent_swaps: Vec<Value>,
    pub verification: Option<Value>,
}

/// Body of `POST /api/updateSettings`
#[derive(Debug, Default, Deserialize)]
pub struct SettingsRequest {
    pub settings: Option<Map<String, Value>>,
}

/// Notification switches to change; absent switches keep their value
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_notifications: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_notifications: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms_notifications: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange_offers: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<bool>,
}

/// Body of `POST /api/updateNotificationSettings`
#[derive(Debug, Default, Deserialize)]
pub struct NotificationSettingsRequest {
    pub settings: Option<NotificationSettingsUpdate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_items: usize,
    pub total_swaps: usize,
    pub total_views: usize,
    pub total_likes: usize,
    pub rating: f64,
    pub total_reviews: usize,
    #[serde(default, with = "crate::shared::time::optional")]
    pub member_since: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::shared::time::optional")]
    pub last_active: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Swap,
    Like,
    View,
}

/// One entry of the activity feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub description: String,
    #[serde(default, with = "crate::shared::time::optional")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Body of `POST /api/submitReview`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReviewRequest {
    pub target_user_id: Option<String>,
    pub rating: Option<i64>,
    pub comment: Option<String>,
    pub swap_id: Option<String>,
}
