//! Notification Data Structure
//!
//! Notifications live in `users/{uid}/notifications`. Only `isRead` is ever
//! mutated after creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    ItemListed,
    SwapProposed,
    SwapAccepted,
    SwapDeclined,
    NewOrder,
    Custom,
    #[serde(untagged)]
    Other(String),
}

impl Default for NotificationType {
    fn default() -> Self {
        NotificationType::Custom
    }
}

impl NotificationType {
    pub fn as_str(&self) -> &str {
        match self {
            NotificationType::ItemListed => "item_listed",
            NotificationType::SwapProposed => "swap_proposed",
            NotificationType::SwapAccepted => "swap_accepted",
            NotificationType::SwapDeclined => "swap_declined",
            NotificationType::NewOrder => "new_order",
            NotificationType::Custom => "custom",
            NotificationType::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationType,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default)]
    pub priority: NotificationPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default, with = "crate::shared::time::optional", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}
