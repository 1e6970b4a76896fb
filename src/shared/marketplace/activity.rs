//! Activity Records
//!
//! Append-only records used for aggregate statistics and recommendations:
//! analytics events, reviews, likes and recently viewed markers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsKind {
    ItemView,
    ProfileView,
    SwapProposed,
}

impl AnalyticsKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticsKind::ItemView => "item_view",
            AnalyticsKind::ProfileView => "profile_view",
            AnalyticsKind::SwapProposed => "swap_proposed",
        }
    }
}

/// An analytics event
///
/// For `profile_view` events `userId` is the profile owner and `viewerId`
/// the visitor; for `item_view` events `userId` is the viewer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AnalyticsKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offered_by_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_from_user_id: Option<String>,
    #[serde(default, with = "crate::shared::time::optional", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl AnalyticsEvent {
    pub fn new(kind: AnalyticsKind) -> Self {
        Self {
            id: String::new(),
            kind,
            user_id: None,
            item_id: None,
            viewer_id: None,
            viewer_name: None,
            swap_id: None,
            offered_by_user_id: None,
            requested_from_user_id: None,
            timestamp: None,
        }
    }
}

/// A rating left by one user for another
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub reviewer_id: String,
    pub target_user_id: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap_id: Option<String>,
    #[serde(default, with = "crate::shared::time::optional", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A like on an item, attributed to the item owner
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub user_id: String,
    pub item_id: String,
    pub target_user_id: String,
    #[serde(default)]
    pub item_title: String,
    #[serde(default, with = "crate::shared::time::optional", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Marker under `users/{uid}/recentViews/{itemId}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RecentView {
    pub item_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, with = "crate::shared::time::optional", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}
