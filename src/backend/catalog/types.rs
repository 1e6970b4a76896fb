//! Request and response types for the catalog endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shared::{Item, ItemCondition};

/// Body of `POST /api/listItem`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItemRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub condition: Option<ItemCondition>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub location: Option<Value>,
    #[serde(default)]
    pub verification_required: bool,
}

/// Status values an owner may set directly
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OwnerStatus {
    Active,
    Cancelled,
}

/// Body of `POST /api/updateItem`
///
/// Only the fields present are changed. Ownership, counters and
/// verification state are not client-writable.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateItemRequest {
    pub item_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub condition: Option<ItemCondition>,
    pub tags: Option<Vec<String>>,
    pub location: Option<Value>,
    pub verification_required: Option<bool>,
    pub status: Option<OwnerStatus>,
}

/// Body carrying a single `itemId`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemIdRequest {
    pub item_id: Option<String>,
}

/// Query of `GET /api/getItems`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsQuery {
    pub owner_id: Option<String>,
}

/// Query of `GET /api/getItem`
#[derive(Debug, Default, Deserialize)]
pub struct ItemQuery {
    pub id: Option<String>,
}

/// Query of `GET /api/getItemRecommendations`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsQuery {
    pub item_id: Option<String>,
}

/// Query of `GET /api/searchItems`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub condition: Option<ItemCondition>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
    #[serde(default)]
    pub verified_only: bool,
}

#[derive(Debug, Serialize)]
pub struct SearchPagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub pages: usize,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub items: Vec<Item>,
    pub pagination: SearchPagination,
}

/// `getItem` result: the item plus a summary of its owner
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetails {
    #[serde(flatten)]
    pub item: Item,
    pub owner_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_photo: Option<String>,
}

/// Wishlist entry joined with the item, when it still exists
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub item_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Item>,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub success: bool,
    pub likes: u64,
    /// `false` when the caller had already liked the item
    pub created: bool,
}
