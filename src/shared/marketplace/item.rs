//! Item Data Structure
//!
//! Represents a listed good. Items start `active`, become `swapped` when a
//! swap that references them is accepted and may be withdrawn by the owner
//! (`cancelled`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shared::error::SharedError;

/// Lifecycle of a listing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Available for swaps and purchases
    #[default]
    Active,
    /// Exchanged through an accepted swap
    Swapped,
    /// Withdrawn by the owner
    Cancelled,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Active => "active",
            ItemStatus::Swapped => "swapped",
            ItemStatus::Cancelled => "cancelled",
        }
    }
}

/// Physical condition of an item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ItemCondition {
    New,
    LikeNew,
    #[default]
    Good,
    Fair,
    Poor,
}

impl ItemCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCondition::New => "new",
            ItemCondition::LikeNew => "like-new",
            ItemCondition::Good => "good",
            ItemCondition::Fair => "fair",
            ItemCondition::Poor => "poor",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "new" => Some(ItemCondition::New),
            "like-new" => Some(ItemCondition::LikeNew),
            "good" => Some(ItemCondition::Good),
            "fair" => Some(ItemCondition::Fair),
            "poor" => Some(ItemCondition::Poor),
            _ => None,
        }
    }

    /// Popularity bonus granted for the condition
    pub fn bonus(&self) -> f64 {
        match self {
            ItemCondition::New => 10.0,
            ItemCondition::LikeNew => 8.0,
            ItemCondition::Good => 5.0,
            ItemCondition::Fair | ItemCondition::Poor => 0.0,
        }
    }
}

/// A listed item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub owner_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub category: String,
    pub price: f64,
    #[serde(default)]
    pub condition: ItemCondition,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Value>,
    #[serde(default)]
    pub verification_required: bool,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub verification_status: String,
    #[serde(default)]
    pub status: ItemStatus,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub offers: u64,
    #[serde(default, with = "crate::shared::time::optional", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::shared::time::optional", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Shortest accepted title, in characters
pub const MIN_TITLE_CHARS: usize = 3;

/// Lowest accepted listing price
pub const MIN_PRICE: f64 = 1000.0;

/// Check the listing rules shared by `listItem` and `updateItem`
///
/// Fields that are `None` are not checked, so partial updates can reuse the
/// same rules.
pub fn validate_listing(
    title: Option<&str>,
    price: Option<f64>,
    category: Option<&str>,
) -> Result<(), SharedError> {
    if let Some(title) = title {
        if title.trim().chars().count() < MIN_TITLE_CHARS {
            return Err(SharedError::validation(
                "title",
                "INVALID_TITLE",
                "Title must be at least 3 characters",
            ));
        }
    }
    if let Some(price) = price {
        if !price.is_finite() || price < MIN_PRICE {
            return Err(SharedError::validation(
                "price",
                "INVALID_PRICE",
                "Price must be at least ₹1000",
            ));
        }
    }
    if let Some(category) = category {
        if category.trim().is_empty() {
            return Err(SharedError::validation(
                "category",
                "MISSING_CATEGORY",
                "Category is required",
            ));
        }
    }
    Ok(())
}

impl Item {
    pub fn is_active(&self) -> bool {
        self.status == ItemStatus::Active
    }

    pub fn is_owned_by(&self, uid: &str) -> bool {
        self.owner_id == uid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_condition_wire_names() {
        assert_eq!(serde_json::to_value(ItemCondition::LikeNew).unwrap(), json!("like-new"));
        assert_eq!(ItemCondition::from_str("Like-New"), Some(ItemCondition::LikeNew));
        assert_eq!(ItemCondition::from_str("mint"), None);
    }

    #[test]
    fn test_item_defaults_when_fields_missing() {
        let item: Item = serde_json::from_value(json!({
            "id": "i1",
            "ownerId": "u1",
            "title": "Bike",
            "category": "sports",
            "price": 1500
        }))
        .unwrap();

        assert_eq!(item.status, ItemStatus::Active);
        assert_eq!(item.condition, ItemCondition::Good);
        assert_eq!(item.views, 0);
        assert!(item.is_owned_by("u1"));
        assert!(item.created_at.is_none());
    }

    #[test]
    fn test_listing_rules() {
        assert!(validate_listing(Some("Bike"), Some(1500.0), Some("sports")).is_ok());
        assert_eq!(
            validate_listing(Some("Bi"), Some(1500.0), Some("sports")).unwrap_err().code(),
            "INVALID_TITLE"
        );
        assert_eq!(
            validate_listing(Some("Bike"), Some(500.0), Some("sports")).unwrap_err().code(),
            "INVALID_PRICE"
        );
        assert_eq!(
            validate_listing(Some("Bike"), Some(1000.0), Some(" ")).unwrap_err().code(),
            "MISSING_CATEGORY"
        );
        assert!(validate_listing(None, None, None).is_ok());
    }

    #[test]
    fn test_empty_id_is_not_stored() {
        let item = Item {
            owner_id: "u1".into(),
            title: "Lamp".into(),
            category: "home".into(),
            price: 2000.0,
            ..Default::default()
        };
        let value = serde_json::to_value(&item).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["ownerId"], "u1");
        assert_eq!(value["status"], "active");
    }
}
