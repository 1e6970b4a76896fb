//! Delivery Data Structure
//!
//! A delivery tracks one physical hand-off. Swap deliveries name the sender
//! and receiver (`fromUserId`/`toUserId`); order deliveries name the buyer
//! and seller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Delivery progress
///
/// Couriers report free-text statuses too, so unknown values are kept
/// verbatim instead of being rejected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    InTransit,
    Delivered,
    Cancelled,
    #[serde(untagged)]
    Other(String),
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Confirmed => "confirmed",
            DeliveryStatus::Shipped => "shipped",
            DeliveryStatus::InTransit => "in_transit",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Cancelled => "cancelled",
            DeliveryStatus::Other(status) => status,
        }
    }

    /// Whether the hand-off is over and can no longer change
    pub fn is_final(&self) -> bool {
        matches!(self, DeliveryStatus::Delivered | DeliveryStatus::Cancelled)
    }
}

/// Shipping tier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    #[default]
    Standard,
    Premium,
    Express,
}

impl DeliveryMethod {
    pub fn base_cost(&self) -> f64 {
        match self {
            DeliveryMethod::Standard => 50.0,
            DeliveryMethod::Premium => 100.0,
            DeliveryMethod::Express => 150.0,
        }
    }

    pub fn estimated_days(&self) -> i64 {
        match self {
            DeliveryMethod::Standard => 7,
            DeliveryMethod::Premium => 3,
            DeliveryMethod::Express => 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub item_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<String>,
    #[serde(default)]
    pub status: DeliveryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_method: Option<DeliveryMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    #[serde(default, with = "crate::shared::time::optional", skip_serializing_if = "Option::is_none")]
    pub estimated_delivery: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::shared::time::optional", skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::shared::time::optional", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::shared::time::optional", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Delivery {
    /// Whether `uid` takes part in the hand-off in any role
    pub fn involves(&self, uid: &str) -> bool {
        [&self.from_user_id, &self.to_user_id, &self.buyer_id, &self.seller_id]
            .into_iter()
            .any(|party| party.as_deref() == Some(uid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_free_text_status_is_preserved() {
        let status: DeliveryStatus = serde_json::from_value(json!("handed_to_courier")).unwrap();
        assert_eq!(status, DeliveryStatus::Other("handed_to_courier".into()));
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("handed_to_courier"));

        let known: DeliveryStatus = serde_json::from_value(json!("in_transit")).unwrap();
        assert_eq!(known, DeliveryStatus::InTransit);
    }

    #[test]
    fn test_involves_every_role() {
        let swap_leg = Delivery {
            from_user_id: Some("a".into()),
            to_user_id: Some("b".into()),
            ..Default::default()
        };
        assert!(swap_leg.involves("a"));
        assert!(swap_leg.involves("b"));
        assert!(!swap_leg.involves("c"));

        let order_leg = Delivery {
            buyer_id: Some("buyer".into()),
            seller_id: Some("seller".into()),
            ..Default::default()
        };
        assert!(order_leg.involves("seller"));
        assert!(!order_leg.involves("a"));
    }
}
