//! Swap Data Structure
//!
//! A swap moves `pending -> accepted` or `pending -> declined`; both
//! outcomes are terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a swap proposal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SwapStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
}

impl SwapStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwapStatus::Pending => "pending",
            SwapStatus::Accepted => "accepted",
            SwapStatus::Declined => "declined",
        }
    }
}

/// A swap between two items owned by two users
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Swap {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub item_offered_id: String,
    pub item_requested_id: String,
    #[serde(default)]
    pub item_offered_title: String,
    #[serde(default)]
    pub item_requested_title: String,
    /// User who proposed the swap and owns the offered item
    pub offered_by_user_id: String,
    /// Owner of the requested item; the only user allowed to respond
    pub requested_from_user_id: String,
    /// Requested price minus offered price; positive means the proposer pays
    pub net_amount: f64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: SwapStatus,
    #[serde(default, with = "crate::shared::time::optional", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::shared::time::optional", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::shared::time::optional", skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::shared::time::optional", skip_serializing_if = "Option::is_none")]
    pub declined_at: Option<DateTime<Utc>>,
}

impl Swap {
    pub fn involves(&self, uid: &str) -> bool {
        self.offered_by_user_id == uid || self.requested_from_user_id == uid
    }
}
