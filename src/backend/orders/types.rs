//! Request and response types for orders, payments and the cart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shared::{Item, PaymentStatus};

/// Body of `POST /api/processBuyNow`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyNowRequest {
    pub item_id: Option<String>,
    pub quantity: Option<u32>,
    pub delivery_address: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyNowResponse {
    pub success: bool,
    pub order_id: String,
    pub message: String,
}

/// Body of `POST /api/initializePayment`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializePaymentRequest {
    pub order_id: Option<String>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializePaymentResponse {
    pub success: bool,
    pub payment_id: String,
    pub amount: f64,
}

/// Body of `POST /api/verifyPayment`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub payment_id: Option<String>,
    pub transaction_id: Option<String>,
}

/// Body of `POST /api/processRefund`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
    pub payment_id: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundResponse {
    pub success: bool,
    pub refund_id: String,
    pub message: String,
}

/// Query of `GET /api/getPaymentStatus`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentQuery {
    pub payment_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusResponse {
    pub status: PaymentStatus,
    pub amount: f64,
    pub payment_method: String,
    #[serde(default, with = "crate::shared::time::optional", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /api/addToCart` and `POST /api/removeFromCart`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRequest {
    pub item_id: Option<String>,
    pub quantity: Option<u32>,
}

/// A cart entry joined with the item it points at
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(flatten)]
    pub item: Item,
    pub quantity: u32,
    #[serde(default, with = "crate::shared::time::optional", skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}
