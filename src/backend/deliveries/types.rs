//! Request and response types for the delivery endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shared::{Delivery, DeliveryMethod, DeliveryStatus, Item};

/// Query carrying a delivery id (`id` or `deliveryId`)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryQuery {
    #[serde(alias = "id")]
    pub delivery_id: Option<String>,
}

/// Body of `POST /api/createDelivery`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeliveryRequest {
    pub order_id: Option<String>,
    pub delivery_address: Option<Value>,
    pub delivery_method: Option<DeliveryMethod>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeliveryResponse {
    pub success: bool,
    pub delivery_id: String,
    pub message: String,
}

/// Body of `PUT /api/updateDeliveryAddress`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAddressRequest {
    pub delivery_id: Option<String>,
    #[serde(alias = "deliveryAddress")]
    pub address: Option<Value>,
}

/// Body of `POST /api/updateDeliveryStatus`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub delivery_id: Option<String>,
    pub status: Option<DeliveryStatus>,
    pub tracking_number: Option<String>,
}

/// Body of `POST /api/cancelDelivery`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelDeliveryRequest {
    pub delivery_id: Option<String>,
    pub reason: Option<String>,
}

/// Body of `POST /api/calculateDeliveryCost`
///
/// Addresses are accepted for forward compatibility; the quote depends on
/// method and weight only.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryCostRequest {
    pub from_address: Option<Value>,
    pub to_address: Option<Value>,
    pub item_weight: Option<f64>,
    pub delivery_method: Option<DeliveryMethod>,
}

/// A delivery with the item being handed over
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryDetails {
    #[serde(flatten)]
    pub delivery: Delivery,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_details: Option<Item>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryStatusResponse {
    pub status: DeliveryStatus,
    #[serde(default, with = "crate::shared::time::optional", skip_serializing_if = "Option::is_none")]
    pub estimated_delivery: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_method: Option<DeliveryMethod>,
}

/// Body of `POST /api/deleteLocation`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationIdRequest {
    pub location_id: Option<String>,
}
