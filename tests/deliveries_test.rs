//! Delivery API integration tests

#![cfg(feature = "ssr")]

mod common;

use common::{assert_error, TestApp};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

/// Alice sells a bike to Bob; returns (order id, delivery id)
async fn ordered_delivery(app: &TestApp) -> (String, String) {
    let bike = app.list_item("alice", "Mountain Bike", 1500.0).await;
    let order: Value = app
        .post("bob", "processBuyNow", json!({ "itemId": bike }))
        .await
        .json();
    let order_id = order["orderId"].as_str().unwrap().to_string();

    let response = app
        .post(
            "bob",
            "createDelivery",
            json!({
                "orderId": order_id,
                "deliveryAddress": { "city": "Pune", "pin": "411001" },
                "deliveryMethod": "express"
            }),
        )
        .await;
    response.assert_status_ok();
    let delivery_id = response.json::<Value>()["deliveryId"].as_str().unwrap().to_string();
    (order_id, delivery_id)
}

#[tokio::test]
async fn test_create_and_read_delivery() {
    let app = TestApp::new();
    let (order_id, delivery_id) = ordered_delivery(&app).await;

    let details: Value = app
        .get("bob", "getDelivery", &[("id", delivery_id.as_str())])
        .await
        .json();
    assert_eq!(details["orderId"], json!(order_id));
    assert_eq!(details["sellerId"], json!("alice"));
    assert_eq!(details["itemDetails"]["title"], json!("Mountain Bike"));

    let status: Value = app
        .get("alice", "getDeliveryStatus", &[("deliveryId", delivery_id.as_str())])
        .await
        .json();
    assert_eq!(status["status"], json!("pending"));
    assert_eq!(status["deliveryMethod"], json!("express"));
    assert!(status["estimatedDelivery"].is_string());
}

#[tokio::test]
async fn test_only_buyer_creates_delivery() {
    let app = TestApp::new();
    let bike = app.list_item("alice", "Mountain Bike", 1500.0).await;
    let order: Value = app
        .post("bob", "processBuyNow", json!({ "itemId": bike }))
        .await
        .json();

    let response = app
        .post("carol", "createDelivery", json!({ "orderId": order["orderId"] }))
        .await;
    assert_error(&response, 403, "NOT_AUTHORIZED");

    let missing = app
        .post("bob", "createDelivery", json!({ "orderId": "nope" }))
        .await;
    assert_error(&missing, 404, "ORDER_NOT_FOUND");
}

#[tokio::test]
async fn test_outsiders_cannot_see_delivery() {
    let app = TestApp::new();
    let (_, delivery_id) = ordered_delivery(&app).await;

    let response = app
        .get("carol", "getDelivery", &[("id", delivery_id.as_str())])
        .await;
    assert_error(&response, 403, "NOT_AUTHORIZED");

    let missing = app.get("bob", "getDelivery", &[("id", "nope")]).await;
    assert_error(&missing, 404, "DELIVERY_NOT_FOUND");
}

#[tokio::test]
async fn test_status_updates_until_final() {
    let app = TestApp::new();
    let (_, delivery_id) = ordered_delivery(&app).await;

    app.post(
        "alice",
        "updateDeliveryStatus",
        json!({ "deliveryId": delivery_id, "status": "shipped", "trackingNumber": "TRK-1" }),
    )
    .await
    .assert_status_ok();

    let details: Value = app
        .get("bob", "getDelivery", &[("id", delivery_id.as_str())])
        .await
        .json();
    assert_eq!(details["status"], json!("shipped"));
    assert_eq!(details["trackingNumber"], json!("TRK-1"));

    app.post("alice", "updateDeliveryStatus", json!({ "deliveryId": delivery_id, "status": "delivered" }))
        .await
        .assert_status_ok();

    let reopen = app
        .post("alice", "updateDeliveryStatus", json!({ "deliveryId": delivery_id, "status": "shipped" }))
        .await;
    assert_error(&reopen, 400, "INVALID_STATUS");

    let cancel = app.post("bob", "cancelDelivery", json!({ "deliveryId": delivery_id })).await;
    assert_error(&cancel, 400, "INVALID_STATUS");
}

#[tokio::test]
async fn test_status_is_required() {
    let app = TestApp::new();
    let (_, delivery_id) = ordered_delivery(&app).await;

    let response = app
        .post("alice", "updateDeliveryStatus", json!({ "deliveryId": delivery_id }))
        .await;
    assert_error(&response, 400, "MISSING_FIELDS");
}

#[tokio::test]
async fn test_update_address_and_cancel() {
    let app = TestApp::new();
    let (_, delivery_id) = ordered_delivery(&app).await;

    app.server
        .put("/api/updateDeliveryAddress")
        .authorization_bearer(common::token("bob"))
        .json(&json!({ "deliveryId": delivery_id, "address": { "city": "Mumbai" } }))
        .await
        .assert_status_ok();

    let status: Value = app
        .get("bob", "getDeliveryStatus", &[("deliveryId", delivery_id.as_str())])
        .await
        .json();
    assert_eq!(status["deliveryAddress"], json!({ "city": "Mumbai" }));

    app.post("bob", "cancelDelivery", json!({ "deliveryId": delivery_id, "reason": "moved" }))
        .await
        .assert_status_ok();
    let details: Value = app
        .get("bob", "getDelivery", &[("id", delivery_id.as_str())])
        .await
        .json();
    assert_eq!(details["status"], json!("cancelled"));
}

#[tokio::test]
async fn test_delivery_history_lists_purchases() {
    let app = TestApp::new();
    ordered_delivery(&app).await;

    let history: Value = app.get("bob", "getDeliveryHistory", &[]).await.json();
    // processBuyNow and createDelivery each create one
    assert_eq!(history.as_array().unwrap().len(), 2);

    let seller: Value = app.get("alice", "getDeliveryHistory", &[]).await.json();
    assert!(seller.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_calculate_delivery_cost() {
    let app = TestApp::new();

    let quote: Value = app
        .post("bob", "calculateDeliveryCost", json!({ "itemWeight": 2, "deliveryMethod": "standard" }))
        .await
        .json();
    assert_eq!(quote["baseCost"], json!(50.0));
    assert_eq!(quote["weightCost"], json!(20.0));
    assert_eq!(quote["totalCost"], json!(70.0));
    assert_eq!(quote["estimatedDays"], json!(7));

    let negative = app
        .post("bob", "calculateDeliveryCost", json!({ "itemWeight": -1 }))
        .await;
    assert_error(&negative, 400, "INVALID_WEIGHT");
}

#[tokio::test]
async fn test_saved_locations() {
    let app = TestApp::new();

    let saved: Value = app
        .post("bob", "saveLocation", json!({ "label": "Home", "city": "Pune" }))
        .await
        .json();
    let location_id = saved["locationId"].as_str().unwrap().to_string();

    app.post("bob", "saveLocation", json!({ "locationId": location_id, "city": "Mumbai" }))
        .await
        .assert_status_ok();

    let locations: Value = app.get("bob", "getLocations", &[]).await.json();
    assert_eq!(locations.as_array().unwrap().len(), 1);
    assert_eq!(locations[0]["id"], json!(location_id));
    assert_eq!(locations[0]["label"], json!("Home"));
    assert_eq!(locations[0]["city"], json!("Mumbai"));

    app.post("bob", "deleteLocation", json!({ "locationId": location_id }))
        .await
        .assert_status_ok();
    let locations: Value = app.get("bob", "getLocations", &[]).await.json();
    assert!(locations.as_array().unwrap().is_empty());
}
