//! End-to-end tests for order placement.
//!
//! Run with: cargo test -p torque-integration-tests -- --ignored

use serde_json::{Value, json};
use torque_integration_tests::{base_url, client, create_bike, login_fresh_user};

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_placement_without_address_is_refused_and_cart_kept() {
    let client = client();
    login_fresh_user(&client, false).await;
    let bike_id = create_bike(&client, "No Address Bike", 5000).await;
    let base = base_url();

    client
        .post(format!("{base}/api/cart/add"))
        .json(&json!({ "bikeId": bike_id, "quantity": 1 }))
        .send()
        .await
        .expect("Failed to add to cart");

    let resp = client
        .post(format!("{base}/api/orders/place"))
        .json(&json!({ "shippingMethod": "Standard" }))
        .send()
        .await
        .expect("Failed to call place");
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("Failed to parse error");
    assert_eq!(
        body["error"].as_str(),
        Some("Address is required to place an order")
    );

    // No order was created and the cart is unchanged
    let resp = client
        .get(format!("{base}/api/orders"))
        .send()
        .await
        .expect("Failed to fetch orders");
    let orders: Value = resp.json().await.expect("Failed to parse orders");
    assert_eq!(orders.as_array().map(Vec::len), Some(0));

    let resp = client
        .get(format!("{base}/api/cart"))
        .send()
        .await
        .expect("Failed to fetch cart");
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(cart["cartItems"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_placement_with_empty_cart_is_refused() {
    let client = client();
    login_fresh_user(&client, true).await;
    let base = base_url();

    let resp = client
        .post(format!("{base}/api/orders/place"))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to call place");
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("Failed to parse error");
    assert_eq!(body["error"].as_str(), Some("Cart is empty"));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_express_order_freezes_subtotal_plus_fee_and_clears_cart() {
    let client = client();
    login_fresh_user(&client, true).await;
    let bike_id = create_bike(&client, "Superbike", 16995).await;
    let base = base_url();

    client
        .post(format!("{base}/api/cart/add"))
        .json(&json!({ "bikeId": bike_id, "quantity": 1 }))
        .send()
        .await
        .expect("Failed to add to cart");

    let resp = client
        .post(format!("{base}/api/orders/place"))
        .json(&json!({ "paymentMethod": "Card", "shippingMethod": "Express" }))
        .send()
        .await
        .expect("Failed to place order");
    assert_eq!(resp.status(), 200);
    let order: Value = resp.json().await.expect("Failed to parse order");

    // 16995 subtotal + 50 Express fee
    assert_eq!(order["total"].as_str(), Some("17045"));
    assert_eq!(order["status"].as_str(), Some("ordered"));
    assert_eq!(order["shippingMethod"].as_str(), Some("Express"));
    assert_eq!(order["orderItems"].as_array().map(Vec::len), Some(1));
    assert_eq!(order["orderItems"][0]["quantity"].as_u64(), Some(1));

    // Exactly one order exists and the cart is now empty
    let resp = client
        .get(format!("{base}/api/orders"))
        .send()
        .await
        .expect("Failed to fetch orders");
    let orders: Value = resp.json().await.expect("Failed to parse orders");
    assert_eq!(orders.as_array().map(Vec::len), Some(1));

    let resp = client
        .get(format!("{base}/api/cart"))
        .send()
        .await
        .expect("Failed to fetch cart");
    let cart: Value = resp.json().await.expect("Failed to parse cart");
    assert_eq!(cart["cartItems"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_pickup_order_adds_no_fee() {
    let client = client();
    login_fresh_user(&client, true).await;
    let bike_id = create_bike(&client, "Pickup Bike", 6499).await;
    let base = base_url();

    client
        .post(format!("{base}/api/cart/add"))
        .json(&json!({ "bikeId": bike_id, "quantity": 2 }))
        .send()
        .await
        .expect("Failed to add to cart");

    let resp = client
        .post(format!("{base}/api/orders/place"))
        .json(&json!({ "shippingMethod": "Pickup" }))
        .send()
        .await
        .expect("Failed to place order");
    assert_eq!(resp.status(), 200);
    let order: Value = resp.json().await.expect("Failed to parse order");
    assert_eq!(order["total"].as_str(), Some("12998"));
}
