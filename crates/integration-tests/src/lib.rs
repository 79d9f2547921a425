//! Integration tests for the Torque API.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! cargo run -p torque-cli -- migrate
//!
//! # Start the API
//! cargo run -p torque-api
//!
//! # Run the end-to-end tests
//! cargo test -p torque-integration-tests -- --ignored
//! ```
//!
//! All tests are `#[ignore]`d by default because they need a running server
//! and database. Each test creates its own throwaway user through the legacy
//! `/user/create` endpoint (which skips email verification) and logs in to
//! get a session cookie.

use reqwest::Client;
use serde_json::{Value, json};

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

/// Create an HTTP client that keeps session cookies.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Create a throwaway user with a complete shipping profile and log the
/// client in as them. Returns the username.
///
/// # Panics
///
/// Panics if any request fails.
pub async fn login_fresh_user(client: &Client, with_address: bool) -> String {
    let base = base_url();
    let username = format!("rider-{}", uuid::Uuid::new_v4());
    let password = "Abcdef12";

    let resp = client
        .post(format!("{base}/user/create"))
        .json(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": password,
        }))
        .send()
        .await
        .expect("Failed to create user");
    assert!(resp.status().is_success(), "user create failed");

    let resp = client
        .post(format!("{base}/api/auth"))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to log in");
    assert!(resp.status().is_success(), "login failed");

    if with_address {
        let resp = client
            .put(format!("{base}/user/profile"))
            .json(&json!({ "address": "1 Main St", "phone": "555-0100" }))
            .send()
            .await
            .expect("Failed to update profile");
        assert!(resp.status().is_success(), "profile update failed");
    }

    username
}

/// Create a bike through the legacy endpoint and return its ID.
///
/// # Panics
///
/// Panics if the request fails or the response has no bike ID.
pub async fn create_bike(client: &Client, name: &str, price: i64) -> i64 {
    let base = base_url();
    let resp = client
        .post(format!("{base}/bike/create"))
        .json(&json!({
            "name": name,
            "cc": 999,
            "price": price,
            "year": 2024,
        }))
        .send()
        .await
        .expect("Failed to create bike");
    assert!(resp.status().is_success(), "bike create failed");

    let body: Value = resp.json().await.expect("Failed to parse response");
    body["bike"]["id"].as_i64().expect("bike id missing")
}
