//! Integration tests for the ModHub API
//!
//! These tests require a running ModHub server on port 8790.
//! Run with: cargo test --test api_tests -- --ignored

use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

const BASE_URL: &str = "http://localhost:8790/api";

fn client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}

#[tokio::test]
#[ignore]
async fn test_health_endpoint() {
    let client = client();
    let resp = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Health check failed");

    assert!(resp.status().is_success());

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "modhub");
}

#[tokio::test]
#[ignore]
async fn test_list_modules() {
    let client = client();
    let resp = client
        .get(format!("{}/modules", BASE_URL))
        .send()
        .await
        .expect("List modules failed");

    assert!(resp.status().is_success());

    let body: Value = resp.json().await.unwrap();
    assert!(body["modules"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_register_and_login_flow() {
    let client = client();
    let username = format!("itest_{}", std::process::id());

    let resp = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "password123",
            "role": "Developer"
        }))
        .send()
        .await
        .expect("Register failed");
    assert_eq!(resp.status(), 201);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["user"]["username"], username.as_str());
    assert_eq!(body["user"]["role"], "Developer");

    let resp = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": username,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Login failed");
    assert!(resp.status().is_success());

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["user"]["username"], username.as_str());
}

#[tokio::test]
#[ignore]
async fn test_login_rejects_bad_password() {
    let client = client();
    let resp = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "no_such_user",
            "password": "whatever"
        }))
        .send()
        .await
        .expect("Login request failed");

    assert_eq!(resp.status(), 404);

    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_search_modules() {
    let client = client();
    let resp = client
        .get(format!("{}/modules/search?q=cleaner", BASE_URL))
        .send()
        .await
        .expect("Search failed");

    assert!(resp.status().is_success());

    let body: Value = resp.json().await.unwrap();
    assert!(body["modules"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_unknown_module_returns_404() {
    let client = client();
    let resp = client
        .get(format!("{}/modules/999999", BASE_URL))
        .send()
        .await
        .expect("Get module failed");

    assert_eq!(resp.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_categories_endpoint() {
    let client = client();
    let resp = client
        .get(format!("{}/categories", BASE_URL))
        .send()
        .await
        .expect("List categories failed");

    assert!(resp.status().is_success());

    let body: Value = resp.json().await.unwrap();
    assert!(body["categories"].is_array());
}
