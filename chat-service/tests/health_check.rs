//! Integration tests for the liveness and readiness probes.
//!
//! Run with: cargo test -p chat-service --test health_check

mod common;

use axum::{body::Body, http::Request, http::StatusCode};
use chat_service::{
    services::{providers::MockTextProvider, InMemoryHistoryStore},
    AppState, Application,
};
use common::{TestApp, UnavailableStore};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_check_returns_static_payload() {
    let app = TestApp::spawn();

    let (status, body) = app.send(get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "chat-service");
    assert_eq!(body["version"], "1.0.0");
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn health_check_ignores_store_state() {
    let app = TestApp::with(Arc::new(UnavailableStore), Arc::new(MockTextProvider::new()));

    let (status, body) = app.send(get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn readiness_reflects_store_health() {
    let ready = TestApp::spawn();
    let (status, body) = ready.send(get("/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");

    let unavailable =
        TestApp::with(Arc::new(UnavailableStore), Arc::new(MockTextProvider::new()));
    let (status, body) = unavailable.send(get("/ready")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unavailable");
}

#[tokio::test]
async fn served_over_tcp_with_request_id() {
    let state = AppState::new(
        Arc::new(InMemoryHistoryStore::new()),
        Arc::new(MockTextProvider::new()),
    );
    let app = Application::with_state(0, state)
        .await
        .expect("Failed to build application");
    let port = app.port();

    tokio::spawn(async move {
        let _ = app.run_until_stopped().await;
    });

    let response = Client::new()
        .get(format!("http://localhost:{}/health", port))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "healthy");
}
