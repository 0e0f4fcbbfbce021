mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{request, sign_in, test_app, ALICE_RENAMED_TOKEN, ALICE_TOKEN};

#[tokio::test]
async fn token_validation_creates_profile() {
    let app = test_app();

    let user = sign_in(&app, ALICE_TOKEN).await;
    assert_eq!(user["id"], "alice");
    assert_eq!(user["name"], "Alice");
    assert_eq!(user["email"], "alice@example.com");
    assert_eq!(user["profileURL"], "https://example.com/alice.png");
}

#[tokio::test]
async fn repeated_validation_is_idempotent() {
    let app = test_app();

    let first = sign_in(&app, ALICE_TOKEN).await;
    let second = sign_in(&app, ALICE_TOKEN).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn changed_claims_refresh_the_profile() {
    let app = test_app();

    let original = sign_in(&app, ALICE_TOKEN).await;
    assert_eq!(original["name"], "Alice");

    // Same subject, new display name at the provider
    let refreshed = sign_in(&app, ALICE_RENAMED_TOKEN).await;
    assert_eq!(refreshed["id"], "alice");
    assert_eq!(refreshed["name"], "Alicia");
}

#[tokio::test]
async fn unknown_token_is_unauthorized() {
    let app = test_app();

    let (status, body) = request(
        &app,
        "POST",
        "/users",
        None,
        Some(json!({ "token": "forged" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let app = test_app();

    let (status, _) = request(&app, "POST", "/users", None, Some(json!({}))).await;
    assert!(status.is_client_error(), "unexpected status: {}", status);
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() {
    let app = test_app();

    let (status, body) = request(&app, "GET", "/projects", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = request(&app, "GET", "/projects", Some("forged"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_reports_store_status() {
    let app = test_app();

    let (status, body) = request(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}
