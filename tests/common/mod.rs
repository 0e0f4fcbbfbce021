#![allow(dead_code)]

use std::sync::Arc;

use agility_api_rust::app::app;
use agility_api_rust::database::memory::MemoryStore;
use agility_api_rust::identity::{StaticTokenVerifier, TokenClaims};
use agility_api_rust::state::AppState;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;

pub const ALICE_TOKEN: &str = "token-alice";
/// Same subject as ALICE_TOKEN, but the provider reports a changed name
pub const ALICE_RENAMED_TOKEN: &str = "token-alice-renamed";
pub const BOB_TOKEN: &str = "token-bob";
pub const CAROL_TOKEN: &str = "token-carol";

pub const ALICE_EMAIL: &str = "alice@example.com";
pub const BOB_EMAIL: &str = "bob@example.com";
pub const CAROL_EMAIL: &str = "carol@example.com";

fn claims(subject: &str, name: &str, email: &str) -> TokenClaims {
    TokenClaims {
        subject: subject.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        picture: format!("https://example.com/{}.png", subject),
    }
}

fn verifier() -> StaticTokenVerifier {
    StaticTokenVerifier::new()
        .with_token(ALICE_TOKEN, claims("alice", "Alice", ALICE_EMAIL))
        .with_token(ALICE_RENAMED_TOKEN, claims("alice", "Alicia", ALICE_EMAIL))
        .with_token(BOB_TOKEN, claims("bob", "Bob", BOB_EMAIL))
        .with_token(CAROL_TOKEN, claims("carol", "Carol", CAROL_EMAIL))
}

/// In-process service over the memory store with a fixed token mapping
pub fn test_app() -> Router {
    let (router, _) = test_state();
    router
}

/// Same, but also hands back the state for direct repository assertions
pub fn test_state() -> (Router, AppState) {
    let state = AppState::new(Arc::new(MemoryStore::new()), Arc::new(verifier()));
    (app(state.clone()), state)
}

/// Drive one request through the router and decode the JSON body (Null for
/// empty bodies, e.g. 204 responses)
pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    // Extractor rejections (e.g. missing body fields) come back as plain text
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

/// Register/refresh a profile via POST /users, returning the user payload
pub async fn sign_in(app: &Router, token: &str) -> Value {
    let (status, body) = request(app, "POST", "/users", None, Some(json!({ "token": token }))).await;
    assert_eq!(status, StatusCode::OK, "sign-in failed: {}", body);
    body["data"].clone()
}

/// Create a project as the given caller and return its id
pub async fn create_project(app: &Router, token: &str, name: &str) -> String {
    let (status, body) = request(
        app,
        "POST",
        "/projects",
        Some(token),
        Some(json!({ "name": name, "description": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create project failed: {}", body);
    body["data"]["id"].as_str().expect("project id").to_string()
}
