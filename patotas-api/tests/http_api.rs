//! HTTP API integration tests
//!
//! Drives the axum router directly with `tower::ServiceExt::oneshot`
//! against an in-memory database.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use patotas_api::{build_router, AppState};
use patotas_core::core_identity::LocalIdentityProvider;
use patotas_core::core_patota::{PatotaId, PatotaSqlStore};
use patotas_core::storage::memory_pool;
use patotas_core::test_utils::{test_config, TEST_PASSWORD};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let config = test_config();
    let pool = memory_pool().unwrap();
    let identity = Arc::new(LocalIdentityProvider::new(pool.clone(), &config.identity).unwrap());
    let state = AppState::new(identity, Arc::new(PatotaSqlStore::new(pool)), &config);
    build_router(Arc::new(state))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Sign up and sign in, returning the bearer token
async fn account(app: &Router, email: &str, name: &str) -> String {
    let (status, _) = send(
        app,
        Method::POST,
        "/auth/sign-up",
        None,
        Some(json!({ "email": email, "password": TEST_PASSWORD, "display_name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        Method::POST,
        "/auth/sign-in",
        None,
        Some(json!({ "email": email, "password": TEST_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn create(app: &Router, token: &str, name: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/patotas",
        Some(token),
        Some(json!({ "name": name, "description": "Thursday football" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn test_requests_without_session_are_unauthorized() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/patotas", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["title"], "Not signed in");

    let (status, _) = send(&app, Method::GET, "/auth/session", Some("bogus"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_sign_in_with_wrong_password() {
    let app = app();
    account(&app, "alice@example.com", "Alice").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/sign-in",
        None,
        Some(json!({ "email": "alice@example.com", "password": "not-it" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["title"], "Sign-in failed");
}

#[tokio::test]
async fn test_duplicate_sign_up_conflicts() {
    let app = app();
    account(&app, "alice@example.com", "Alice").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/sign-up",
        None,
        Some(json!({ "email": "alice@example.com", "password": TEST_PASSWORD, "display_name": "A" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_join_and_view() {
    let app = app();
    let alice = account(&app, "alice@example.com", "Alice").await;
    let bob = account(&app, "bob@example.com", "Bob").await;

    let created = create(&app, &alice, "Team A").await;
    let id = created["id"].as_str().unwrap().to_string();
    let code = created["invite_code"].as_str().unwrap().to_lowercase();

    let (status, joined) = send(
        &app,
        Method::POST,
        "/patotas/join",
        Some(&bob),
        Some(json!({ "invite_code": code })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(joined["already_member"], false);
    assert!(joined["patota"].get("invite_code").is_none());

    let (_, again) = send(
        &app,
        Method::POST,
        "/patotas/join",
        Some(&bob),
        Some(json!({ "invite_code": code })),
    )
    .await;
    assert_eq!(again["already_member"], true);

    let (status, admin_view) = send(&app, Method::GET, &format!("/patotas/{}", id), Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(admin_view["role"], "Administrator");
    assert_eq!(admin_view["is_administrator"], true);
    assert!(admin_view["patota"]["invite_code"].is_string());

    let (status, member_view) = send(&app, Method::GET, &format!("/patotas/{}", id), Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(member_view["role"], "Member");
    assert!(member_view["patota"].get("invite_code").is_none());

    let (status, roster) = send(
        &app,
        Method::GET,
        &format!("/patotas/{}/members", id),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = roster
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["display_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alice", "Bob"]);

    let (_, mine) = send(&app, Method::GET, "/patotas", Some(&bob), None).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["role"], "Member");
}

#[tokio::test]
async fn test_outsider_gets_access_denied() {
    let app = app();
    let alice = account(&app, "alice@example.com", "Alice").await;
    let mallory = account(&app, "mallory@example.com", "Mallory").await;
    let id = create(&app, &alice, "Team A").await["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, Method::GET, &format!("/patotas/{}", id), Some(&mallory), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["title"], "Access denied");

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/patotas/{}/members", id),
        Some(&mallory),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_error_statuses() {
    let app = app();
    let alice = account(&app, "alice@example.com", "Alice").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/patotas/join",
        Some(&alice),
        Some(json!({ "invite_code": "ZZZZZZ" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["title"], "Invalid code");

    let (status, _) = send(
        &app,
        Method::POST,
        "/patotas/join",
        Some(&alice),
        Some(json!({ "invite_code": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/patotas",
        Some(&alice),
        Some(json!({ "name": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::GET, "/patotas/not-a-uuid", Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["title"], "Patota not found");

    let unknown = format!("/patotas/{}", PatotaId::generate());
    let (status, body) = send(&app, Method::GET, &unknown, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["title"], "Patota not found");
}

#[tokio::test]
async fn test_sign_out_invalidates_token() {
    let app = app();
    let alice = account(&app, "alice@example.com", "Alice").await;

    let (status, me) = send(&app, Method::GET, "/auth/session", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["display_name"], "Alice");

    let (status, _) = send(&app, Method::POST, "/auth/sign-out", Some(&alice), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, "/auth/session", Some(&alice), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
