//! Device registration and token lifecycle tests.

use axum::http::StatusCode;
use chrono::Duration;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_register_issues_tokens() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/v1/devices/register",
            Some(json!({ "device_id": "kiosk-1" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert!(response.body["access_token"].is_string());
    assert!(response.body["refresh_token"].is_string());
    assert!(response.body["expires_at"].is_i64());
}

#[tokio::test]
async fn test_register_requires_device_id() {
    let app = TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/v1/devices/register",
            Some(json!({ "device_id": "" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_missing_or_bad_token_is_unauthorized() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/v1/events", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "UNAUTHORIZED");

    let response = app
        .request("GET", "/v1/events", None, Some("not-a-jwt"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let app = TestApp::new().await;
    let tokens = app.register_device("kiosk-1").await;

    let response = app
        .request("GET", "/v1/events", None, Some(&tokens.refresh_token))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_access_token_is_rejected() {
    let app = TestApp::new().await;
    let tokens = app.register_device("kiosk-1").await;

    app.clock.advance(Duration::hours(2));
    let response = app
        .request("GET", "/v1/events", None, Some(&tokens.access_token))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_rotates_and_is_single_use() {
    let app = TestApp::new().await;
    let tokens = app.register_device("kiosk-1").await;

    let body = json!({ "refresh_token": tokens.refresh_token });
    let rotated = app
        .request("POST", "/v1/auth/refresh", Some(body.clone()), None)
        .await;
    assert_eq!(rotated.status, StatusCode::OK);
    let new_access = rotated.body["access_token"].as_str().expect("access_token");
    let new_refresh = rotated.body["refresh_token"].as_str().expect("refresh_token");
    assert_ne!(new_refresh, tokens.refresh_token);

    let replay = app
        .request("POST", "/v1/auth/refresh", Some(body), None)
        .await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);

    let response = app.request("GET", "/v1/events", None, Some(new_access)).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_revoked_refresh_token_cannot_refresh() {
    let app = TestApp::new().await;
    let tokens = app.register_device("kiosk-1").await;
    let body = json!({ "refresh_token": tokens.refresh_token });

    let response = app
        .request("POST", "/v1/auth/revoke", Some(body.clone()), None)
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    // Revoking twice is harmless.
    let response = app
        .request("POST", "/v1/auth/revoke", Some(body.clone()), None)
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app
        .request("POST", "/v1/auth/refresh", Some(body), None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
