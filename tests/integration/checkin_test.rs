//! Check-in ingestion, dedup and verification tests.

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Duration;
use serde_json::json;

use attendhub_entity::event::EventStatus;
use attendhub_worker::verifier::FixtureFaceVerifier;

use crate::helpers::{TestApp, test_config};

#[tokio::test]
async fn test_checkin_is_accepted_and_verified() {
    let app = TestApp::new().await;
    let tokens = app.register_device("kiosk-1").await;

    let response = app.check_in(&tokens.access_token, "emp-42", "kiosk-1").await;
    assert_eq!(response.status, StatusCode::ACCEPTED);
    assert_eq!(response.body["status"], "pending");
    assert!(response.body["when"].is_string());

    let event = app.wait_until_finalized(response.event_id()).await;
    assert_eq!(event.status, EventStatus::Processed);
    assert_eq!(event.match_score, Some(0.95));

    let path = format!("/v1/events/{}", event.id);
    let response = app
        .request("GET", &path, None, Some(&tokens.access_token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "processed");
    assert_eq!(response.body["match_score"], 0.95);
    assert_eq!(response.body["user_id"], "emp-42");
    assert_eq!(response.body["location"], "front door");

    let response = app
        .request("GET", "/v1/events?device_id=kiosk-1", None, Some(&tokens.access_token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let events = response.body["events"].as_array().unwrap();
    let listed = events
        .iter()
        .find(|e| e["id"] == event.id.to_string())
        .expect("finalized event missing from listing");
    assert_eq!(listed["status"], "processed");
    assert_eq!(listed["match_score"], 0.95);
}

#[tokio::test]
async fn test_duplicate_within_window_returns_same_event() {
    let app = TestApp::new().await;
    let tokens = app.register_device("kiosk-1").await;

    let first = app.check_in(&tokens.access_token, "emp-42", "kiosk-1").await;
    app.clock.advance(Duration::minutes(2));
    let second = app.check_in(&tokens.access_token, "emp-42", "kiosk-1").await;

    assert_eq!(second.status, StatusCode::ACCEPTED);
    assert_eq!(first.event_id(), second.event_id());
    assert_eq!(first.body["when"], second.body["when"]);

    // A different user on the same device is a separate event.
    let other = app.check_in(&tokens.access_token, "emp-7", "kiosk-1").await;
    assert_ne!(other.event_id(), first.event_id());
}

#[tokio::test]
async fn test_checkin_after_window_creates_new_event() {
    let app = TestApp::new().await;
    let tokens = app.register_device("kiosk-1").await;

    let first = app.check_in(&tokens.access_token, "emp-42", "kiosk-1").await;
    app.wait_until_finalized(first.event_id()).await;

    app.clock.advance(Duration::minutes(6));
    let second = app.check_in(&tokens.access_token, "emp-42", "kiosk-1").await;
    assert_eq!(second.status, StatusCode::ACCEPTED);
    assert_ne!(first.event_id(), second.event_id());

    let response = app
        .request(
            "GET",
            "/v1/events?user_id=emp-42",
            None,
            Some(&tokens.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let events = response.body["events"].as_array().expect("events array");
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["id"], second.body["event_id"]);
}

#[tokio::test]
async fn test_checkin_for_another_device_is_forbidden() {
    let app = TestApp::new().await;
    let tokens = app.register_device("kiosk-1").await;
    app.register_device("kiosk-2").await;

    let response = app.check_in(&tokens.access_token, "emp-42", "kiosk-2").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "FORBIDDEN");
}

#[tokio::test]
async fn test_malformed_checkin_is_rejected() {
    let app = TestApp::new().await;
    let tokens = app.register_device("kiosk-1").await;

    let response = app
        .request(
            "POST",
            "/v1/checkins",
            Some(json!({ "user_id": "emp-42", "device_id": "kiosk-1" })),
            Some(&tokens.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");

    let response = app
        .request(
            "POST",
            "/v1/checkins",
            Some(json!({
                "user_id": "",
                "device_id": "kiosk-1",
                "image_ref": "https://img.example/a.jpg",
            })),
            Some(&tokens.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_verifier_failure_marks_event_failed() {
    let app = TestApp::with_verifier(
        test_config(),
        Arc::new(FixtureFaceVerifier::failing("no face in frame")),
    );
    let tokens = app.register_device("kiosk-1").await;

    let response = app.check_in(&tokens.access_token, "emp-42", "kiosk-1").await;
    let event = app.wait_until_finalized(response.event_id()).await;
    assert_eq!(event.status, EventStatus::Failed);
    assert_eq!(event.match_score, None);
}

#[tokio::test]
async fn test_unknown_event_is_not_found() {
    let app = TestApp::new().await;
    let tokens = app.register_device("kiosk-1").await;

    let response = app
        .request(
            "GET",
            "/v1/events/00000000-0000-0000-0000-000000000000",
            None,
            Some(&tokens.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request("GET", "/v1/events/not-a-uuid", None, Some(&tokens.access_token))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
