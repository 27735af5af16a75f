//! Rate limiting tests.

use axum::http::StatusCode;
use chrono::Duration;

use crate::helpers::{TestApp, test_config};

fn limited_app(capacity: u32, trust_forwarded_for: bool) -> TestApp {
    let mut config = test_config();
    config.rate_limit.capacity = capacity;
    config.rate_limit.refill_per_minute = capacity;
    config.rate_limit.trust_forwarded_for = trust_forwarded_for;
    TestApp::with_config(config)
}

#[tokio::test]
async fn test_requests_over_capacity_are_rejected() {
    let app = limited_app(3, true);
    let client = [("X-Forwarded-For", "203.0.113.7")];

    for _ in 0..3 {
        let response = app
            .request_with_headers("GET", "/healthz", None, None, &client)
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let response = app
        .request_with_headers("GET", "/healthz", None, None, &client)
        .await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.body["error"], "RATE_LIMITED");

    app.clock.advance(Duration::minutes(1));
    let response = app
        .request_with_headers("GET", "/healthz", None, None, &client)
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_clients_are_limited_independently() {
    let app = limited_app(1, true);

    let first = app
        .request_with_headers("GET", "/healthz", None, None, &[("X-Forwarded-For", "198.51.100.1")])
        .await;
    assert_eq!(first.status, StatusCode::OK);

    let other = app
        .request_with_headers("GET", "/healthz", None, None, &[("X-Forwarded-For", "198.51.100.2")])
        .await;
    assert_eq!(other.status, StatusCode::OK);

    let again = app
        .request_with_headers("GET", "/healthz", None, None, &[("X-Forwarded-For", "198.51.100.1")])
        .await;
    assert_eq!(again.status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_rotating_forwarded_for_does_not_reset_the_budget() {
    let app = limited_app(2, false);

    let mut admitted = 0;
    for i in 0..50 {
        let hop = format!("198.51.100.{i}");
        let response = app
            .request_with_headers("GET", "/healthz", None, None, &[("X-Forwarded-For", hop.as_str())])
            .await;
        if response.status == StatusCode::OK {
            admitted += 1;
        }
    }
    assert_eq!(admitted, 2);
}

#[tokio::test]
async fn test_disabled_limiter_admits_everything() {
    let mut config = test_config();
    config.rate_limit.enabled = false;
    config.rate_limit.capacity = 1;
    let app = TestApp::with_config(config);

    for _ in 0..5 {
        let response = app.request("GET", "/healthz", None, None).await;
        assert_eq!(response.status, StatusCode::OK);
    }
}
