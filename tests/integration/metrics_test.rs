//! Prometheus exposition tests.

use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;

use attendhub_core::telemetry;

use crate::helpers::{TestApp, test_config};

#[tokio::test]
async fn test_metrics_count_checkins_and_verifications() {
    let app = TestApp::new().await;
    let tokens = app.register_device("kiosk-1").await;

    let first = app.check_in(&tokens.access_token, "emp-42", "kiosk-1").await;
    app.check_in(&tokens.access_token, "emp-42", "kiosk-1").await;
    app.wait_until_finalized(first.event_id()).await;

    let response = app.request("GET", "/metrics", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response.headers[CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain")
    );
    assert!(response.text.contains(telemetry::CHECKINS_TOTAL));
    assert!(response.text.contains("outcome=\"accepted\""));
    assert!(response.text.contains("outcome=\"deduplicated\""));
    assert!(response.text.contains(telemetry::EVENTS_FINALIZED_TOTAL));
    assert!(response.text.contains("status=\"processed\""));
}

#[tokio::test]
async fn test_metrics_record_rate_limit_rejections_and_bypass_the_limiter() {
    let mut config = test_config();
    config.rate_limit.capacity = 1;
    let app = TestApp::with_config(config);

    assert_eq!(app.request("GET", "/healthz", None, None).await.status, StatusCode::OK);
    assert_eq!(
        app.request("GET", "/healthz", None, None).await.status,
        StatusCode::TOO_MANY_REQUESTS
    );

    // The bucket is empty, yet scrapes still go through.
    let response = app.request("GET", "/metrics", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.text.contains(telemetry::RATE_LIMITED_TOTAL));
}

#[tokio::test]
async fn test_metrics_route_absent_when_disabled() {
    let mut config = test_config();
    config.metrics.enabled = false;
    let app = TestApp::with_config(config);

    let response = app.request("GET", "/metrics", None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
