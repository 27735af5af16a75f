//! Health endpoint and response header tests.

use axum::http::StatusCode;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_healthz_reports_ok() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/healthz", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["database"], true);
    assert_eq!(response.body["queue"], true);
}

#[tokio::test]
async fn test_security_headers_are_set() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/healthz", None, None).await;
    assert_eq!(response.headers["x-content-type-options"], "nosniff");
    assert_eq!(response.headers["x-frame-options"], "DENY");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/v2/events", None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
