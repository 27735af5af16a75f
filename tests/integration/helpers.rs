//! Shared test helpers for integration tests.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use uuid::Uuid;

use attendhub_api::Application;
use attendhub_core::config::AppConfig;
use attendhub_core::config::database::PROVIDER_MEMORY;
use attendhub_core::config::queue::BACKEND_MEMORY;
use attendhub_core::result::AppResult;
use attendhub_core::traits::clock::ManualClock;
use attendhub_database::store::{EventStore, MemoryEventStore};
use attendhub_entity::event::Event;
use attendhub_queue::memory::MemoryQueue;
use attendhub_worker::verifier::{FaceVerifier, FixtureFaceVerifier};

/// Configuration for a single-process test server.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database.provider = PROVIDER_MEMORY.to_string();
    config.queue.backend = BACKEND_MEMORY.to_string();
    config.worker.probe_on_start = false;
    config.worker.pause_ms = 0;
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config
}

/// Test application context
pub struct TestApp {
    /// The fully layered router
    pub router: Router,
    /// Store shared with the router and worker
    pub store: Arc<dyn EventStore>,
    /// Clock shared by tokens, dedup and rate limiting
    pub clock: Arc<ManualClock>,
    shutdown: CancellationToken,
    worker: Option<JoinHandle<AppResult<u64>>>,
}

/// Tokens returned by device registration.
#[derive(Debug, Clone)]
pub struct DeviceTokens {
    /// Bearer token for device calls
    pub access_token: String,
    /// Token for `/v1/auth/refresh`
    pub refresh_token: String,
}

impl TestApp {
    /// A test app with the default test configuration and fixture verifier.
    pub async fn new() -> Self {
        Self::with_config(test_config())
    }

    /// A test app with a custom configuration.
    pub fn with_config(config: AppConfig) -> Self {
        let verifier = Arc::new(FixtureFaceVerifier::new(config.face.fixture_score));
        Self::with_verifier(config, verifier)
    }

    /// A test app with a custom configuration and verifier.
    pub fn with_verifier(config: AppConfig, verifier: Arc<dyn FaceVerifier>) -> Self {
        let store: Arc<dyn EventStore> = Arc::new(MemoryEventStore::new());
        let clock = Arc::new(ManualClock::default());
        let app = Application::from_parts(
            config.clone(),
            Arc::clone(&store),
            Arc::new(MemoryQueue::new(config.queue.capacity)),
            verifier,
            clock.clone(),
        )
        .expect("Failed to assemble application");

        let worker = app.spawn_worker();
        Self {
            router: app.router(),
            store,
            clock,
            shutdown: app.shutdown_token(),
            worker,
        }
    }

    /// Send a JSON request and parse the JSON response.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        self.request_with_headers(method, path, body, token, &[]).await
    }

    /// Like [`TestApp::request`], with extra headers.
    pub async fn request_with_headers(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        for (name, value) in headers {
            req = req.header(*name, *value);
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);
        let text = String::from_utf8_lossy(&body_bytes).into_owned();

        TestResponse {
            status,
            headers,
            body,
            text,
        }
    }

    /// Register a device and return its tokens.
    pub async fn register_device(&self, device_id: &str) -> DeviceTokens {
        let response = self
            .request(
                "POST",
                "/v1/devices/register",
                Some(serde_json::json!({ "device_id": device_id })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);

        DeviceTokens {
            access_token: response.body["access_token"]
                .as_str()
                .expect("access_token")
                .to_string(),
            refresh_token: response.body["refresh_token"]
                .as_str()
                .expect("refresh_token")
                .to_string(),
        }
    }

    /// Submit a check-in.
    pub async fn check_in(&self, token: &str, user_id: &str, device_id: &str) -> TestResponse {
        self.request(
            "POST",
            "/v1/checkins",
            Some(serde_json::json!({
                "user_id": user_id,
                "device_id": device_id,
                "location": "front door",
                "image_ref": "https://img.example/capture.jpg",
            })),
            Some(token),
        )
        .await
    }

    /// Wait until the worker finalizes an event, reading the store directly.
    pub async fn wait_until_finalized(&self, id: Uuid) -> Event {
        for _ in 0..500 {
            let event = self
                .store
                .get_event(id)
                .await
                .expect("store read")
                .expect("event exists");
            if event.is_finalized() {
                return event;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("event {id} was not finalized in time");
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.shutdown.cancel();
        if let Some(worker) = self.worker.take() {
            worker.abort();
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: axum::http::HeaderMap,
    /// Parsed JSON body
    pub body: Value,
    /// Raw body as text
    pub text: String,
}

impl TestResponse {
    /// The `event_id` of a check-in acknowledgement.
    pub fn event_id(&self) -> Uuid {
        self.body["event_id"]
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .expect("event_id in response")
    }
}
