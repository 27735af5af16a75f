//! # attendhub-api
//!
//! HTTP API layer for AttendHub built on Axum.
//!
//! Provides the `/v1` REST endpoints, the Prometheus `/metrics` endpoint, middleware (rate limiting, CORS,
//! security headers, logging), extractors, DTOs, error mapping, and the
//! [`Application`](app::Application) composition root that wires the store,
//! queue, services and embedded worker together.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{Application, build_app};
pub use error::ApiError;
pub use state::AppState;
