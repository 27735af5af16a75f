//! End-to-end tests that drive the HTTP router against in-memory backends
//! with an embedded worker.

mod auth_test;
mod checkin_test;
mod health_test;
mod helpers;
mod metrics_test;
mod rate_limit_test;
