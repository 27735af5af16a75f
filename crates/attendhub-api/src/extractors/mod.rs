//! Custom Axum extractors.

pub mod auth;
pub mod json;

pub use auth::DeviceAuth;
pub use json::ValidatedJson;
