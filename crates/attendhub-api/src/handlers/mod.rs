//! HTTP request handlers.

pub mod auth;
pub mod checkin;
pub mod device;
pub mod event;
pub mod health;
pub mod metrics;
