//! # attendhub-entity
//!
//! Domain entity models for AttendHub. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities derive `sqlx::FromRow`.

pub mod device;
pub mod event;
pub mod token;
