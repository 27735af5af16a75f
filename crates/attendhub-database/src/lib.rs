//! # attendhub-database
//!
//! Persistence for devices, refresh tokens and check-in events. The
//! [`EventStore`] trait is implemented by a PostgreSQL backend (built on
//! the repositories in [`repositories`]) and by an in-memory backend for
//! single-process deployments and tests.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{EventInsert, EventStore};
