//! Persisted refresh tokens.

pub mod model;

pub use model::RefreshToken;
