//! Concrete PostgreSQL repositories, one per table.

pub mod device;
pub mod event;
pub mod refresh_token;

pub use device::DeviceRepository;
pub use event::EventRepository;
pub use refresh_token::RefreshTokenRepository;

use attendhub_core::error::{AppError, ErrorKind};

/// Map a write error, surfacing a missing owning device as `NotFound`.
pub(crate) fn map_write_error(context: &str, device_id: &str, err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_foreign_key_violation() {
            return AppError::not_found(format!("Device '{device_id}' is not registered"));
        }
        if db.is_check_violation() {
            return AppError::with_source(ErrorKind::Validation, context.to_string(), err);
        }
    }
    AppError::with_source(ErrorKind::Database, context.to_string(), err)
}
