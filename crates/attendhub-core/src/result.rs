//! Convenience result type alias for AttendHub.

use crate::error::AppError;

/// A specialized `Result` type for AttendHub operations.
pub type AppResult<T> = Result<T, AppError>;
