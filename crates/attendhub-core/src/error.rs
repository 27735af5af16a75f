//! The error type shared by every AttendHub crate.
//!
//! Backend errors (sqlx, redis, reqwest, jsonwebtoken) are folded into
//! [`AppError`] at the crate that owns the backend. Above that layer only
//! the [`ErrorKind`] matters: the HTTP layer maps it to a status code and
//! the worker maps it to an event outcome.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What went wrong, independent of where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// No such device, event or token.
    NotFound,
    /// Missing, malformed, expired or revoked credentials.
    Authentication,
    /// Valid credentials acting outside their scope.
    Authorization,
    /// The request is malformed.
    Validation,
    /// The write contradicts stored state, e.g. finalizing a finalized event.
    Conflict,
    /// The caller's bucket is empty.
    RateLimit,
    /// Settings the runtime cannot honor.
    Configuration,
    /// PostgreSQL failed.
    Database,
    /// The queue backend failed.
    Queue,
    /// Encoding or decoding failed.
    Serialization,
    /// The face service failed.
    ExternalService,
    /// A dependency is temporarily unavailable, or a wait was cancelled.
    ServiceUnavailable,
    /// Anything else.
    Internal,
}

impl ErrorKind {
    /// Stable upper-case name, used in log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Authentication => "AUTHENTICATION",
            Self::Authorization => "AUTHORIZATION",
            Self::Validation => "VALIDATION",
            Self::Conflict => "CONFLICT",
            Self::RateLimit => "RATE_LIMIT",
            Self::Configuration => "CONFIGURATION",
            Self::Database => "DATABASE",
            Self::Queue => "QUEUE",
            Self::Serialization => "SERIALIZATION",
            Self::ExternalService => "EXTERNAL_SERVICE",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::Internal => "INTERNAL",
        }
    }

    /// Whether the failure is on our side rather than the caller's.
    pub fn is_server_side(self) -> bool {
        matches!(
            self,
            Self::Configuration
                | Self::Database
                | Self::Queue
                | Self::Serialization
                | Self::ExternalService
                | Self::ServiceUnavailable
                | Self::Internal
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error with a kind, a message fit for logs, and an optional cause.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// Category.
    pub kind: ErrorKind,
    /// Human-readable description.
    pub message: String,
    /// Underlying cause, if any.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// An error without a cause.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// An error wrapping `source`.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// See [`ErrorKind::is_server_side`].
    pub fn is_server_error(&self) -> bool {
        self.kind.is_server_side()
    }
}

macro_rules! kind_constructors {
    ($($(#[$doc:meta])* $name:ident => $kind:ident;)*) => {
        impl AppError {
            $(
                $(#[$doc])*
                pub fn $name(message: impl Into<String>) -> Self {
                    Self::new(ErrorKind::$kind, message)
                }
            )*
        }
    };
}

kind_constructors! {
    /// [`ErrorKind::NotFound`]
    not_found => NotFound;
    /// [`ErrorKind::Authentication`]
    authentication => Authentication;
    /// [`ErrorKind::Authorization`]
    authorization => Authorization;
    /// [`ErrorKind::Validation`]
    validation => Validation;
    /// [`ErrorKind::Conflict`]
    conflict => Conflict;
    /// [`ErrorKind::RateLimit`]
    rate_limited => RateLimit;
    /// [`ErrorKind::Configuration`]
    configuration => Configuration;
    /// [`ErrorKind::Database`]
    database => Database;
    /// [`ErrorKind::Queue`]
    queue => Queue;
    /// [`ErrorKind::ExternalService`]
    external_service => ExternalService;
    /// [`ErrorKind::ServiceUnavailable`]
    service_unavailable => ServiceUnavailable;
    /// [`ErrorKind::Internal`]
    internal => Internal;
}

/// Clones carry kind and message; the cause is not `Clone` and is dropped.
impl Clone for AppError {
    fn clone(&self) -> Self {
        Self::new(self.kind, self.message.clone())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorKind::Serialization, format!("Invalid JSON: {err}"), err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Internal, format!("I/O failure: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(ErrorKind::Configuration, format!("Bad configuration: {err}"), err)
    }
}
