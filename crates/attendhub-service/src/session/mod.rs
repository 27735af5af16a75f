//! Device token sessions: registration, refresh rotation and revocation.

pub mod service;

pub use service::DeviceSessionService;
