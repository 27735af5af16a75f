//! Registered client device.

pub mod model;

pub use model::Device;
