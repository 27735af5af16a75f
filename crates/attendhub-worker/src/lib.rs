//! Face verification worker for AttendHub.
//!
//! This crate provides:
//! - The [`FaceVerifier`](verifier::FaceVerifier) collaborator contract and
//!   its HTTP and fixture variants
//! - A processor that turns one queue message into a finalized event
//! - A runner that consumes the queue until shutdown

pub mod processor;
pub mod runner;
pub mod verifier;

pub use processor::{CheckinProcessor, ProcessOutcome};
pub use runner::WorkerRunner;
pub use verifier::{FaceVerifier, Verification, VerifierError, build_verifier};
