//! `checkin-verifier` library crate.
//!
//! Orchestrates progress-photo verification and loads its configuration.
//! The binary entrypoint lives in `main.rs`.

pub mod config;
pub mod error;
pub mod orchestrator;

pub use config::VerifierConfig;
pub use error::VerifyError;
pub use orchestrator::{VerificationRequest, Verifier};
