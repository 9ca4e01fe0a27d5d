//! Domain logic for progress-photo verification.
//!
//! Pure, I/O-free building blocks: image references, raw vision
//! observations, condition-profile reduction, the baseline comparator, and
//! the self-reported fallback. Provider calls and orchestration live in
//! `checkin-vision` and `checkin-verifier`.

pub mod comparison;
pub mod condition;
pub mod error;
pub mod image_ref;
pub mod observation;
pub mod outcome;
pub mod self_report;
pub mod threshold_validation;
