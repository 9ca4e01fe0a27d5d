//! Vision provider integration and photo condition analysis.
//!
//! - [`VisionProvider`]: injected face/label detection seam.
//! - [`CloudVisionApi`]: REST implementation against `images:annotate`.
//! - [`PhotoConditionAnalyzer`]: reduces provider output for one image to a
//!   [`ConditionProfile`](checkin_core::condition::ConditionProfile).

pub mod analyzer;
pub mod api;
pub mod messages;
pub mod provider;

pub use analyzer::{AnalysisError, PhotoConditionAnalyzer};
pub use api::{CloudVisionApi, CloudVisionConfig};
pub use provider::{VisionError, VisionProvider};
