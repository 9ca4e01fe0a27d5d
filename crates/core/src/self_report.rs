//! Self-reported capture conditions and the lower-assurance fallback result.
//!
//! When vision-based comparison cannot run, a check-in is judged only on the
//! client's own estimate of lighting, angle and distance.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Client-estimated quality of a single capture condition.
///
/// Deserialization goes through [`FromStr`], so JSON input is as lenient
/// about case and whitespace as [`SelfReport::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum SelfAssessment {
    Good,
    Fair,
    Poor,
}

/// All valid self-assessment strings.
pub const VALID_SELF_ASSESSMENTS: &[&str] = &["good", "fair", "poor"];

impl FromStr for SelfAssessment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "good" => Ok(Self::Good),
            "fair" => Ok(Self::Fair),
            "poor" => Ok(Self::Poor),
            other => Err(CoreError::Validation(format!(
                "Unknown self-assessment: '{other}'. Valid values: {}",
                VALID_SELF_ASSESSMENTS.join(", ")
            ))),
        }
    }
}

impl TryFrom<String> for SelfAssessment {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for SelfAssessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        })
    }
}

/// The caller's self-reported conditions. Every field is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelfReport {
    pub lighting: Option<SelfAssessment>,
    pub angle: Option<SelfAssessment>,
    pub distance: Option<SelfAssessment>,
}

impl SelfReport {
    /// Parse optional raw strings, rejecting unknown values.
    pub fn parse(
        lighting: Option<&str>,
        angle: Option<&str>,
        distance: Option<&str>,
    ) -> Result<Self, CoreError> {
        let parse_field = |v: Option<&str>| v.map(str::parse::<SelfAssessment>).transpose();
        Ok(Self {
            lighting: parse_field(lighting)?,
            angle: parse_field(angle)?,
            distance: parse_field(distance)?,
        })
    }

    /// All three conditions reported as `good`.
    pub fn all_good() -> Self {
        Self {
            lighting: Some(SelfAssessment::Good),
            angle: Some(SelfAssessment::Good),
            distance: Some(SelfAssessment::Good),
        }
    }

    /// `true` only when lighting, angle and distance are all `good`.
    /// A missing field counts as not good.
    pub fn is_verified(&self) -> bool {
        [self.lighting, self.angle, self.distance]
            .iter()
            .all(|v| *v == Some(SelfAssessment::Good))
    }
}

/// Why the vision-based comparison did not run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FallbackReason {
    /// The user has no calibration photo yet.
    NoBaseline,
    /// Analysis of one of the images failed. `error` is for diagnostics only.
    VisionUnavailable { error: String },
}

/// Verification derived solely from the caller's self report.
///
/// Carries no per-check diffs and no confidence score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfReportedResult {
    pub photo_verified: bool,
    pub lighting: Option<SelfAssessment>,
    pub angle: Option<SelfAssessment>,
    pub distance: Option<SelfAssessment>,
    pub basis: FallbackReason,
}

impl SelfReportedResult {
    pub fn from_self_report(report: &SelfReport, basis: FallbackReason) -> Self {
        Self {
            photo_verified: report.is_verified(),
            lighting: report.lighting,
            angle: report.angle,
            distance: report.distance,
            basis,
        }
    }

    /// Diagnostic error message, if the fallback was caused by a failure.
    pub fn error(&self) -> Option<&str> {
        match &self.basis {
            FallbackReason::NoBaseline => None,
            FallbackReason::VisionUnavailable { error } => Some(error),
        }
    }
}
