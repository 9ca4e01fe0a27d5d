//! The result of a single verification request.

use serde::{Deserialize, Serialize};

use crate::comparison::VerificationReport;
use crate::self_report::SelfReportedResult;

/// Either a vision-derived report or the self-reported fallback.
///
/// Callers must match on the variant; the fallback never carries diffs or a
/// confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerificationOutcome {
    Verified(VerificationReport),
    SelfReported(SelfReportedResult),
}

impl VerificationOutcome {
    /// Whether the check-in counts toward challenge progress.
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Verified(report) => report.overall_valid,
            Self::SelfReported(result) => result.photo_verified,
        }
    }

    pub fn report(&self) -> Option<&VerificationReport> {
        match self {
            Self::Verified(report) => Some(report),
            Self::SelfReported(_) => None,
        }
    }

    pub fn self_reported(&self) -> Option<&SelfReportedResult> {
        match self {
            Self::Verified(_) => None,
            Self::SelfReported(result) => Some(result),
        }
    }
}
