//! Verification orchestration.
//!
//! [`Verifier`] sequences analysis and comparison for one check-in and
//! falls back to the caller's self report when there is no baseline or the
//! vision provider fails. Only an invalid image reference is returned as an
//! error; every vision failure degrades to the fallback instead.

use checkin_core::comparison::{compare_with, ComparisonThresholds};
use checkin_core::error::CoreError;
use checkin_core::image_ref::ImageRef;
use checkin_core::outcome::VerificationOutcome;
use checkin_core::self_report::{FallbackReason, SelfReport, SelfReportedResult};
use checkin_vision::{PhotoConditionAnalyzer, VisionProvider};

use crate::error::VerifyError;

/// A single check-in verification request.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationRequest {
    pub checkin: ImageRef,
    /// `None` until the user has a calibration photo.
    pub baseline: Option<ImageRef>,
    pub self_report: SelfReport,
}

impl VerificationRequest {
    /// Build a request from raw image references.
    pub fn parse(
        checkin: &str,
        baseline: Option<&str>,
        self_report: SelfReport,
    ) -> Result<Self, VerifyError> {
        let checkin = ImageRef::parse(checkin).map_err(VerifyError::InvalidImageReference)?;
        let baseline = baseline
            .map(ImageRef::parse)
            .transpose()
            .map_err(VerifyError::InvalidImageReference)?;

        Ok(Self {
            checkin,
            baseline,
            self_report,
        })
    }
}

/// Runs check-in verification against an injected vision provider.
///
/// Holds no per-request state; share it behind an `Arc` to serve
/// concurrent requests.
pub struct Verifier<P> {
    analyzer: PhotoConditionAnalyzer<P>,
    thresholds: ComparisonThresholds,
}

impl<P: VisionProvider> Verifier<P> {
    /// Verifier with the default comparison thresholds.
    pub fn new(provider: P) -> Self {
        Self::with_thresholds(provider, ComparisonThresholds::default())
    }

    pub fn with_thresholds(provider: P, thresholds: ComparisonThresholds) -> Self {
        Self {
            analyzer: PhotoConditionAnalyzer::new(provider),
            thresholds,
        }
    }

    pub fn thresholds(&self) -> &ComparisonThresholds {
        &self.thresholds
    }

    pub fn provider(&self) -> &P {
        self.analyzer.provider()
    }

    /// Verify a check-in photo against its baseline.
    ///
    /// Every reference is re-validated first, and local files must exist
    /// and be regular files, so an unusable reference is returned as
    /// [`VerifyError::InvalidImageReference`] instead of being mistaken for
    /// a provider outage.
    pub async fn verify(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationOutcome, VerifyError> {
        check_image(&request.checkin).await?;
        if let Some(baseline) = &request.baseline {
            check_image(baseline).await?;
        }

        let Some(baseline) = &request.baseline else {
            tracing::info!(
                checkin = %request.checkin,
                "No baseline photo, using self-reported conditions",
            );
            return Ok(self.fallback(request, FallbackReason::NoBaseline));
        };

        let analyses = futures::future::try_join(
            self.analyzer.analyze(baseline),
            self.analyzer.analyze(&request.checkin),
        )
        .await;

        let (baseline_profile, checkin_profile) = match analyses {
            Ok(profiles) => profiles,
            Err(e) => {
                tracing::warn!(
                    checkin = %request.checkin,
                    baseline = %baseline,
                    error = %e,
                    "Photo analysis failed, falling back to self-reported conditions",
                );
                return Ok(self.fallback(
                    request,
                    FallbackReason::VisionUnavailable {
                        error: e.to_string(),
                    },
                ));
            }
        };

        let report = compare_with(&self.thresholds, &baseline_profile, &checkin_profile);

        tracing::info!(
            checkin = %request.checkin,
            overall_valid = report.overall_valid,
            confidence_score = report.confidence_score,
            failed_checks = ?report.checks.failed(),
            "Check-in photo verified",
        );

        Ok(VerificationOutcome::Verified(report))
    }

    fn fallback(&self, request: &VerificationRequest, basis: FallbackReason) -> VerificationOutcome {
        let result = SelfReportedResult::from_self_report(&request.self_report, basis);
        tracing::info!(
            checkin = %request.checkin,
            photo_verified = result.photo_verified,
            "Check-in verified from self report",
        );
        VerificationOutcome::SelfReported(result)
    }
}

async fn check_image(image: &ImageRef) -> Result<(), VerifyError> {
    image.validate().map_err(VerifyError::InvalidImageReference)?;

    let ImageRef::Path(path) = image else {
        return Ok(());
    };
    let unreadable = |reason: String| {
        VerifyError::InvalidImageReference(CoreError::Validation(format!(
            "image file {} cannot be read: {reason}",
            path.display()
        )))
    };
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| unreadable(e.to_string()))?;
    if !metadata.is_file() {
        return Err(unreadable("not a regular file".to_string()));
    }
    Ok(())
}
