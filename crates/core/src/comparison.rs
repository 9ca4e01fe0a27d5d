//! Baseline vs. check-in condition comparison.
//!
//! [`compare`] applies fixed per-dimension tolerances to two
//! [`ConditionProfile`]s and produces a [`VerificationReport`] with five
//! pass/fail checks, retake suggestions, and a confidence score.
//!
//! Only the lighting check is purely baseline-relative. Distance and angle
//! gate on both the paired diff and the check-in's absolute value, while
//! background and expression gate on the check-in alone. This asymmetry is
//! intentional and covered by tests; raise it with product before changing.

use serde::{Deserialize, Serialize};

use crate::condition::ConditionProfile;
use crate::error::CoreError;
use crate::threshold_validation::{validate_percent_range, validate_positive, validate_unit_range};

// ---------------------------------------------------------------------------
// Default thresholds
// ---------------------------------------------------------------------------

/// Maximum lighting-score difference (exclusive).
pub const LIGHTING_MAX_DIFF: f64 = 0.2;
/// Maximum face-size difference in percentage points (exclusive).
pub const FACE_SIZE_MAX_DIFF: f64 = 10.0;
/// Lower bound of the accepted check-in face size (inclusive).
pub const FACE_SIZE_MIN_PERCENT: f64 = 40.0;
/// Upper bound of the accepted check-in face size (inclusive).
pub const FACE_SIZE_MAX_PERCENT: f64 = 60.0;
/// Maximum pose-deviation difference in degrees (exclusive).
pub const POSE_MAX_DIFF_DEGREES: f64 = 10.0;
/// Maximum check-in pose deviation in degrees (exclusive).
pub const POSE_MAX_DEGREES: f64 = 10.0;
/// Maximum check-in background clutter (exclusive).
pub const CLUTTER_MAX: f64 = 0.3;

/// Number of checks in a report.
pub const CHECK_COUNT: usize = 5;

/// Check name constants for logging and analytics.
pub const CHECK_LIGHTING: &str = "lighting";
pub const CHECK_DISTANCE: &str = "distance";
pub const CHECK_ANGLE: &str = "angle";
pub const CHECK_BACKGROUND: &str = "background";
pub const CHECK_EXPRESSION: &str = "expression";

// ---------------------------------------------------------------------------
// ComparisonThresholds
// ---------------------------------------------------------------------------

/// Tolerances applied by [`compare_with`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonThresholds {
    pub lighting_max_diff: f64,
    pub face_size_max_diff: f64,
    pub face_size_min_percent: f64,
    pub face_size_max_percent: f64,
    pub pose_max_diff_degrees: f64,
    pub pose_max_degrees: f64,
    pub clutter_max: f64,
}

impl Default for ComparisonThresholds {
    fn default() -> Self {
        Self {
            lighting_max_diff: LIGHTING_MAX_DIFF,
            face_size_max_diff: FACE_SIZE_MAX_DIFF,
            face_size_min_percent: FACE_SIZE_MIN_PERCENT,
            face_size_max_percent: FACE_SIZE_MAX_PERCENT,
            pose_max_diff_degrees: POSE_MAX_DIFF_DEGREES,
            pose_max_degrees: POSE_MAX_DEGREES,
            clutter_max: CLUTTER_MAX,
        }
    }
}

impl ComparisonThresholds {
    /// Validate threshold values.
    ///
    /// Unit-scale tolerances must be in `[0.0, 1.0]`, face-size bounds in
    /// `[0, 100]` with `min <= max`, and the remaining tolerances positive.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_unit_range(self.lighting_max_diff, "lighting_max_diff")?;
        validate_unit_range(self.clutter_max, "clutter_max")?;
        validate_percent_range(self.face_size_min_percent, "face_size_min_percent")?;
        validate_percent_range(self.face_size_max_percent, "face_size_max_percent")?;
        validate_positive(self.face_size_max_diff, "face_size_max_diff")?;
        validate_positive(self.pose_max_diff_degrees, "pose_max_diff_degrees")?;
        validate_positive(self.pose_max_degrees, "pose_max_degrees")?;

        if self.face_size_min_percent > self.face_size_max_percent {
            return Err(CoreError::Validation(format!(
                "face_size_min_percent ({}) must be <= face_size_max_percent ({})",
                self.face_size_min_percent, self.face_size_max_percent
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Outcome of a single condition check.
///
/// `suggestion` is present exactly when `pass` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionCheck<T> {
    pub checkin: T,
    pub baseline: T,
    pub diff: f64,
    pub pass: bool,
    pub suggestion: Option<String>,
}

impl<T> ConditionCheck<T> {
    fn evaluate(
        checkin: T,
        baseline: T,
        diff: f64,
        pass: bool,
        suggest: impl FnOnce() -> String,
    ) -> Self {
        Self {
            checkin,
            baseline,
            diff,
            pass,
            suggestion: if pass { None } else { Some(suggest()) },
        }
    }
}

/// The five named checks of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionChecks {
    pub lighting: ConditionCheck<f64>,
    pub distance: ConditionCheck<f64>,
    pub angle: ConditionCheck<f64>,
    pub background: ConditionCheck<f64>,
    pub expression: ConditionCheck<bool>,
}

impl ConditionChecks {
    /// `(name, pass)` for every check, in report order.
    pub fn statuses(&self) -> [(&'static str, bool); CHECK_COUNT] {
        [
            (CHECK_LIGHTING, self.lighting.pass),
            (CHECK_DISTANCE, self.distance.pass),
            (CHECK_ANGLE, self.angle.pass),
            (CHECK_BACKGROUND, self.background.pass),
            (CHECK_EXPRESSION, self.expression.pass),
        ]
    }

    pub fn passed_count(&self) -> usize {
        self.statuses().iter().filter(|(_, pass)| *pass).count()
    }

    /// Names of the failing checks, in report order.
    pub fn failed(&self) -> Vec<&'static str> {
        self.statuses()
            .iter()
            .filter(|(_, pass)| !*pass)
            .map(|(name, _)| *name)
            .collect()
    }

    /// Suggestions of the failing checks, in report order.
    pub fn suggestions(&self) -> Vec<&str> {
        [
            self.lighting.suggestion.as_deref(),
            self.distance.suggestion.as_deref(),
            self.angle.suggestion.as_deref(),
            self.background.suggestion.as_deref(),
            self.expression.suggestion.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Vision-derived comparison of a check-in photo against its baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub checks: ConditionChecks,
    pub overall_valid: bool,
    /// Passing checks divided by [`CHECK_COUNT`].
    pub confidence_score: f64,
    pub baseline_profile: ConditionProfile,
    pub checkin_profile: ConditionProfile,
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// Compare two profiles using the default thresholds.
pub fn compare(baseline: &ConditionProfile, checkin: &ConditionProfile) -> VerificationReport {
    compare_with(&ComparisonThresholds::default(), baseline, checkin)
}

/// Compare two profiles using the given thresholds.
pub fn compare_with(
    thresholds: &ComparisonThresholds,
    baseline: &ConditionProfile,
    checkin: &ConditionProfile,
) -> VerificationReport {
    let checks = ConditionChecks {
        lighting: lighting_check(thresholds, baseline, checkin),
        distance: distance_check(thresholds, baseline, checkin),
        angle: angle_check(thresholds, baseline, checkin),
        background: background_check(thresholds, baseline, checkin),
        expression: expression_check(baseline, checkin),
    };

    let passed = checks.passed_count();

    VerificationReport {
        overall_valid: passed == CHECK_COUNT,
        confidence_score: passed as f64 / CHECK_COUNT as f64,
        checks,
        baseline_profile: baseline.clone(),
        checkin_profile: checkin.clone(),
    }
}

fn lighting_check(
    t: &ComparisonThresholds,
    baseline: &ConditionProfile,
    checkin: &ConditionProfile,
) -> ConditionCheck<f64> {
    let diff = (checkin.lighting_score - baseline.lighting_score).abs();
    ConditionCheck::evaluate(
        checkin.lighting_score,
        baseline.lighting_score,
        diff,
        diff < t.lighting_max_diff,
        || {
            format!(
                "Lighting differs from your baseline photo. Match the baseline lighting ({} light, score {:.1}).",
                baseline.lighting_quality.as_str(),
                baseline.lighting_score
            )
        },
    )
}

fn distance_check(
    t: &ComparisonThresholds,
    baseline: &ConditionProfile,
    checkin: &ConditionProfile,
) -> ConditionCheck<f64> {
    let size = checkin.face_size_percent;
    let diff = (size - baseline.face_size_percent).abs();
    let in_range = (t.face_size_min_percent..=t.face_size_max_percent).contains(&size);

    ConditionCheck::evaluate(
        size,
        baseline.face_size_percent,
        diff,
        diff < t.face_size_max_diff && in_range,
        || {
            let action = if size < t.face_size_min_percent {
                "Move closer to the camera"
            } else if size > t.face_size_max_percent {
                "Move further away from the camera"
            } else {
                "Adjust your distance to match your baseline framing"
            };
            format!(
                "{action}. Your face should fill about {:.0}% of the frame, as in your baseline photo.",
                baseline.face_size_percent
            )
        },
    )
}

fn angle_check(
    t: &ComparisonThresholds,
    baseline: &ConditionProfile,
    checkin: &ConditionProfile,
) -> ConditionCheck<f64> {
    let pose = checkin.pose_deviation_degrees;
    let diff = (pose - baseline.pose_deviation_degrees).abs();

    ConditionCheck::evaluate(
        pose,
        baseline.pose_deviation_degrees,
        diff,
        diff < t.pose_max_diff_degrees && pose < t.pose_max_degrees,
        || {
            format!(
                "Face the camera directly and keep your head level (baseline head angle {:.1}°, yours {:.1}°).",
                baseline.pose_deviation_degrees, pose
            )
        },
    )
}

fn background_check(
    t: &ComparisonThresholds,
    baseline: &ConditionProfile,
    checkin: &ConditionProfile,
) -> ConditionCheck<f64> {
    let clutter = checkin.background_clutter;
    ConditionCheck::evaluate(
        clutter,
        baseline.background_clutter,
        (clutter - baseline.background_clutter).abs(),
        clutter < t.clutter_max,
        || "Use a plain, uncluttered background such as a bare wall.".to_string(),
    )
}

fn expression_check(baseline: &ConditionProfile, checkin: &ConditionProfile) -> ConditionCheck<bool> {
    let diff = if checkin.expression_neutral == baseline.expression_neutral {
        0.0
    } else {
        1.0
    };
    ConditionCheck::evaluate(
        checkin.expression_neutral,
        baseline.expression_neutral,
        diff,
        checkin.expression_neutral,
        || "Keep a neutral, relaxed expression.".to_string(),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::LightingQuality;

    fn profile() -> ConditionProfile {
        ConditionProfile {
            lighting_score: 0.8,
            lighting_quality: LightingQuality::Good,
            face_size_percent: 50.0,
            pose_deviation_degrees: 2.0,
            roll_degrees: 2.0,
            pan_degrees: 0.0,
            tilt_degrees: 0.0,
            background_clutter: 0.1,
            expression_neutral: true,
        }
    }

    fn all_failing() -> ConditionProfile {
        ConditionProfile {
            lighting_score: 0.2,
            lighting_quality: LightingQuality::Poor,
            face_size_percent: 90.0,
            pose_deviation_degrees: 30.0,
            roll_degrees: 30.0,
            pan_degrees: 0.0,
            tilt_degrees: 0.0,
            background_clutter: 0.8,
            expression_neutral: false,
        }
    }

    fn assert_suggestions_match_failures(report: &VerificationReport) {
        let c = &report.checks;
        assert_eq!(c.lighting.pass, c.lighting.suggestion.is_none());
        assert_eq!(c.distance.pass, c.distance.suggestion.is_none());
        assert_eq!(c.angle.pass, c.angle.suggestion.is_none());
        assert_eq!(c.background.pass, c.background.suggestion.is_none());
        assert_eq!(c.expression.pass, c.expression.suggestion.is_none());
    }

    // -- scenarios ------------------------------------------------------------

    #[test]
    fn perfect_match_passes_everything() {
        let report = compare(&profile(), &profile());

        assert_eq!(report.checks.passed_count(), 5);
        assert!(report.overall_valid);
        assert_eq!(report.confidence_score, 1.0);
        assert!(report.checks.suggestions().is_empty());
        assert_suggestions_match_failures(&report);
    }

    #[test]
    fn bad_framing_fails_distance_only() {
        let checkin = ConditionProfile {
            face_size_percent: 75.0,
            ..profile()
        };
        let report = compare(&profile(), &checkin);

        assert!(!report.checks.distance.pass);
        assert_eq!(report.checks.distance.diff, 25.0);
        assert_eq!(report.checks.failed(), vec![CHECK_DISTANCE]);
        assert!(!report.overall_valid);
        assert_eq!(report.confidence_score, 0.8);

        let suggestion = report.checks.distance.suggestion.as_deref().unwrap();
        assert!(suggestion.contains("further away"));
        assert!(suggestion.contains("50%"));
    }

    #[test]
    fn too_small_face_suggests_moving_closer() {
        let baseline = ConditionProfile {
            face_size_percent: 35.0,
            ..profile()
        };
        let checkin = baseline.clone();
        let report = compare(&baseline, &checkin);

        assert!(!report.checks.distance.pass);
        assert!(report
            .checks
            .distance
            .suggestion
            .as_deref()
            .unwrap()
            .contains("closer"));
    }

    #[test]
    fn in_range_but_too_far_from_baseline_asks_to_match() {
        let baseline = ConditionProfile {
            face_size_percent: 60.0,
            ..profile()
        };
        let checkin = ConditionProfile {
            face_size_percent: 45.0,
            ..profile()
        };
        let report = compare(&baseline, &checkin);

        assert!(!report.checks.distance.pass);
        assert!(report
            .checks
            .distance
            .suggestion
            .as_deref()
            .unwrap()
            .contains("match your baseline"));
    }

    #[test]
    fn everything_failing_scores_zero() {
        let report = compare(&profile(), &all_failing());

        assert_eq!(report.checks.passed_count(), 0);
        assert_eq!(report.confidence_score, 0.0);
        assert!(!report.overall_valid);
        assert_eq!(report.checks.suggestions().len(), 5);
        assert_suggestions_match_failures(&report);
    }

    #[test]
    fn lighting_suggestion_echoes_baseline_quality() {
        let checkin = ConditionProfile {
            lighting_score: 0.5,
            lighting_quality: LightingQuality::Fair,
            ..profile()
        };
        let report = compare(&profile(), &checkin);

        assert!(!report.checks.lighting.pass);
        assert!(report
            .checks
            .lighting
            .suggestion
            .as_deref()
            .unwrap()
            .contains("good light"));
    }

    // -- properties -----------------------------------------------------------

    #[test]
    fn compare_is_deterministic() {
        let checkin = ConditionProfile {
            face_size_percent: 58.0,
            pose_deviation_degrees: 9.5,
            ..profile()
        };
        assert_eq!(compare(&profile(), &checkin), compare(&profile(), &checkin));
    }

    #[test]
    fn confidence_rises_in_fifths_as_checks_flip_to_pass() {
        let baseline = profile();
        let mut checkin = all_failing();
        let mut last = compare(&baseline, &checkin).confidence_score;
        assert_eq!(last, 0.0);

        let fixes: [fn(&mut ConditionProfile); 5] = [
            |p: &mut ConditionProfile| p.lighting_score = 0.8,
            |p: &mut ConditionProfile| p.face_size_percent = 50.0,
            |p: &mut ConditionProfile| p.pose_deviation_degrees = 2.0,
            |p: &mut ConditionProfile| p.background_clutter = 0.1,
            |p: &mut ConditionProfile| p.expression_neutral = true,
        ];

        for (i, fix) in fixes.iter().enumerate() {
            fix(&mut checkin);
            let report = compare(&baseline, &checkin);
            let expected = (i + 1) as f64 / 5.0;
            assert!(report.confidence_score > last);
            assert!((report.confidence_score - last - 0.2).abs() < 1e-12);
            assert_eq!(report.confidence_score, expected);
            assert_eq!(report.overall_valid, report.confidence_score == 1.0);
            last = report.confidence_score;
        }
        assert_eq!(last, 1.0);
    }

    #[test]
    fn face_size_range_is_inclusive() {
        for size in [40.0, 60.0] {
            let p = ConditionProfile {
                face_size_percent: size,
                ..profile()
            };
            assert!(compare(&p, &p).checks.distance.pass, "{size} should pass");
        }
        for size in [39.99, 60.01] {
            let p = ConditionProfile {
                face_size_percent: size,
                ..profile()
            };
            assert!(!compare(&p, &p).checks.distance.pass, "{size} should fail");
        }
    }

    #[test]
    fn diff_thresholds_are_exclusive() {
        let baseline = ConditionProfile {
            face_size_percent: 50.0,
            pose_deviation_degrees: 0.0,
            ..profile()
        };
        let checkin = ConditionProfile {
            face_size_percent: 60.0,
            pose_deviation_degrees: 9.0,
            ..profile()
        };
        let report = compare(&baseline, &checkin);
        assert!(!report.checks.distance.pass);
        assert!(report.checks.angle.pass);
    }

    #[test]
    fn angle_requires_small_absolute_pose() {
        let baseline = ConditionProfile {
            pose_deviation_degrees: 12.0,
            ..profile()
        };
        let checkin = ConditionProfile {
            pose_deviation_degrees: 10.0,
            ..profile()
        };
        let report = compare(&baseline, &checkin);
        assert_eq!(report.checks.angle.diff, 2.0);
        assert!(!report.checks.angle.pass);
    }

    #[test]
    fn lighting_check_is_symmetric() {
        let a = profile();
        let b = ConditionProfile {
            lighting_score: 0.5,
            lighting_quality: LightingQuality::Fair,
            ..profile()
        };
        assert_eq!(
            compare(&a, &b).checks.lighting.pass,
            compare(&b, &a).checks.lighting.pass
        );

        let c = ConditionProfile {
            lighting_score: 0.2,
            lighting_quality: LightingQuality::Poor,
            ..profile()
        };
        assert_eq!(
            compare(&a, &c).checks.lighting.pass,
            compare(&c, &a).checks.lighting.pass
        );
    }

    #[test]
    fn distance_check_is_not_symmetric() {
        let a = ConditionProfile {
            face_size_percent: 55.0,
            ..profile()
        };
        let b = ConditionProfile {
            face_size_percent: 62.0,
            ..profile()
        };
        assert!(compare(&b, &a).checks.distance.pass);
        assert!(!compare(&a, &b).checks.distance.pass);
    }

    #[test]
    fn angle_check_is_not_symmetric() {
        let a = ConditionProfile {
            pose_deviation_degrees: 4.0,
            ..profile()
        };
        let b = ConditionProfile {
            pose_deviation_degrees: 11.0,
            ..profile()
        };
        assert!(compare(&b, &a).checks.angle.pass);
        assert!(!compare(&a, &b).checks.angle.pass);
    }

    #[test]
    fn background_check_ignores_baseline() {
        let clean = profile();
        let cluttered = ConditionProfile {
            background_clutter: 0.6,
            ..profile()
        };
        assert!(compare(&cluttered, &clean).checks.background.pass);
        assert!(!compare(&clean, &cluttered).checks.background.pass);
        assert!((compare(&cluttered, &clean).checks.background.diff - 0.5).abs() < 1e-12);
    }

    #[test]
    fn expression_check_ignores_baseline() {
        let neutral = profile();
        let smiling = ConditionProfile {
            expression_neutral: false,
            ..profile()
        };
        let report = compare(&smiling, &neutral);
        assert!(report.checks.expression.pass);
        assert_eq!(report.checks.expression.diff, 1.0);
        assert!(!compare(&neutral, &smiling).checks.expression.pass);
    }

    #[test]
    fn report_embeds_both_profiles() {
        let checkin = ConditionProfile {
            face_size_percent: 45.0,
            ..profile()
        };
        let report = compare(&profile(), &checkin);
        assert_eq!(report.baseline_profile, profile());
        assert_eq!(report.checkin_profile, checkin);
    }

    // -- thresholds -----------------------------------------------------------

    #[test]
    fn custom_thresholds_widen_tolerance() {
        let thresholds = ComparisonThresholds {
            face_size_max_percent: 80.0,
            face_size_max_diff: 30.0,
            ..ComparisonThresholds::default()
        };
        let checkin = ConditionProfile {
            face_size_percent: 75.0,
            ..profile()
        };
        assert!(compare_with(&thresholds, &profile(), &checkin).overall_valid);
    }

    #[test]
    fn default_thresholds_are_valid() {
        assert!(ComparisonThresholds::default().validate().is_ok());
    }

    #[test]
    fn invalid_thresholds_rejected() {
        let inverted = ComparisonThresholds {
            face_size_min_percent: 70.0,
            face_size_max_percent: 30.0,
            ..ComparisonThresholds::default()
        };
        assert!(inverted.validate().is_err());

        let out_of_unit = ComparisonThresholds {
            clutter_max: 1.5,
            ..ComparisonThresholds::default()
        };
        assert!(out_of_unit.validate().is_err());

        let negative = ComparisonThresholds {
            pose_max_degrees: -1.0,
            ..ComparisonThresholds::default()
        };
        assert!(negative.validate().is_err());
    }

    // -- serialization --------------------------------------------------------

    #[test]
    fn passing_check_serializes_null_suggestion() {
        let report = compare(&profile(), &profile());
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["checks"]["lighting"]["suggestion"].is_null());
        assert_eq!(json["checks"]["expression"]["checkin"], true);
        assert_eq!(json["confidence_score"], 1.0);
    }
}
