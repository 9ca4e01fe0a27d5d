//! Condition profile reduction.
//!
//! Reduces one image's face observation and scene labels into a normalized
//! [`ConditionProfile`]: lighting, relative face size, pose deviation,
//! background clutter, and expression neutrality.

use serde::{Deserialize, Serialize};

use crate::observation::{ExpressionLikelihoods, FaceObservation, Likelihood, SceneLabel};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lighting score when under-exposure is unlikely.
pub const LIGHTING_SCORE_WELL_EXPOSED: f64 = 0.8;
/// Lighting score when under-exposure is likely.
pub const LIGHTING_SCORE_UNDER_EXPOSED: f64 = 0.2;
/// Lighting score for `Possible` or `Unknown` exposure.
pub const LIGHTING_SCORE_UNCERTAIN: f64 = 0.5;

/// Scores strictly above this are `good`.
pub const LIGHTING_GOOD_ABOVE: f64 = 0.7;
/// Scores strictly above this (and not `good`) are `fair`.
pub const LIGHTING_FAIR_ABOVE: f64 = 0.4;

/// Assumed frame width in pixels for face-size normalization.
pub const ASSUMED_FRAME_WIDTH_PX: f64 = 1000.0;
/// Assumed frame height in pixels for face-size normalization.
pub const ASSUMED_FRAME_HEIGHT_PX: f64 = 1000.0;

/// Reference frame area the face bounding box is measured against.
///
/// Known limitation: the vision provider does not report image dimensions,
/// so face size is a percentage of this fixed area rather than of the real
/// frame. It is only meaningful relative to other photos measured the same
/// way.
pub const ASSUMED_FRAME_AREA_PX: f64 = ASSUMED_FRAME_WIDTH_PX * ASSUMED_FRAME_HEIGHT_PX;

/// Label substrings (case-insensitive) that indicate a busy background.
pub const CLUTTER_INDICATORS: &[&str] = &["Furniture", "Room", "Indoor", "Wall", "Door", "Window"];

/// Number of indicator labels that saturates the clutter score at 1.0.
pub const CLUTTER_SATURATION_COUNT: usize = 5;

// ---------------------------------------------------------------------------
// LightingQuality
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightingQuality {
    Good,
    Fair,
    Poor,
}

impl LightingQuality {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        }
    }
}

// ---------------------------------------------------------------------------
// Reducers
// ---------------------------------------------------------------------------

/// Map the under-exposure likelihood to a lighting score.
pub fn lighting_score(under_exposed: Likelihood) -> f64 {
    if under_exposed.is_unlikely() {
        LIGHTING_SCORE_WELL_EXPOSED
    } else if under_exposed.is_likely() {
        LIGHTING_SCORE_UNDER_EXPOSED
    } else {
        LIGHTING_SCORE_UNCERTAIN
    }
}

/// Classify a lighting score.
///
/// - `Good`: score > 0.7
/// - `Fair`: score > 0.4
/// - `Poor`: otherwise
pub fn classify_lighting(score: f64) -> LightingQuality {
    if score > LIGHTING_GOOD_ABOVE {
        LightingQuality::Good
    } else if score > LIGHTING_FAIR_ABOVE {
        LightingQuality::Fair
    } else {
        LightingQuality::Poor
    }
}

/// Face bounding-box area as a percentage of [`ASSUMED_FRAME_AREA_PX`],
/// clamped to `[0, 100]`.
pub fn face_size_percent(face: &FaceObservation) -> f64 {
    (face.bounding_poly.area() / ASSUMED_FRAME_AREA_PX * 100.0).clamp(0.0, 100.0)
}

/// Euclidean norm of the absolute roll, pan and tilt angles.
pub fn pose_deviation(roll: f64, pan: f64, tilt: f64) -> f64 {
    let (roll, pan, tilt) = (roll.abs(), pan.abs(), tilt.abs());
    (roll * roll + pan * pan + tilt * tilt).sqrt()
}

/// `true` when joy, sorrow, anger and surprise are all at the lowest tier.
pub fn is_expression_neutral(expression: &ExpressionLikelihoods) -> bool {
    expression.all().iter().all(|l| l.is_lowest())
}

/// Fraction of [`CLUTTER_SATURATION_COUNT`] reached by indicator labels.
///
/// A label counts once even if it matches several indicators.
pub fn background_clutter(labels: &[SceneLabel]) -> f64 {
    let count = labels
        .iter()
        .filter(|label| {
            let description = label.description.to_lowercase();
            CLUTTER_INDICATORS
                .iter()
                .any(|indicator| description.contains(&indicator.to_lowercase()))
        })
        .count();

    (count as f64 / CLUTTER_SATURATION_COUNT as f64).clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// ConditionProfile
// ---------------------------------------------------------------------------

/// Normalized capture conditions for a single image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionProfile {
    pub lighting_score: f64,
    pub lighting_quality: LightingQuality,
    pub face_size_percent: f64,
    pub pose_deviation_degrees: f64,
    pub roll_degrees: f64,
    pub pan_degrees: f64,
    pub tilt_degrees: f64,
    pub background_clutter: f64,
    pub expression_neutral: bool,
}

impl ConditionProfile {
    /// Reduce a single face observation and the image's labels.
    pub fn from_observations(face: &FaceObservation, labels: &[SceneLabel]) -> Self {
        let lighting_score = lighting_score(face.under_exposed);

        Self {
            lighting_score,
            lighting_quality: classify_lighting(lighting_score),
            face_size_percent: face_size_percent(face),
            pose_deviation_degrees: pose_deviation(
                face.roll_angle,
                face.pan_angle,
                face.tilt_angle,
            ),
            roll_degrees: face.roll_angle.abs(),
            pan_degrees: face.pan_angle.abs(),
            tilt_degrees: face.tilt_angle.abs(),
            background_clutter: background_clutter(labels),
            expression_neutral: is_expression_neutral(&face.expression),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
