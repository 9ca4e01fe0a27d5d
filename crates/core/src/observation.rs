//! Raw per-image observations as supplied by a vision provider.
//!
//! These are the provider-neutral shapes the condition reducers consume.
//! Wire formats are converted into them at the provider boundary.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Likelihood
// ---------------------------------------------------------------------------

/// Provider likelihood tier for a facial attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Likelihood {
    /// The provider could not classify the attribute.
    #[default]
    Unknown,
    VeryUnlikely,
    Unlikely,
    Possible,
    Likely,
    VeryLikely,
}

impl Likelihood {
    /// `true` only for the lowest tier.
    pub fn is_lowest(self) -> bool {
        self == Self::VeryUnlikely
    }

    /// `VeryUnlikely` or `Unlikely`.
    pub fn is_unlikely(self) -> bool {
        matches!(self, Self::VeryUnlikely | Self::Unlikely)
    }

    /// `Likely` or `VeryLikely`.
    pub fn is_likely(self) -> bool {
        matches!(self, Self::Likely | Self::VeryLikely)
    }
}

// ---------------------------------------------------------------------------
// Face observation
// ---------------------------------------------------------------------------

/// A polygon vertex in image pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

impl Vertex {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Four-vertex bounding polygon around a detected face.
///
/// Vertices are ordered around the polygon, so `vertices[0]` and
/// `vertices[2]` are opposite corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingPoly {
    pub vertices: [Vertex; 4],
}

impl BoundingPoly {
    /// Axis-aligned rectangle from `(left, top)` to `(right, bottom)`.
    pub fn rect(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            vertices: [
                Vertex::new(left, top),
                Vertex::new(right, top),
                Vertex::new(right, bottom),
                Vertex::new(left, bottom),
            ],
        }
    }

    /// Width times height, measured between opposite corners.
    pub fn area(&self) -> f64 {
        let [a, _, c, _] = self.vertices;
        (c.x - a.x).abs() * (c.y - a.y).abs()
    }
}

/// Expression likelihoods for a single face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExpressionLikelihoods {
    pub joy: Likelihood,
    pub sorrow: Likelihood,
    pub anger: Likelihood,
    pub surprise: Likelihood,
}

impl ExpressionLikelihoods {
    /// Every expression at the lowest tier.
    pub fn neutral() -> Self {
        Self {
            joy: Likelihood::VeryUnlikely,
            sorrow: Likelihood::VeryUnlikely,
            anger: Likelihood::VeryUnlikely,
            surprise: Likelihood::VeryUnlikely,
        }
    }

    pub fn all(&self) -> [Likelihood; 4] {
        [self.joy, self.sorrow, self.anger, self.surprise]
    }
}

/// One detected face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceObservation {
    pub bounding_poly: BoundingPoly,
    /// Signed angles in degrees.
    pub roll_angle: f64,
    pub pan_angle: f64,
    pub tilt_angle: f64,
    pub under_exposed: Likelihood,
    pub expression: ExpressionLikelihoods,
}

// ---------------------------------------------------------------------------
// Scene label
// ---------------------------------------------------------------------------

/// A weighted scene tag from general-purpose label detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneLabel {
    pub description: String,
    pub score: f32,
}

impl SceneLabel {
    pub fn new(description: impl Into<String>, score: f32) -> Self {
        Self {
            description: description.into(),
            score,
        }
    }
}
