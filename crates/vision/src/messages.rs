//! Wire types for the `images:annotate` endpoint.
//!
//! The provider omits fields that hold their zero value (a vertex at `x = 0`
//! has no `x` key), so every numeric field defaults when absent.

use serde::{Deserialize, Serialize};

use checkin_core::observation::{
    BoundingPoly, ExpressionLikelihoods, FaceObservation, Likelihood, SceneLabel, Vertex,
};

use crate::provider::VisionError;

/// Feature type for face detection.
pub const FEATURE_FACE_DETECTION: &str = "FACE_DETECTION";
/// Feature type for label detection.
pub const FEATURE_LABEL_DETECTION: &str = "LABEL_DETECTION";

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct AnnotateRequestBody {
    pub requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Serialize)]
pub struct AnnotateImageRequest {
    pub image: ImagePayload,
    pub features: Vec<Feature>,
}

/// Either inline base64 content or a source URI.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ImageSource>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSource {
    pub image_uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    #[serde(rename = "type")]
    pub feature_type: &'static str,
    pub max_results: u32,
}

impl Feature {
    pub fn new(feature_type: &'static str, max_results: u32) -> Self {
        Self {
            feature_type,
            max_results,
        }
    }
}

impl AnnotateRequestBody {
    /// A single-image request for the given features.
    pub fn single(image: ImagePayload, features: Vec<Feature>) -> Self {
        Self {
            requests: vec![AnnotateImageRequest { image, features }],
        }
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct AnnotateResponseBody {
    #[serde(default)]
    pub responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotateImageResponse {
    #[serde(default)]
    pub face_annotations: Vec<FaceAnnotation>,
    #[serde(default)]
    pub label_annotations: Vec<EntityAnnotation>,
    pub error: Option<Status>,
}

#[derive(Debug, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceAnnotation {
    pub bounding_poly: Option<WirePoly>,
    #[serde(default)]
    pub roll_angle: f64,
    #[serde(default)]
    pub pan_angle: f64,
    #[serde(default)]
    pub tilt_angle: f64,
    #[serde(default)]
    pub joy_likelihood: Likelihood,
    #[serde(default)]
    pub sorrow_likelihood: Likelihood,
    #[serde(default)]
    pub anger_likelihood: Likelihood,
    #[serde(default)]
    pub surprise_likelihood: Likelihood,
    #[serde(default)]
    pub under_exposed_likelihood: Likelihood,
}

#[derive(Debug, Deserialize)]
pub struct WirePoly {
    #[serde(default)]
    pub vertices: Vec<WireVertex>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WireVertex {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

#[derive(Debug, Deserialize)]
pub struct EntityAnnotation {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub score: f32,
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

impl AnnotateResponseBody {
    /// The single per-image response, or the per-image error it carries.
    pub fn into_single(self) -> Result<AnnotateImageResponse, VisionError> {
        let response = self.responses.into_iter().next().ok_or_else(|| {
            VisionError::Malformed("annotate response contained no results".to_string())
        })?;

        if let Some(status) = response.error.as_ref().filter(|s| s.code != 0) {
            return Err(VisionError::Annotate {
                code: status.code,
                message: status.message.clone(),
            });
        }
        Ok(response)
    }
}

impl TryFrom<FaceAnnotation> for FaceObservation {
    type Error = VisionError;

    fn try_from(face: FaceAnnotation) -> Result<Self, Self::Error> {
        let poly = face
            .bounding_poly
            .ok_or_else(|| VisionError::Malformed("face annotation has no boundingPoly".into()))?;

        let vertices: [WireVertex; 4] = poly.vertices.try_into().map_err(|v: Vec<WireVertex>| {
            VisionError::Malformed(format!(
                "face boundingPoly has {} vertices, expected 4",
                v.len()
            ))
        })?;

        Ok(FaceObservation {
            bounding_poly: BoundingPoly {
                vertices: vertices.map(|v| Vertex::new(v.x, v.y)),
            },
            roll_angle: face.roll_angle,
            pan_angle: face.pan_angle,
            tilt_angle: face.tilt_angle,
            under_exposed: face.under_exposed_likelihood,
            expression: ExpressionLikelihoods {
                joy: face.joy_likelihood,
                sorrow: face.sorrow_likelihood,
                anger: face.anger_likelihood,
                surprise: face.surprise_likelihood,
            },
        })
    }
}

impl From<EntityAnnotation> for SceneLabel {
    fn from(label: EntityAnnotation) -> Self {
        SceneLabel::new(label.description, label.score)
    }
}
