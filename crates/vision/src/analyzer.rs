//! Photo condition analysis.
//!
//! [`PhotoConditionAnalyzer`] asks the injected [`VisionProvider`] for faces
//! and labels in one image and reduces them to a [`ConditionProfile`].

use checkin_core::condition::ConditionProfile;
use checkin_core::image_ref::ImageRef;

use crate::provider::{VisionError, VisionProvider};

/// Reasons an image could not be reduced to a condition profile.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("No face detected in image")]
    NoFaceDetected,

    #[error("Multiple faces detected in image ({count})")]
    MultipleFacesDetected { count: usize },

    #[error(transparent)]
    Provider(#[from] VisionError),
}

/// Reduces provider output for one image into a [`ConditionProfile`].
pub struct PhotoConditionAnalyzer<P> {
    provider: P,
}

impl<P: VisionProvider> PhotoConditionAnalyzer<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Analyze a single image.
    ///
    /// Faces and labels come from one [`VisionProvider::detect_all`] call.
    /// Exactly one face must be present; zero or several faces fail the
    /// image outright.
    pub async fn analyze(&self, image: &ImageRef) -> Result<ConditionProfile, AnalysisError> {
        let (faces, labels) = self.provider.detect_all(image).await?;

        let face = match faces.as_slice() {
            [face] => face,
            [] => {
                tracing::warn!(image = %image, "No face detected");
                return Err(AnalysisError::NoFaceDetected);
            }
            many => {
                tracing::warn!(image = %image, count = many.len(), "Multiple faces detected");
                return Err(AnalysisError::MultipleFacesDetected { count: many.len() });
            }
        };

        let profile = ConditionProfile::from_observations(face, &labels);

        tracing::debug!(
            image = %image,
            lighting_score = profile.lighting_score,
            face_size_percent = profile.face_size_percent,
            pose_deviation_degrees = profile.pose_deviation_degrees,
            background_clutter = profile.background_clutter,
            expression_neutral = profile.expression_neutral,
            label_count = labels.len(),
            "Condition profile computed",
        );

        Ok(profile)
    }
}
