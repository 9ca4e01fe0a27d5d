//! The vision provider seam.
//!
//! [`VisionProvider`] is the only way the analyzer talks to face and label
//! detection. Implementations are constructed by the caller and injected,
//! so tests can substitute a fake.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use checkin_core::image_ref::ImageRef;
use checkin_core::observation::{FaceObservation, SceneLabel};

/// Errors from a vision provider call.
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("Vision request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Vision API error ({status}): {body}")]
    Api {
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The provider accepted the request but failed on this image.
    #[error("Vision annotate error ({code}): {message}")]
    Annotate { code: i32, message: String },

    /// A local image could not be read.
    #[error("Failed to read image {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The provider response did not have the expected shape.
    #[error("Malformed vision response: {0}")]
    Malformed(String),

    /// Any other provider-side failure.
    #[error("Vision provider unavailable: {0}")]
    Unavailable(String),
}

/// Face and label detection for a single image.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Every face detected in the image, in provider order.
    async fn detect_faces(&self, image: &ImageRef) -> Result<Vec<FaceObservation>, VisionError>;

    /// General-purpose scene labels for the image.
    async fn detect_labels(&self, image: &ImageRef) -> Result<Vec<SceneLabel>, VisionError>;

    /// Faces and labels for one image.
    ///
    /// Issues both calls concurrently. Providers that can annotate several
    /// features in one request override this.
    async fn detect_all(
        &self,
        image: &ImageRef,
    ) -> Result<(Vec<FaceObservation>, Vec<SceneLabel>), VisionError> {
        futures::future::try_join(self.detect_faces(image), self.detect_labels(image)).await
    }
}

#[async_trait]
impl<P: VisionProvider + ?Sized> VisionProvider for Arc<P> {
    async fn detect_faces(&self, image: &ImageRef) -> Result<Vec<FaceObservation>, VisionError> {
        (**self).detect_faces(image).await
    }

    async fn detect_labels(&self, image: &ImageRef) -> Result<Vec<SceneLabel>, VisionError> {
        (**self).detect_labels(image).await
    }

    async fn detect_all(
        &self,
        image: &ImageRef,
    ) -> Result<(Vec<FaceObservation>, Vec<SceneLabel>), VisionError> {
        (**self).detect_all(image).await
    }
}
