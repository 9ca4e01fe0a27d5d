//! REST client for the Cloud Vision `images:annotate` endpoint.
//!
//! Implements [`VisionProvider`]. A full analysis sends face and label
//! detection as two features of one request, so each image is fetched or
//! read once. Remote image references are passed through as source URIs;
//! local files are read and sent inline as base64.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use checkin_core::image_ref::ImageRef;
use checkin_core::observation::{FaceObservation, SceneLabel};

use crate::messages::{
    AnnotateImageResponse, AnnotateRequestBody, AnnotateResponseBody, Feature, ImagePayload,
    ImageSource, FEATURE_FACE_DETECTION, FEATURE_LABEL_DETECTION,
};
use crate::provider::{VisionError, VisionProvider};

/// Public Cloud Vision endpoint.
pub const DEFAULT_API_URL: &str = "https://vision.googleapis.com";
/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Face results requested per image. Must exceed 1 so that a second face
/// in frame is reported rather than silently dropped.
pub const DEFAULT_MAX_FACES: u32 = 10;
/// Label results requested per image.
pub const DEFAULT_MAX_LABELS: u32 = 20;

/// Connection settings for [`CloudVisionApi`].
#[derive(Debug, Clone)]
pub struct CloudVisionConfig {
    /// Base HTTP URL, e.g. `https://vision.googleapis.com`.
    pub api_url: String,
    pub api_key: String,
    pub timeout: Duration,
    pub max_faces: u32,
    pub max_labels: u32,
}

impl CloudVisionConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
            max_faces: DEFAULT_MAX_FACES,
            max_labels: DEFAULT_MAX_LABELS,
        }
    }
}

/// HTTP client for a Cloud Vision compatible endpoint.
pub struct CloudVisionApi {
    client: reqwest::Client,
    config: CloudVisionConfig,
}

impl CloudVisionApi {
    /// Build a client with its own connection pool and the configured timeout.
    pub fn new(config: CloudVisionConfig) -> Result<Self, VisionError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    ///
    /// The caller's client timeout applies instead of `config.timeout`.
    pub fn with_client(client: reqwest::Client, config: CloudVisionConfig) -> Self {
        Self { client, config }
    }

    fn annotate_url(&self) -> String {
        format!("{}/v1/images:annotate", self.config.api_url.trim_end_matches('/'))
    }

    fn face_feature(&self) -> Feature {
        Feature::new(FEATURE_FACE_DETECTION, self.config.max_faces)
    }

    fn label_feature(&self) -> Feature {
        Feature::new(FEATURE_LABEL_DETECTION, self.config.max_labels)
    }

    /// Run one annotate request for one image.
    async fn annotate(
        &self,
        image: &ImageRef,
        features: Vec<Feature>,
    ) -> Result<AnnotateImageResponse, VisionError> {
        let feature_count = features.len();
        let body = AnnotateRequestBody::single(image_payload(image).await?, features);

        tracing::debug!(image = %image, feature_count, "Sending annotate request");

        let response = self
            .client
            .post(self.annotate_url())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await?.into_single()
    }

    /// Check the status code and deserialize the JSON body.
    async fn parse_response(response: reqwest::Response) -> Result<AnnotateResponseBody, VisionError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VisionError::Api {
                status: status.as_u16(),
                body,
            });
        }
        decode_body(&response.bytes().await?)
    }
}

/// Deserialize a successful response body. A body that is not the
/// expected JSON is [`VisionError::Malformed`], not a transport failure.
fn decode_body(bytes: &[u8]) -> Result<AnnotateResponseBody, VisionError> {
    serde_json::from_slice(bytes)
        .map_err(|e| VisionError::Malformed(format!("undecodable annotate response: {e}")))
}

fn faces_from(response: &mut AnnotateImageResponse) -> Result<Vec<FaceObservation>, VisionError> {
    std::mem::take(&mut response.face_annotations)
        .into_iter()
        .map(FaceObservation::try_from)
        .collect()
}

fn labels_from(response: &mut AnnotateImageResponse) -> Vec<SceneLabel> {
    std::mem::take(&mut response.label_annotations)
        .into_iter()
        .map(SceneLabel::from)
        .collect()
}

/// Build the image part of the request body.
async fn image_payload(image: &ImageRef) -> Result<ImagePayload, VisionError> {
    match image {
        ImageRef::Uri(uri) => Ok(ImagePayload {
            content: None,
            source: Some(ImageSource {
                image_uri: uri.clone(),
            }),
        }),
        ImageRef::Path(path) => {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|source| VisionError::Image {
                    path: path.clone(),
                    source,
                })?;
            Ok(ImagePayload {
                content: Some(BASE64.encode(bytes)),
                source: None,
            })
        }
    }
}

#[async_trait]
impl VisionProvider for CloudVisionApi {
    async fn detect_faces(&self, image: &ImageRef) -> Result<Vec<FaceObservation>, VisionError> {
        let mut response = self.annotate(image, vec![self.face_feature()]).await?;
        faces_from(&mut response)
    }

    async fn detect_labels(&self, image: &ImageRef) -> Result<Vec<SceneLabel>, VisionError> {
        let mut response = self.annotate(image, vec![self.label_feature()]).await?;
        Ok(labels_from(&mut response))
    }

    async fn detect_all(
        &self,
        image: &ImageRef,
    ) -> Result<(Vec<FaceObservation>, Vec<SceneLabel>), VisionError> {
        let mut response = self
            .annotate(image, vec![self.face_feature(), self.label_feature()])
            .await?;
        Ok((faces_from(&mut response)?, labels_from(&mut response)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::path::PathBuf;

    #[test]
    fn annotate_url_tolerates_trailing_slash() {
        let mut config = CloudVisionConfig::new("key");
        config.api_url = "http://localhost:9000/".into();
        let api = CloudVisionApi::with_client(reqwest::Client::new(), config);
        assert_eq!(api.annotate_url(), "http://localhost:9000/v1/images:annotate");
    }

    #[test]
    fn config_defaults() {
        let config = CloudVisionConfig::new("key");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.max_faces, DEFAULT_MAX_FACES);
        assert!(config.max_faces > 1);
    }

    #[test]
    fn undecodable_success_body_is_malformed() {
        assert_matches!(
            decode_body(b"<html>gateway page</html>"),
            Err(VisionError::Malformed(ref msg)) if msg.contains("undecodable")
        );
        assert_matches!(
            decode_body(br#"{"responses": [{}]}"#),
            Ok(body) if body.responses.len() == 1
        );
    }

    #[test]
    fn batched_response_yields_faces_and_labels() {
        let mut response = decode_body(
            br#"{"responses": [{
                "faceAnnotations": [{"boundingPoly": {"vertices": [
                    {"x": 150, "y": 150}, {"x": 850, "y": 150},
                    {"x": 850, "y": 850}, {"x": 150, "y": 850}
                ]}}],
                "labelAnnotations": [{"description": "Wall", "score": 0.8}]
            }]}"#,
        )
        .unwrap()
        .into_single()
        .unwrap();

        assert_eq!(faces_from(&mut response).unwrap().len(), 1);
        assert_eq!(labels_from(&mut response)[0].description, "Wall");
    }

    #[test]
    fn features_carry_configured_limits() {
        let mut config = CloudVisionConfig::new("key");
        config.max_labels = 7;
        let api = CloudVisionApi::with_client(reqwest::Client::new(), config);

        assert_eq!(api.face_feature().max_results, DEFAULT_MAX_FACES);
        assert_eq!(api.label_feature().max_results, 7);
        assert_eq!(api.label_feature().feature_type, FEATURE_LABEL_DETECTION);
    }

    #[tokio::test]
    async fn remote_images_are_sent_by_uri() {
        let payload = image_payload(&ImageRef::Uri("gs://b/p.jpg".into()))
            .await
            .unwrap();
        assert!(payload.content.is_none());
        assert_eq!(payload.source.unwrap().image_uri, "gs://b/p.jpg");
    }

    #[tokio::test]
    async fn local_images_are_inlined_as_base64() {
        let path = std::env::temp_dir().join(format!("checkin-vision-{}.bin", std::process::id()));
        tokio::fs::write(&path, b"\xff\xd8\xff").await.unwrap();

        let payload = image_payload(&ImageRef::Path(path.clone())).await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(payload.content.as_deref(), Some("/9j/"));
        assert!(payload.source.is_none());
    }

    #[tokio::test]
    async fn unreadable_local_image_is_an_image_error() {
        let missing = PathBuf::from("/definitely/not/here/checkin.jpg");
        assert_matches!(
            image_payload(&ImageRef::Path(missing)).await,
            Err(VisionError::Image { .. })
        );
    }
}
