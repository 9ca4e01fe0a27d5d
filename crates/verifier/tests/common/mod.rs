use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use checkin_core::image_ref::ImageRef;
use checkin_core::observation::{
    BoundingPoly, ExpressionLikelihoods, FaceObservation, Likelihood, SceneLabel,
};
use checkin_vision::{VisionError, VisionProvider};

pub const BASELINE: &str = "gs://photos/user-1/baseline.jpg";
pub const CHECKIN: &str = "gs://photos/user-1/checkin-07.jpg";

/// What the fake provider returns for one image.
#[derive(Clone)]
pub enum Scripted {
    Detected {
        faces: Vec<FaceObservation>,
        labels: Vec<SceneLabel>,
    },
    Outage(&'static str),
}

/// In-memory vision provider keyed by image reference.
///
/// Unknown images behave like an outage. Every call is counted.
#[derive(Default)]
pub struct FakeProvider {
    images: HashMap<String, Scripted>,
    face_calls: AtomicUsize,
    label_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, image: &str, scripted: Scripted) -> Self {
        self.images.insert(image.to_string(), scripted);
        self
    }

    pub fn calls(&self) -> usize {
        self.face_calls.load(Ordering::SeqCst) + self.label_calls.load(Ordering::SeqCst)
    }

    fn lookup(&self, image: &ImageRef) -> Result<&Scripted, VisionError> {
        match self.images.get(&image.to_string()) {
            Some(Scripted::Outage(msg)) => Err(VisionError::Unavailable(msg.to_string())),
            Some(scripted) => Ok(scripted),
            None => Err(VisionError::Unavailable(format!("no script for {image}"))),
        }
    }
}

#[async_trait]
impl VisionProvider for FakeProvider {
    async fn detect_faces(&self, image: &ImageRef) -> Result<Vec<FaceObservation>, VisionError> {
        self.face_calls.fetch_add(1, Ordering::SeqCst);
        match self.lookup(image)? {
            Scripted::Detected { faces, .. } => Ok(faces.clone()),
            Scripted::Outage(_) => unreachable!(),
        }
    }

    async fn detect_labels(&self, image: &ImageRef) -> Result<Vec<SceneLabel>, VisionError> {
        self.label_calls.fetch_add(1, Ordering::SeqCst);
        match self.lookup(image)? {
            Scripted::Detected { labels, .. } => Ok(labels.clone()),
            Scripted::Outage(_) => unreachable!(),
        }
    }
}

/// A well-lit, centred, neutral face filling 49% of the assumed frame.
pub fn good_face() -> FaceObservation {
    FaceObservation {
        bounding_poly: BoundingPoly::rect(150.0, 150.0, 850.0, 850.0),
        roll_angle: 1.0,
        pan_angle: -1.0,
        tilt_angle: 0.5,
        under_exposed: Likelihood::VeryUnlikely,
        expression: ExpressionLikelihoods::neutral(),
    }
}

/// Same face, but close enough to fill ~81% of the assumed frame.
pub fn close_up_face() -> FaceObservation {
    FaceObservation {
        bounding_poly: BoundingPoly::rect(50.0, 50.0, 950.0, 950.0),
        ..good_face()
    }
}

pub fn plain_background() -> Vec<SceneLabel> {
    vec![
        SceneLabel::new("Face", 0.97),
        SceneLabel::new("Chin", 0.91),
    ]
}

pub fn detected(face: FaceObservation) -> Scripted {
    Scripted::Detected {
        faces: vec![face],
        labels: plain_background(),
    }
}
