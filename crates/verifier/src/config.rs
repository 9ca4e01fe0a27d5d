use std::str::FromStr;
use std::time::Duration;

use checkin_core::comparison::ComparisonThresholds;
use checkin_vision::api::{DEFAULT_API_URL, DEFAULT_MAX_FACES, DEFAULT_MAX_LABELS};
use checkin_vision::CloudVisionConfig;

use crate::error::VerifyError;

/// Default vision request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Verifier configuration loaded from environment variables.
///
/// All fields except the API key have defaults. Threshold overrides are
/// validated before the config is returned.
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Vision base URL (default: `https://vision.googleapis.com`).
    pub vision_api_url: String,
    /// Vision API key. Required to build the REST provider.
    pub vision_api_key: Option<String>,
    /// Per-request vision timeout in seconds (default: `30`).
    pub vision_timeout_secs: u64,
    /// Face results requested per image (default: `10`, minimum `2`).
    pub vision_max_faces: u32,
    /// Label results requested per image (default: `20`).
    pub vision_max_labels: u32,
    pub thresholds: ComparisonThresholds,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            vision_api_url: DEFAULT_API_URL.to_string(),
            vision_api_key: None,
            vision_timeout_secs: DEFAULT_TIMEOUT_SECS,
            vision_max_faces: DEFAULT_MAX_FACES,
            vision_max_labels: DEFAULT_MAX_LABELS,
            thresholds: ComparisonThresholds::default(),
        }
    }
}

impl VerifierConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                         |
    /// |--------------------------------|---------------------------------|
    /// | `VISION_API_URL`               | `https://vision.googleapis.com` |
    /// | `VISION_API_KEY`               | --                              |
    /// | `VISION_TIMEOUT_SECS`          | `30`                            |
    /// | `VISION_MAX_FACES`             | `10`                            |
    /// | `VISION_MAX_LABELS`            | `20`                            |
    /// | `VERIFY_LIGHTING_MAX_DIFF`     | `0.2`                           |
    /// | `VERIFY_FACE_SIZE_MAX_DIFF`    | `10`                            |
    /// | `VERIFY_FACE_SIZE_MIN_PERCENT` | `40`                            |
    /// | `VERIFY_FACE_SIZE_MAX_PERCENT` | `60`                            |
    /// | `VERIFY_POSE_MAX_DIFF`         | `10`                            |
    /// | `VERIFY_POSE_MAX`              | `10`                            |
    /// | `VERIFY_CLUTTER_MAX`           | `0.3`                           |
    pub fn from_env() -> Result<Self, VerifyError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, VerifyError> {
        let defaults = Self::default();
        let t = defaults.thresholds;

        let vision_api_key = lookup("VISION_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let vision_max_faces: u32 = parse_or(&lookup, "VISION_MAX_FACES", defaults.vision_max_faces)?;
        if vision_max_faces < 2 {
            return Err(VerifyError::Config(format!(
                "VISION_MAX_FACES must be at least 2 to detect multiple faces, got {vision_max_faces}"
            )));
        }

        let vision_timeout_secs: u64 =
            parse_or(&lookup, "VISION_TIMEOUT_SECS", defaults.vision_timeout_secs)?;
        if vision_timeout_secs == 0 {
            return Err(VerifyError::Config(
                "VISION_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }

        let thresholds = ComparisonThresholds {
            lighting_max_diff: parse_or(&lookup, "VERIFY_LIGHTING_MAX_DIFF", t.lighting_max_diff)?,
            face_size_max_diff: parse_or(&lookup, "VERIFY_FACE_SIZE_MAX_DIFF", t.face_size_max_diff)?,
            face_size_min_percent: parse_or(
                &lookup,
                "VERIFY_FACE_SIZE_MIN_PERCENT",
                t.face_size_min_percent,
            )?,
            face_size_max_percent: parse_or(
                &lookup,
                "VERIFY_FACE_SIZE_MAX_PERCENT",
                t.face_size_max_percent,
            )?,
            pose_max_diff_degrees: parse_or(&lookup, "VERIFY_POSE_MAX_DIFF", t.pose_max_diff_degrees)?,
            pose_max_degrees: parse_or(&lookup, "VERIFY_POSE_MAX", t.pose_max_degrees)?,
            clutter_max: parse_or(&lookup, "VERIFY_CLUTTER_MAX", t.clutter_max)?,
        };
        thresholds
            .validate()
            .map_err(|e| VerifyError::Config(e.to_string()))?;

        Ok(Self {
            vision_api_url: lookup("VISION_API_URL").unwrap_or(defaults.vision_api_url),
            vision_api_key,
            vision_timeout_secs,
            vision_max_faces,
            vision_max_labels: parse_or(&lookup, "VISION_MAX_LABELS", defaults.vision_max_labels)?,
            thresholds,
        })
    }

    /// Connection settings for the REST vision provider.
    ///
    /// Fails when no API key is configured.
    pub fn cloud_vision(&self) -> Result<CloudVisionConfig, VerifyError> {
        let api_key = self.vision_api_key.clone().ok_or_else(|| {
            VerifyError::Config("VISION_API_KEY environment variable is required".to_string())
        })?;

        Ok(CloudVisionConfig {
            api_url: self.vision_api_url.clone(),
            api_key,
            timeout: Duration::from_secs(self.vision_timeout_secs),
            max_faces: self.vision_max_faces,
            max_labels: self.vision_max_labels,
        })
    }
}

/// Parse `key` if set, otherwise return `default`.
fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, VerifyError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| VerifyError::Config(format!("{key} must be a valid number, got '{raw}'"))),
        None => Ok(default),
    }
}
