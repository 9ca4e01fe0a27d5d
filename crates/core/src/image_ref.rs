//! Validated references to baseline and check-in images.
//!
//! An [`ImageRef`] is either a remote URI the vision provider fetches itself
//! or a local file whose bytes are sent inline. Anything else is a caller
//! programming error and is rejected when parsing.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// URI schemes the vision provider can fetch directly.
pub const REMOTE_SCHEMES: &[&str] = &["gs://", "http://", "https://"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ImageRef {
    /// `gs://`, `http://` or `https://` location.
    Uri(String),
    /// Path on the local filesystem.
    Path(PathBuf),
}

impl ImageRef {
    /// Parse a raw reference string.
    ///
    /// Strings containing `://` must use one of [`REMOTE_SCHEMES`]; any other
    /// non-empty string is taken as a local path.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(CoreError::Validation(
                "image reference must not be empty".to_string(),
            ));
        }

        if let Some(scheme_end) = raw.find("://") {
            let lower = raw.to_ascii_lowercase();
            if !REMOTE_SCHEMES.iter().any(|s| lower.starts_with(s)) {
                return Err(CoreError::Validation(format!(
                    "unsupported image URI scheme '{}'. Valid schemes: {}",
                    &raw[..scheme_end],
                    REMOTE_SCHEMES.join(", ")
                )));
            }
            if raw.len() == scheme_end + 3 {
                return Err(CoreError::Validation(format!(
                    "image URI '{raw}' has no location"
                )));
            }
            return Ok(Self::Uri(raw.to_string()));
        }

        if raw.starts_with("data:") {
            return Err(CoreError::Validation(
                "inline data URIs are not supported; pass a path or URI".to_string(),
            ));
        }

        Ok(Self::Path(PathBuf::from(raw)))
    }

    /// Re-check a reference that may have been built without [`ImageRef::parse`].
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::Uri(uri) => match Self::parse(uri)? {
                Self::Uri(_) => Ok(()),
                Self::Path(_) => Err(CoreError::Validation(format!(
                    "'{uri}' is not a remote image URI"
                ))),
            },
            Self::Path(path) if path.as_os_str().is_empty() => Err(CoreError::Validation(
                "image path must not be empty".to_string(),
            )),
            Self::Path(_) => Ok(()),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Uri(_))
    }
}

impl FromStr for ImageRef {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uri(uri) => f.write_str(uri),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}
