use checkin_core::error::CoreError;

/// Errors that propagate out of a verification request.
///
/// Vision and analysis failures never appear here; they are absorbed into
/// the self-reported fallback.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// The caller passed a missing or unusable image reference.
    #[error("Invalid image reference: {0}")]
    InvalidImageReference(#[source] CoreError),

    /// Environment configuration could not be parsed or failed validation.
    #[error("Configuration error: {0}")]
    Config(String),
}
