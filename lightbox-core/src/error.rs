//! Error types for light-box core operations.

use thiserror::Error;

use crate::camera::CameraError;

/// Result type for light-box core operations.
pub type LightboxResult<T> = Result<T, LightboxError>;

/// Errors that can occur in light-box core operations.
#[derive(Debug, Error)]
pub enum LightboxError {
    /// Camera acquisition ended in a classified failure.
    #[error("Camera unavailable ({}): {}", .0.kind, .0.message)]
    Camera(CameraError),

    /// An operation needed an active camera stream but none is owned.
    #[error("Camera is not active")]
    CameraInactive,

    /// A glyph path string was empty.
    #[error("Glyph path is empty")]
    EmptyGlyph,
}

impl From<CameraError> for LightboxError {
    fn from(err: CameraError) -> Self {
        Self::Camera(err)
    }
}
