//! # Capture-Device Manager
//!
//! Acquires the live camera stream the overlay is layered on.
//!
//! ```text
//! Idle ──▶ Requesting ──ok──▶ Active
//!              │
//!              └─fail─▶ FallbackRequesting ──ok──▶ Active
//!                               │
//!                               └─fail─▶ Error(kind)
//! ```
//!
//! There is exactly one primary and one fallback attempt per
//! [`CaptureDeviceManager::start`]. Whenever the manager stops owning a
//! stream, every track of that stream is stopped first.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LightboxError, LightboxResult};
use crate::media::{MediaConstraints, MediaDevices, MediaFailure, MediaStream};

/// Classified reason the camera could not be acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CameraErrorKind {
    /// The user or platform refused camera permission.
    PermissionDenied,
    /// No camera matched, or the failure could not be classified.
    NotFound,
    /// The platform has no media capture capability.
    NotSupported,
    /// Capture needs a secure context (HTTPS or localhost).
    HttpsRequired,
}

impl CameraErrorKind {
    /// User-facing message for this kind.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::PermissionDenied => "Please allow access to the camera",
            Self::NotFound => "Unable to access the camera",
            Self::NotSupported => "Camera capture is not supported on this platform",
            Self::HttpsRequired => "Please use HTTPS or localhost to access this feature",
        }
    }

    /// Map a platform failure into exactly one kind.
    ///
    /// Unrecognised failures default to [`CameraErrorKind::NotFound`].
    #[must_use]
    pub fn classify(failure: &MediaFailure) -> Self {
        if failure.name == "NotAllowedError" || failure.message.contains("Permission denied") {
            Self::PermissionDenied
        } else if failure.name == "NotSupportedError" || failure.message.contains("https") {
            Self::HttpsRequired
        } else {
            Self::NotFound
        }
    }
}

impl fmt::Display for CameraErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::NotFound => "NOT_FOUND",
            Self::NotSupported => "NOT_SUPPORTED",
            Self::HttpsRequired => "HTTPS_REQUIRED",
        };
        f.write_str(name)
    }
}

/// An unrecoverable camera acquisition failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraError {
    /// Failure classification.
    #[serde(rename = "type")]
    pub kind: CameraErrorKind,
    /// User-facing message.
    pub message: String,
}

impl CameraError {
    /// Create an error with the kind's standard message.
    #[must_use]
    pub fn new(kind: CameraErrorKind) -> Self {
        Self {
            kind,
            message: kind.message().to_string(),
        }
    }

    /// Classify a platform failure.
    #[must_use]
    pub fn from_failure(failure: &MediaFailure) -> Self {
        Self::new(CameraErrorKind::classify(failure))
    }
}

/// Lifecycle state of the capture device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "error", rename_all = "snake_case")]
pub enum CameraState {
    /// No stream and no attempt in progress.
    Idle,
    /// Primary request in flight.
    Requesting,
    /// Primary request failed, fallback request in flight.
    FallbackRequesting,
    /// A stream is owned and live.
    Active,
    /// Both attempts failed.
    Error(CameraError),
}

/// Owns the camera stream and drives the acquisition state machine.
pub struct CaptureDeviceManager<D: MediaDevices> {
    devices: D,
    state: CameraState,
    stream: Option<D::Stream>,
}

impl<D: MediaDevices> fmt::Debug for CaptureDeviceManager<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureDeviceManager")
            .field("state", &self.state)
            .field("stream", &self.stream.as_ref().map(MediaStream::id))
            .finish_non_exhaustive()
    }
}

impl<D: MediaDevices> CaptureDeviceManager<D> {
    /// Create an idle manager over `devices`.
    pub fn new(devices: D) -> Self {
        Self {
            devices,
            state: CameraState::Idle,
            stream: None,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &CameraState {
        &self.state
    }

    /// Current classified error, if the last attempt failed.
    #[must_use]
    pub fn error(&self) -> Option<&CameraError> {
        match &self.state {
            CameraState::Error(err) => Some(err),
            _ => None,
        }
    }

    /// Whether a live stream is owned.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == CameraState::Active
    }

    /// The owned stream, for binding to a video sink.
    ///
    /// # Errors
    ///
    /// Returns the classified camera error if acquisition failed, or
    /// [`LightboxError::CameraInactive`] if no stream is owned.
    pub fn stream(&self) -> LightboxResult<&D::Stream> {
        if let Some(err) = self.error() {
            return Err(LightboxError::Camera(err.clone()));
        }
        self.stream.as_ref().ok_or(LightboxError::CameraInactive)
    }

    /// Acquire a stream: primary constraints first, then the permissive
    /// fallback. Any previously owned stream is released before requesting.
    ///
    /// Failures end in [`CameraState::Error`]; they are reported as state,
    /// never returned.
    pub async fn start(&mut self) -> &CameraState {
        self.release();

        if !self.devices.is_available() {
            tracing::warn!("Media capture unavailable on this platform");
            self.state = CameraState::Error(CameraError::new(CameraErrorKind::NotSupported));
            return &self.state;
        }

        self.state = CameraState::Requesting;
        tracing::debug!("Requesting camera with preferred constraints");

        match self
            .devices
            .get_user_media(&MediaConstraints::preferred())
            .await
        {
            Ok(stream) => self.activate(stream),
            Err(primary) => {
                tracing::warn!(error = %primary, "Preferred camera request failed, falling back");
                self.state = CameraState::FallbackRequesting;

                match self
                    .devices
                    .get_user_media(&MediaConstraints::permissive())
                    .await
                {
                    Ok(stream) => self.activate(stream),
                    Err(fallback) => {
                        let err = CameraError::from_failure(&fallback);
                        tracing::error!(
                            error = %fallback,
                            kind = %err.kind,
                            "Camera acquisition failed"
                        );
                        self.state = CameraState::Error(err);
                    }
                }
            }
        }

        &self.state
    }

    /// Release the owned stream and return to [`CameraState::Idle`].
    ///
    /// Returns `true` if a stream was released. Safe to call repeatedly.
    pub fn stop(&mut self) -> bool {
        let released = self.release();
        self.state = CameraState::Idle;
        released
    }

    fn activate(&mut self, stream: D::Stream) {
        tracing::info!(
            stream = stream.id(),
            tracks = stream.live_tracks(),
            "Camera active"
        );
        self.stream = Some(stream);
        self.state = CameraState::Active;
    }

    fn release(&mut self) -> bool {
        match self.stream.take() {
            Some(mut stream) => {
                stream.stop_all();
                tracing::debug!(stream = stream.id(), "Camera stream released");
                true
            }
            None => false,
        }
    }
}

impl<D: MediaDevices> Drop for CaptureDeviceManager<D> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_permission() {
        let by_name = MediaFailure::new("NotAllowedError", "denied by user");
        let by_message = MediaFailure::new("Error", "Permission denied by system");
        assert_eq!(
            CameraErrorKind::classify(&by_name),
            CameraErrorKind::PermissionDenied
        );
        assert_eq!(
            CameraErrorKind::classify(&by_message),
            CameraErrorKind::PermissionDenied
        );
    }

    #[test]
    fn test_classify_https() {
        let by_name = MediaFailure::new("NotSupportedError", "");
        let by_message = MediaFailure::new("TypeError", "only secure origins (https) allowed");
        assert_eq!(
            CameraErrorKind::classify(&by_name),
            CameraErrorKind::HttpsRequired
        );
        assert_eq!(
            CameraErrorKind::classify(&by_message),
            CameraErrorKind::HttpsRequired
        );
    }

    #[test]
    fn test_classify_defaults_to_not_found() {
        for failure in [
            MediaFailure::new("NotFoundError", "Requested device not found"),
            MediaFailure::new("OverconstrainedError", ""),
            MediaFailure::new("", ""),
        ] {
            assert_eq!(CameraErrorKind::classify(&failure), CameraErrorKind::NotFound);
        }
    }

    #[test]
    fn test_camera_error_serializes_type_name() {
        let err = CameraError::new(CameraErrorKind::HttpsRequired);
        let json = serde_json::to_value(&err).expect("serialize");
        assert_eq!(json["type"], "HTTPS_REQUIRED");
        assert_eq!(err.kind.to_string(), "HTTPS_REQUIRED");
    }
}
