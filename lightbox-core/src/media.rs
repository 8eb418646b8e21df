//! Platform media-device seam.
//!
//! The capture-device manager talks to the camera through [`MediaDevices`],
//! which a host implements on top of its platform API (browser
//! `getUserMedia`, V4L2, AVFoundation, or a synthetic source in tests).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which way the requested camera should face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front camera, facing the user.
    User,
    /// Rear camera, facing the paper.
    Environment,
}

/// Video part of a media request. `None` fields mean "any".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoConstraints {
    /// Preferred camera facing.
    pub facing_mode: Option<FacingMode>,
    /// Preferred frame width in pixels.
    pub ideal_width: Option<u32>,
    /// Preferred frame height in pixels.
    pub ideal_height: Option<u32>,
}

/// A media acquisition request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaConstraints {
    /// Video constraints.
    pub video: VideoConstraints,
    /// Whether audio is requested.
    pub audio: bool,
}

impl MediaConstraints {
    /// Rear camera at about 1920x1080, no audio.
    #[must_use]
    pub fn preferred() -> Self {
        Self {
            video: VideoConstraints {
                facing_mode: Some(FacingMode::Environment),
                ideal_width: Some(1920),
                ideal_height: Some(1080),
            },
            audio: false,
        }
    }

    /// Any camera, no audio.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            video: VideoConstraints::default(),
            audio: false,
        }
    }
}

/// A failure reported by the platform when acquiring media.
///
/// `name` carries the platform's error name (for browsers the DOMException
/// name such as `NotAllowedError`), `message` its free-form text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{name}: {message}")]
pub struct MediaFailure {
    /// Platform error name.
    pub name: String,
    /// Platform error message.
    pub message: String,
}

impl MediaFailure {
    /// Create a failure from a name and message.
    #[must_use]
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// A live media stream owned by whoever acquired it.
pub trait MediaStream: Send {
    /// Stream identifier.
    fn id(&self) -> &str;

    /// Number of tracks still live.
    fn live_tracks(&self) -> usize;

    /// Stop every track in the stream. Calling it again is harmless.
    fn stop_all(&mut self);
}

/// Access to the platform's cameras.
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Stream type produced by this platform.
    type Stream: MediaStream;

    /// Whether the platform exposes media capture at all.
    fn is_available(&self) -> bool {
        true
    }

    /// Request a stream matching `constraints`.
    ///
    /// # Errors
    ///
    /// Returns the platform failure when no stream can be provided.
    async fn get_user_media(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<Self::Stream, MediaFailure>;
}
