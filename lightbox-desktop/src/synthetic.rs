//! Synthetic camera for headless hosts.
//!
//! Stands in for the platform camera so a session can run without hardware.
//! Each failure mode reproduces the error a browser reports for that
//! situation, so the classification path is the same one a real host takes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use clap::ValueEnum;
use lightbox_core::{MediaConstraints, MediaDevices, MediaFailure, MediaStream};
use serde::{Deserialize, Serialize};

/// How the synthetic camera behaves when asked for a stream.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum CameraFailure {
    /// Every request succeeds.
    #[default]
    None,
    /// The preferred request is over-constrained; the fallback succeeds.
    PrimaryRejected,
    /// The user refuses camera access.
    PermissionDenied,
    /// The page is not served from a secure origin.
    InsecureOrigin,
    /// No camera is attached.
    NoDevice,
    /// The platform has no media capture API.
    Unsupported,
}

/// A camera that answers requests according to a [`CameraFailure`] mode.
#[derive(Debug, Default)]
pub struct SyntheticCamera {
    failure: CameraFailure,
    requests: AtomicUsize,
    stopped_tracks: Arc<AtomicUsize>,
}

impl SyntheticCamera {
    /// Camera behaving as `failure` describes.
    #[must_use]
    pub fn new(failure: CameraFailure) -> Self {
        Self {
            failure,
            ..Self::default()
        }
    }

    /// Requests made so far.
    #[must_use]
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Shared count of tracks stopped across every stream this camera issued.
    #[must_use]
    pub fn stopped_tracks(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.stopped_tracks)
    }
}

#[async_trait]
impl MediaDevices for SyntheticCamera {
    type Stream = SyntheticStream;

    fn is_available(&self) -> bool {
        self.failure != CameraFailure::Unsupported
    }

    async fn get_user_media(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<SyntheticStream, MediaFailure> {
        let n = self.requests.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(request = n, ?constraints, "Synthetic camera request");

        match self.failure {
            CameraFailure::None | CameraFailure::Unsupported => {}
            CameraFailure::PrimaryRejected if n > 1 => {}
            CameraFailure::PrimaryRejected => {
                return Err(MediaFailure::new(
                    "OverconstrainedError",
                    "Constraints could not be satisfied",
                ));
            }
            CameraFailure::PermissionDenied => {
                return Err(MediaFailure::new("NotAllowedError", "Permission denied"));
            }
            CameraFailure::InsecureOrigin => {
                return Err(MediaFailure::new(
                    "NotSupportedError",
                    "Only secure origins are allowed (https or localhost)",
                ));
            }
            CameraFailure::NoDevice => {
                return Err(MediaFailure::new(
                    "NotFoundError",
                    "Requested device not found",
                ));
            }
        }

        Ok(SyntheticStream {
            id: uuid::Uuid::new_v4().to_string(),
            live: 1,
            stopped: Arc::clone(&self.stopped_tracks),
        })
    }
}

/// A single-track stream from [`SyntheticCamera`].
#[derive(Debug)]
pub struct SyntheticStream {
    id: String,
    live: usize,
    stopped: Arc<AtomicUsize>,
}

impl MediaStream for SyntheticStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn live_tracks(&self) -> usize {
        self.live
    }

    fn stop_all(&mut self) {
        self.stopped.fetch_add(self.live, Ordering::SeqCst);
        self.live = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightbox_core::{CameraErrorKind, CameraState, CaptureDeviceManager};

    async fn outcome(failure: CameraFailure) -> CameraState {
        let mut manager = CaptureDeviceManager::new(SyntheticCamera::new(failure));
        manager.start().await.clone()
    }

    fn kind(state: &CameraState) -> Option<CameraErrorKind> {
        match state {
            CameraState::Error(err) => Some(err.kind),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_modes_classify_as_browsers_do() {
        assert_eq!(outcome(CameraFailure::None).await, CameraState::Active);
        assert_eq!(
            outcome(CameraFailure::PrimaryRejected).await,
            CameraState::Active
        );
        assert_eq!(
            kind(&outcome(CameraFailure::PermissionDenied).await),
            Some(CameraErrorKind::PermissionDenied)
        );
        assert_eq!(
            kind(&outcome(CameraFailure::InsecureOrigin).await),
            Some(CameraErrorKind::HttpsRequired)
        );
        assert_eq!(
            kind(&outcome(CameraFailure::NoDevice).await),
            Some(CameraErrorKind::NotFound)
        );
        assert_eq!(
            kind(&outcome(CameraFailure::Unsupported).await),
            Some(CameraErrorKind::NotSupported)
        );
    }

    #[tokio::test]
    async fn test_stop_counts_each_track_once() {
        let camera = SyntheticCamera::new(CameraFailure::None);
        let stopped = camera.stopped_tracks();
        let mut stream = camera
            .get_user_media(&MediaConstraints::preferred())
            .await
            .expect("stream");

        stream.stop_all();
        stream.stop_all();
        assert_eq!(stopped.load(Ordering::SeqCst), 1);
        assert_eq!(stream.live_tracks(), 0);
    }
}
