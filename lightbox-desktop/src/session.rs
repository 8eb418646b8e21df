//! Overlay session: one lifecycle from camera acquisition to teardown.
//!
//! The session is driven from a single task; `&mut self` serializes gesture
//! handling and device transitions. Every control change is published to the
//! render loop as a [`ControlsState`] snapshot through a `watch` channel.

use std::fmt;

use lightbox_core::{
    CameraError, CameraState, CaptureDeviceManager, ControlsState, GestureEngine, GlyphPath,
    LightboxError, MediaDevices, PointerEvent, Transform, WheelEvent, DEFAULT_OPACITY,
};
use lightbox_renderer::{
    CapturedImage, DisplayClock, FrameSource, PixmapSurface, RenderError, RenderHandle,
    RenderLoop, RenderLoopConfig,
};
use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors surfaced by an overlay session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Core light-box error.
    #[error(transparent)]
    Core(#[from] LightboxError),

    /// Renderer error.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Session configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Container width in pixels.
    pub width: u32,
    /// Container height in pixels.
    pub height: u32,
    /// Reference glyph drawn at start.
    pub glyph: GlyphPath,
    /// Initial overlay opacity.
    pub opacity: f64,
    /// Render loop settings.
    pub render: RenderLoopConfig,
}

impl SessionConfig {
    /// Configuration for `glyph` with default size, opacity and style.
    #[must_use]
    pub fn new(glyph: GlyphPath) -> Self {
        Self {
            width: 1280,
            height: 720,
            glyph,
            opacity: DEFAULT_OPACITY,
            render: RenderLoopConfig::default(),
        }
    }
}

type CaptureCallback = Box<dyn FnMut(CapturedImage) + Send>;
type CloseCallback = Box<dyn FnOnce() + Send>;

/// A running light-box overlay.
pub struct OverlaySession<D: MediaDevices> {
    id: Uuid,
    config: SessionConfig,
    gestures: GestureEngine,
    controls: ControlsState,
    controls_tx: watch::Sender<ControlsState>,
    glyph_tx: watch::Sender<GlyphPath>,
    camera: CaptureDeviceManager<D>,
    render: Option<RenderHandle>,
    on_capture: Option<CaptureCallback>,
    on_close: Option<CloseCallback>,
}

impl<D: MediaDevices> fmt::Debug for OverlaySession<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlaySession")
            .field("id", &self.id)
            .field("camera", self.camera.state())
            .field("controls", &self.controls)
            .field("rendering", &self.render.is_some())
            .finish_non_exhaustive()
    }
}

impl<D: MediaDevices> OverlaySession<D> {
    /// Create an idle session over `devices`.
    #[must_use]
    pub fn new(config: SessionConfig, devices: D) -> Self {
        let controls = ControlsState::new(Transform::IDENTITY, config.opacity);
        let (controls_tx, _) = watch::channel(controls);
        let (glyph_tx, _) = watch::channel(config.glyph.clone());
        let id = Uuid::new_v4();
        tracing::debug!(%id, "Overlay session created");

        Self {
            id,
            config,
            gestures: GestureEngine::new(),
            controls,
            controls_tx,
            glyph_tx,
            camera: CaptureDeviceManager::new(devices),
            render: None,
            on_capture: None,
            on_close: None,
        }
    }

    /// Invoke `callback` with every successful capture.
    #[must_use]
    pub fn on_capture(mut self, callback: impl FnMut(CapturedImage) + Send + 'static) -> Self {
        self.on_capture = Some(Box::new(callback));
        self
    }

    /// Invoke `callback` once when the session closes.
    #[must_use]
    pub fn on_close(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.on_close = Some(Box::new(callback));
        self
    }

    /// Session identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Session configuration, with the current container size.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Camera lifecycle state.
    #[must_use]
    pub fn camera_state(&self) -> &CameraState {
        self.camera.state()
    }

    /// Camera error, if acquisition failed.
    #[must_use]
    pub fn camera_error(&self) -> Option<&CameraError> {
        self.camera.error()
    }

    /// Latest published controls.
    #[must_use]
    pub fn controls(&self) -> ControlsState {
        self.controls
    }

    /// Current transform.
    #[must_use]
    pub fn transform(&self) -> Transform {
        self.controls.transform
    }

    /// Whether a render loop is running.
    #[must_use]
    pub fn is_rendering(&self) -> bool {
        self.render.as_ref().is_some_and(|h| !h.is_cancelled())
    }

    /// Frames drawn by the current render loop.
    #[must_use]
    pub fn frames_rendered(&self) -> u64 {
        self.render.as_ref().map_or(0, RenderHandle::frames_rendered)
    }

    /// Acquire the camera and, once active, start rendering paced by the
    /// display clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the drawing surface cannot be allocated. Camera
    /// failures are not errors; they are reported in the returned state.
    pub async fn start(&mut self) -> SessionResult<CameraState> {
        let clock = DisplayClock::new(self.config.render.refresh_rate_hz);
        self.start_with_frames(clock).await
    }

    /// Like [`start`](Self::start), with frames paced by `frames`.
    ///
    /// # Errors
    ///
    /// Returns an error if the drawing surface cannot be allocated. The
    /// camera stream is released before the error is returned.
    pub async fn start_with_frames<F>(&mut self, frames: F) -> SessionResult<CameraState>
    where
        F: FrameSource + 'static,
    {
        self.stop_render();
        let state = self.camera.start().await.clone();
        if state != CameraState::Active {
            tracing::warn!(session = %self.id, ?state, "Overlay not started");
            return Ok(state);
        }

        let surface = match PixmapSurface::new(self.config.width, self.config.height) {
            Ok(surface) => surface,
            Err(e) => {
                self.camera.stop();
                tracing::error!(session = %self.id, "Overlay surface unavailable: {e}");
                return Err(e.into());
            }
        };
        let handle = RenderLoop::new(
            surface,
            frames,
            self.config.render.style,
            self.controls_tx.subscribe(),
            self.glyph_tx.subscribe(),
        )
        .spawn();
        self.render = Some(handle);
        tracing::info!(
            session = %self.id,
            "Overlay rendering at {}x{}",
            self.config.width,
            self.config.height
        );
        Ok(state)
    }

    /// Feed a pointer event to the gesture engine.
    pub fn pointer(&mut self, event: PointerEvent) -> Transform {
        self.gestures.pointer(event);
        self.publish()
    }

    /// Feed a wheel event to the gesture engine.
    pub fn wheel(&mut self, event: WheelEvent) -> Transform {
        self.gestures.wheel(event);
        self.publish()
    }

    /// Set overlay opacity from the slider. Clamped into `[0, 1]`.
    pub fn set_opacity(&mut self, opacity: f64) {
        self.controls.set_opacity(opacity);
        self.publish();
    }

    /// Set scale from the slider. Clamped into the allowed range.
    pub fn set_scale(&mut self, scale: f64) -> Transform {
        self.gestures.set_scale(scale);
        self.publish()
    }

    /// Restore the identity transform and default opacity.
    pub fn reset(&mut self) -> ControlsState {
        self.gestures.reset();
        self.controls.set_opacity(DEFAULT_OPACITY);
        self.publish();
        tracing::debug!(session = %self.id, "Controls reset");
        self.controls
    }

    /// Track a container size change. The surface follows before the next
    /// frame is cleared.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width;
        self.config.height = height;
        if let Some(handle) = &self.render {
            handle.resize(width, height);
        }
    }

    /// Swap the reference glyph. Takes effect when the next frame starts.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` is blank.
    pub fn set_glyph(&mut self, data: impl Into<String>) -> SessionResult<()> {
        let glyph = GlyphPath::new(data)?;
        self.config.glyph = glyph.clone();
        self.glyph_tx.send_replace(glyph);
        Ok(())
    }

    /// Capture the overlay and hand it to the capture callback.
    ///
    /// Returns `false` without calling back when there is no surface, either
    /// because rendering never started or the session was torn down.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub async fn capture(&mut self) -> SessionResult<bool> {
        let Some(handle) = &self.render else {
            tracing::debug!(session = %self.id, "Capture ignored, no surface");
            return Ok(false);
        };

        match handle.capture().await {
            Ok(Some(image)) => {
                tracing::info!(
                    session = %self.id,
                    bytes = image.data.len(),
                    "Overlay captured"
                );
                if let Some(callback) = self.on_capture.as_mut() {
                    callback(image);
                }
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(e) => {
                tracing::error!(session = %self.id, error = %e, "Capture failed");
                Err(e.into())
            }
        }
    }

    /// Tear down, wait for the render loop to exit, then invoke the close
    /// callback.
    ///
    /// The camera is released even if the render loop failed. The close
    /// callback runs at most once over the session's lifetime.
    ///
    /// # Errors
    ///
    /// Returns an error if the render loop task panicked.
    pub async fn close(&mut self) -> SessionResult<()> {
        let joined = match self.render.take() {
            Some(mut handle) => handle.shutdown().await.map(|report| {
                if let Some(report) = report {
                    tracing::debug!(session = %self.id, ?report, "Render loop joined");
                }
            }),
            None => Ok(()),
        };
        if let Err(e) = &joined {
            tracing::error!(session = %self.id, error = %e, "Render loop ended abnormally");
        }

        self.teardown();

        if let Some(callback) = self.on_close.take() {
            callback();
        }
        joined.map_err(Into::into)
    }

    /// Stop rendering and release the camera. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        let stopped_loop = self.stop_render();
        let released = self.camera.stop();
        if stopped_loop || released {
            tracing::debug!(
                session = %self.id,
                stopped_loop,
                released,
                "Overlay torn down"
            );
        }
    }

    fn stop_render(&mut self) -> bool {
        match self.render.take() {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    fn publish(&mut self) -> Transform {
        self.controls = self.controls.with_transform(self.gestures.transform());
        self.controls_tx.send_replace(self.controls);
        self.controls.transform
    }
}

impl<D: MediaDevices> Drop for OverlaySession<D> {
    fn drop(&mut self) {
        self.teardown();
    }
}
