//! # Render Loop
//!
//! Redraws the overlay once per display frame until cancelled.
//!
//! ```text
//!            ┌──────────── frame ────────────┐
//! tick ──▶ resize? ─▶ clear ─▶ snapshot ─▶ draw ─▶ wait for tick / capture / cancel
//!  ▲                                                         │
//!  └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The loop task owns the surface. Controls and glyph reach it through
//! `watch` channels, so each frame reads one consistent, latest-value
//! snapshot and intermediate updates coalesce. Capture requests are answered
//! on the same task between frames, which keeps surface access exclusive
//! without a lock. A pending frame tick is drawn before a pending capture is
//! answered, so a capture sees the newest frame.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lightbox_core::{ControlsState, GlyphPath};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::capture::{capture_png, CapturedImage};
use crate::error::{RenderError, RenderResult};
use crate::frame::FrameSource;
use crate::path::{PathRenderer, PathStyle, PathTransform};
use crate::surface::DrawingSurface;

/// Glyph units per unit of user scale. Glyph paths are authored about one
/// unit wide, so scale 1 draws them about 100 pixels wide.
pub const GLYPH_UNIT_SCALE: f64 = 100.0;

/// Pending captures beyond this are dropped by the sender.
const CAPTURE_QUEUE: usize = 4;

/// Draw one overlay frame.
///
/// Clears the surface, anchors the glyph at the surface center plus the user
/// offset, and draws it at the controls' opacity. Global alpha is back to 1
/// on return.
pub fn render_frame<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    renderer: &mut PathRenderer,
    controls: &ControlsState,
    glyph: &GlyphPath,
    style: &PathStyle,
) {
    surface.clear();

    let t = &controls.transform;
    let center_x = f64::from(surface.width()) / 2.0 + t.offset_x;
    let center_y = f64::from(surface.height()) / 2.0 + t.offset_y;

    surface.set_global_alpha(controls.opacity);
    renderer.draw(
        surface,
        glyph,
        style,
        &PathTransform {
            scale: t.scale * GLYPH_UNIT_SCALE,
            offset_x: center_x,
            offset_y: center_y,
            rotation: t.rotation,
        },
    );
    surface.set_global_alpha(1.0);
}

struct CaptureRequest {
    reply: oneshot::Sender<RenderResult<CapturedImage>>,
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The handle cancelled it.
    Cancelled,
    /// The frame source ended.
    FramesEnded,
}

/// Summary returned when the loop task finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopReport {
    /// Why the loop stopped.
    pub exit: LoopExit,
    /// Frames drawn over the loop's lifetime.
    pub frames: u64,
}

/// The per-session render loop, not yet started.
pub struct RenderLoop<S, F> {
    surface: S,
    frames: F,
    style: PathStyle,
    controls: watch::Receiver<ControlsState>,
    glyph: watch::Receiver<GlyphPath>,
}

impl<S, F> std::fmt::Debug for RenderLoop<S, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderLoop")
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}

impl<S, F> RenderLoop<S, F>
where
    S: DrawingSurface + 'static,
    F: FrameSource + 'static,
{
    /// Create a loop drawing onto `surface`, paced by `frames`.
    pub fn new(
        surface: S,
        frames: F,
        style: PathStyle,
        controls: watch::Receiver<ControlsState>,
        glyph: watch::Receiver<GlyphPath>,
    ) -> Self {
        Self {
            surface,
            frames,
            style,
            controls,
            glyph,
        }
    }

    /// Start the loop as a tokio task. The first frame is drawn immediately.
    #[must_use]
    pub fn spawn(self) -> RenderHandle {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (resize_tx, resize_rx) =
            watch::channel((self.surface.width(), self.surface.height()));
        let (capture_tx, capture_rx) = mpsc::channel(CAPTURE_QUEUE);
        let frames = Arc::new(AtomicU64::new(0));

        let task = tokio::spawn(self.run(cancel_rx, resize_rx, capture_rx, Arc::clone(&frames)));

        RenderHandle {
            cancel: cancel_tx,
            resize: resize_tx,
            capture: capture_tx,
            frames,
            task: Some(task),
        }
    }

    async fn run(
        mut self,
        mut cancel: watch::Receiver<bool>,
        mut resize: watch::Receiver<(u32, u32)>,
        mut captures: mpsc::Receiver<CaptureRequest>,
        frames: Arc<AtomicU64>,
    ) -> LoopReport {
        let mut renderer = PathRenderer::new();
        tracing::debug!(
            "Render loop started at {}x{}",
            self.surface.width(),
            self.surface.height()
        );

        let exit = 'frames: loop {
            if *cancel.borrow() {
                break LoopExit::Cancelled;
            }

            if resize.has_changed().unwrap_or(false) {
                let (width, height) = *resize.borrow_and_update();
                if let Err(e) = self.surface.resize(width, height) {
                    tracing::warn!("Ignoring resize to {}x{}: {}", width, height, e);
                }
            }

            let controls = *self.controls.borrow_and_update();
            let glyph = self.glyph.borrow_and_update().clone();
            render_frame(&mut self.surface, &mut renderer, &controls, &glyph, &self.style);
            let n = frames.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::trace!(frame = n, opacity = controls.opacity, "Frame drawn");

            loop {
                tokio::select! {
                    biased;

                    changed = cancel.changed() => {
                        if changed.is_err() || *cancel.borrow() {
                            break 'frames LoopExit::Cancelled;
                        }
                    }

                    tick = self.frames.next_frame() => {
                        if tick.is_none() {
                            break 'frames LoopExit::FramesEnded;
                        }
                        break;
                    }

                    Some(request) = captures.recv() => {
                        let _ = request.reply.send(capture_png(&self.surface));
                    }
                }
            }
        };

        let report = LoopReport {
            exit,
            frames: frames.load(Ordering::Relaxed),
        };
        tracing::debug!(?report, "Render loop stopped");
        report
    }
}

/// Control handle for a running [`RenderLoop`].
#[derive(Debug)]
pub struct RenderHandle {
    cancel: watch::Sender<bool>,
    resize: watch::Sender<(u32, u32)>,
    capture: mpsc::Sender<CaptureRequest>,
    frames: Arc<AtomicU64>,
    task: Option<JoinHandle<LoopReport>>,
}

impl RenderHandle {
    /// Stop scheduling frames. Safe to call any number of times.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    /// Whether the loop has been told to stop.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Whether the loop task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Frames drawn so far.
    #[must_use]
    pub fn frames_rendered(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    /// Resize the surface to match its container before the next frame.
    pub fn resize(&self, width: u32, height: u32) {
        self.resize.send_replace((width, height));
    }

    /// Capture the surface as PNG.
    ///
    /// Returns `Ok(None)` when the loop is no longer running, since there is
    /// no surface to read.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub async fn capture(&self) -> RenderResult<Option<CapturedImage>> {
        let (reply, response) = oneshot::channel();
        if self.capture.send(CaptureRequest { reply }).await.is_err() {
            return Ok(None);
        }
        match response.await {
            Ok(result) => result.map(Some),
            Err(_) => Ok(None),
        }
    }

    /// Cancel the loop and wait for it to finish.
    ///
    /// Returns `None` if the loop was already joined.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Task`] if the loop task panicked.
    pub async fn shutdown(&mut self) -> RenderResult<Option<LoopReport>> {
        self.cancel();
        match self.task.take() {
            Some(task) => task
                .await
                .map(Some)
                .map_err(|e| RenderError::Task(e.to_string())),
            None => Ok(None),
        }
    }
}

impl Drop for RenderHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
