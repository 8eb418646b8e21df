//! # Saorsa Light-Box Desktop
//!
//! Headless host for the light-box overlay.
//!
//! This crate wires an [`OverlaySession`] to a camera, replays a scripted
//! set of gestures, renders a number of frames and writes a still capture of
//! the overlay to disk. The camera is synthetic, with selectable failure
//! modes, so the whole acquisition path can be driven without hardware.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p lightbox-desktop -- --drag-x 120 --drag-y -40 --output trace.png
//! ```
//!
//! ## Simulating a camera failure:
//!
//! ```bash
//! cargo run -p lightbox-desktop -- --camera-failure permission-denied
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `HostConfig` - Surface size, glyph, gesture script, frame pacing, output
//! - `OverlaySession` - Camera, gestures, controls and render loop for one overlay
//! - `SyntheticCamera` - `MediaDevices` implementation for headless runs

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod script;
mod session;
mod synthetic;

pub use script::GestureScript;
pub use session::{OverlaySession, SessionConfig, SessionError, SessionResult};
pub use synthetic::{CameraFailure, SyntheticCamera, SyntheticStream};

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use lightbox_core::{CameraState, ControlsState, GlyphPath, LightboxResult, DEFAULT_OPACITY};
use lightbox_renderer::{PathStyle, RenderLoopConfig};
use serde::Serialize;
use uuid::Uuid;

/// Upper bound on the wait for frames, in frame periods beyond those asked for.
const FRAME_SLACK: u32 = 120;

/// Glyph drawn when none is given: a Latin capital A, one unit tall.
pub const DEFAULT_GLYPH: &str = "M -0.35 0.5 L 0 -0.5 L 0.35 0.5 M -0.2 0.1 L 0.2 0.1";

/// Command-line arguments for lightbox-desktop.
#[derive(Debug, Clone, Parser)]
#[command(name = "lightbox-desktop")]
#[command(about = "Saorsa light-box headless overlay host")]
#[command(version)]
pub struct CliArgs {
    /// Surface width in pixels
    #[arg(long, env = "LIGHTBOX_WIDTH", default_value = "1280")]
    pub width: u32,

    /// Surface height in pixels
    #[arg(long, env = "LIGHTBOX_HEIGHT", default_value = "720")]
    pub height: u32,

    /// Reference glyph as SVG path data
    #[arg(long, env = "LIGHTBOX_GLYPH", default_value = DEFAULT_GLYPH)]
    pub glyph: String,

    /// Overlay opacity between 0 and 1
    #[arg(long, default_value = "0.5")]
    pub opacity: f64,

    /// Horizontal drag distance in pixels
    #[arg(long, allow_negative_numbers = true)]
    pub drag_x: Option<f64>,

    /// Vertical drag distance in pixels
    #[arg(long, allow_negative_numbers = true)]
    pub drag_y: Option<f64>,

    /// Pinch zoom factor
    #[arg(long)]
    pub pinch_scale: Option<f64>,

    /// Pinch twist in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub pinch_rotation: Option<f64>,

    /// Wheel notch delta, repeatable (negative zooms in)
    #[arg(long, allow_negative_numbers = true)]
    pub wheel: Vec<f64>,

    /// Frames to render before capturing
    #[arg(long, default_value = "3")]
    pub frames: u32,

    /// Display refresh rate in Hz
    #[arg(long, env = "LIGHTBOX_REFRESH_RATE", default_value = "60")]
    pub refresh_rate: u32,

    /// Simulated camera behavior
    #[arg(long, env = "LIGHTBOX_CAMERA_FAILURE", value_enum, default_value_t = CameraFailure::None)]
    pub camera_failure: CameraFailure,

    /// Where to write the captured PNG
    #[arg(long, env = "LIGHTBOX_OUTPUT", default_value = "lightbox-capture.png")]
    pub output: PathBuf,
}

/// Headless host configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Reference glyph path data.
    pub glyph: String,
    /// Initial overlay opacity.
    pub opacity: f64,
    /// Gestures replayed after the camera starts.
    pub script: GestureScript,
    /// Frames rendered before capture.
    pub frames: u32,
    /// Display refresh rate in Hz.
    pub refresh_rate_hz: u32,
    /// Simulated camera behavior.
    pub camera_failure: CameraFailure,
    /// Capture destination.
    pub output: PathBuf,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl HostConfig {
    /// Create a host configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            width: 1280,
            height: 720,
            glyph: DEFAULT_GLYPH.to_string(),
            opacity: DEFAULT_OPACITY,
            script: GestureScript::default(),
            frames: 3,
            refresh_rate_hz: 60,
            camera_failure: CameraFailure::None,
            output: PathBuf::from("lightbox-capture.png"),
        }
    }

    /// Time between display frames.
    #[must_use]
    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.refresh_rate_hz.max(1)))
    }

    /// Longest wait for the requested frames before giving up.
    #[must_use]
    pub fn frame_budget(&self) -> Duration {
        self.frame_period()
            .saturating_mul(self.frames.max(1).saturating_add(FRAME_SLACK))
    }

    /// Build the session configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the glyph is blank.
    pub fn session_config(&self) -> LightboxResult<SessionConfig> {
        Ok(SessionConfig {
            width: self.width,
            height: self.height,
            glyph: GlyphPath::new(self.glyph.as_str())?,
            opacity: self.opacity,
            render: RenderLoopConfig {
                refresh_rate_hz: self.refresh_rate_hz,
                style: PathStyle::overlay(),
            },
        })
    }
}

impl From<CliArgs> for HostConfig {
    fn from(args: CliArgs) -> Self {
        let drag = match (args.drag_x, args.drag_y) {
            (None, None) => None,
            (x, y) => Some((x.unwrap_or(0.0), y.unwrap_or(0.0))),
        };
        let pinch = match (args.pinch_scale, args.pinch_rotation) {
            (None, None) => None,
            (scale, rotation) => Some((scale.unwrap_or(1.0), rotation.unwrap_or(0.0))),
        };

        Self {
            width: args.width,
            height: args.height,
            glyph: args.glyph,
            opacity: args.opacity,
            script: GestureScript {
                drag,
                pinch,
                wheel: args.wheel,
            },
            frames: args.frames,
            refresh_rate_hz: args.refresh_rate,
            camera_failure: args.camera_failure,
            output: args.output,
        }
    }
}

/// Outcome of a headless run, printed as JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Session identifier.
    pub session_id: Uuid,
    /// Final camera state.
    pub camera: CameraState,
    /// Controls at capture time.
    pub controls: ControlsState,
    /// Frames drawn.
    pub frames_rendered: u64,
    /// Overlay opacity as shown on the slider.
    pub opacity_percent: i64,
    /// Where the capture was written, if one was taken.
    pub capture: Option<PathBuf>,
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let args = CliArgs::parse_from(["lightbox-desktop"]);
        let config = HostConfig::from(args);

        assert_eq!(config, HostConfig::new());
        assert!(config.script.is_empty());
    }

    #[test]
    fn test_cli_gesture_script() {
        let args = CliArgs::parse_from([
            "lightbox-desktop",
            "--drag-x",
            "120",
            "--drag-y",
            "-40",
            "--pinch-rotation",
            "45",
            "--wheel",
            "-100",
            "--wheel",
            "-100",
            "--camera-failure",
            "permission-denied",
        ]);
        let config = HostConfig::from(args);

        assert_eq!(config.script.drag, Some((120.0, -40.0)));
        assert_eq!(config.script.pinch, Some((1.0, 45.0)));
        assert_eq!(config.script.wheel, vec![-100.0, -100.0]);
        assert_eq!(config.camera_failure, CameraFailure::PermissionDenied);
    }

    #[test]
    fn test_blank_glyph_rejected() {
        let config = HostConfig {
            glyph: " ".to_string(),
            ..HostConfig::new()
        };
        assert!(config.session_config().is_err());
    }

    #[test]
    fn test_frame_budget() {
        let config = HostConfig::new();
        assert_eq!(config.frame_period(), Duration::from_secs_f64(1.0 / 60.0));
        assert_eq!(config.frame_budget(), config.frame_period() * 123);

        let huge = HostConfig {
            frames: u32::MAX,
            ..HostConfig::new()
        };
        assert_eq!(huge.frame_budget(), huge.frame_period() * u32::MAX);

        let stalled = HostConfig {
            frames: 0,
            refresh_rate_hz: 0,
            ..HostConfig::new()
        };
        assert_eq!(stalled.frame_budget(), Duration::from_secs(121));
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = RunReport {
            session_id: Uuid::nil(),
            camera: CameraState::Active,
            controls: ControlsState::default(),
            frames_rendered: 4,
            opacity_percent: 50,
            capture: None,
        };
        let json = serde_json::to_value(&report).expect("serialize");

        assert_eq!(json["framesRendered"], 4);
        assert_eq!(json["opacityPercent"], 50);
        assert_eq!(json["camera"]["state"], "active");
        assert_eq!(json["controls"]["opacity"], 0.5);
    }
}
