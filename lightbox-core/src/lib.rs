//! # Saorsa Light-Box Core
//!
//! Core logic for the camera light-box overlay: a reference character is
//! drawn semi-transparently over live video so it can be traced on paper.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               lightbox-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Gesture Engine     │  Capture-Device Mgr   │
//! │  - Pointer tracking │  - Preferred request  │
//! │  - Drag/pinch/wheel │  - Fallback request   │
//! │  - Reset baselines  │  - Error classes      │
//! ├─────────────────────────────────────────────┤
//! │  Transform Store    │  Controls snapshot    │
//! │  - Scale clamping   │  - Opacity            │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod camera;
pub mod controls;
pub mod error;
pub mod event;
pub mod gesture;
pub mod glyph;
pub mod media;
pub mod transform;

pub use camera::{CameraError, CameraErrorKind, CameraState, CaptureDeviceManager};
pub use controls::{ControlsState, DEFAULT_OPACITY};
pub use error::{LightboxError, LightboxResult};
pub use event::{GestureEvent, InputEvent, PointerEvent, PointerPhase, WheelEvent};
pub use gesture::{GestureEngine, WHEEL_STEP};
pub use glyph::GlyphPath;
pub use media::{
    FacingMode, MediaConstraints, MediaDevices, MediaFailure, MediaStream, VideoConstraints,
};
pub use transform::{clamp_scale, Transform, TransformStore, TransformUpdate, SCALE_MAX, SCALE_MIN};

/// Light-box core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
