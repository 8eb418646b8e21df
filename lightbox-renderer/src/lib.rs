//! # Saorsa Light-Box Renderer
//!
//! CPU overlay renderer: draws the reference glyph over the live camera feed,
//! redraws it every display frame, and captures the overlay as PNG.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │        RenderLoop (tokio task)              │
//! ├──────────────┬──────────────┬───────────────┤
//! │ PathRenderer │ FrameSource  │ capture_png   │
//! │ (kurbo)      │ (clock/vsync)│ (image)       │
//! ├──────────────┴──────────────┴───────────────┤
//! │   DrawingSurface: PixmapSurface (tiny-skia) │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod capture;
pub mod error;
pub mod frame;
pub mod path;
pub mod render_loop;
pub mod surface;

pub use capture::{capture_png, CapturedImage, PNG_MIME};
pub use error::{RenderError, RenderResult};
pub use frame::{DisplayClock, FrameSource, TickChannel};
pub use path::{draw_path, parse_glyph, PathRenderer, PathStyle, PathTransform};
pub use render_loop::{
    render_frame, LoopExit, LoopReport, RenderHandle, RenderLoop, GLYPH_UNIT_SCALE,
};
pub use surface::{DrawingSurface, PixmapSurface};

/// Configuration for a session's render loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderLoopConfig {
    /// Display refresh rate used by [`DisplayClock`].
    pub refresh_rate_hz: u32,
    /// Glyph style.
    pub style: PathStyle,
}

impl Default for RenderLoopConfig {
    fn default() -> Self {
        Self {
            refresh_rate_hz: 60,
            style: PathStyle::overlay(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RenderLoopConfig::default();
        assert_eq!(config.refresh_rate_hz, 60);
        assert_eq!(config.style, PathStyle::overlay());
    }
}
