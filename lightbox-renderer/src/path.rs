//! Glyph path drawing.
//!
//! [`PathRenderer::draw`] paints a glyph under a caller-supplied placement.
//! The order of operations is fixed:
//!
//! ```text
//! save ─▶ translate ─▶ rotate (if ≠ 0) ─▶ scale ─▶ parse ─▶ fill ─▶ stroke ─▶ restore
//! ```
//!
//! Stroke width is divided by the applied scale so the outline keeps the same
//! on-screen thickness at every zoom level. Parse failures are logged and the
//! call draws nothing; they never reach the caller.

use std::ops::{Deref, DerefMut};

use kurbo::BezPath;
use lightbox_core::GlyphPath;
use tiny_skia::Color;

use crate::error::{RenderError, RenderResult};
use crate::surface::DrawingSurface;

/// Fill and stroke style for a glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathStyle {
    /// Outline color.
    pub stroke_color: Color,
    /// Outline width in surface pixels.
    pub stroke_width: f64,
    /// Interior color.
    pub fill_color: Color,
}

impl PathStyle {
    /// Red outline with a faint red wash, as drawn over the camera feed.
    #[must_use]
    pub fn overlay() -> Self {
        Self {
            fill_color: Color::from_rgba8(255, 0, 0, 26),
            ..Self::default()
        }
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self {
            stroke_color: Color::from_rgba8(255, 0, 0, 255),
            stroke_width: 3.0,
            fill_color: Color::from_rgba8(255, 0, 0, 51),
        }
    }
}

/// Placement of a glyph on the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathTransform {
    /// Uniform scale from glyph units to surface pixels.
    pub scale: f64,
    /// Origin X in surface pixels.
    pub offset_x: f64,
    /// Origin Y in surface pixels.
    pub offset_y: f64,
    /// Rotation in degrees.
    pub rotation: f64,
}

impl Default for PathTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            rotation: 0.0,
        }
    }
}

/// Parse SVG path data into a path.
///
/// # Errors
///
/// Returns [`RenderError::PathParse`] if the data is not valid SVG path syntax.
pub fn parse_glyph(glyph: &GlyphPath) -> RenderResult<BezPath> {
    BezPath::from_svg(glyph.as_str().trim()).map_err(|e| RenderError::PathParse(e.to_string()))
}

/// Restores the surface state when dropped.
struct SavedState<'a, S: DrawingSurface + ?Sized> {
    surface: &'a mut S,
}

impl<'a, S: DrawingSurface + ?Sized> SavedState<'a, S> {
    fn new(surface: &'a mut S) -> Self {
        surface.save();
        Self { surface }
    }
}

impl<S: DrawingSurface + ?Sized> Deref for SavedState<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: DrawingSurface + ?Sized> DerefMut for SavedState<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: DrawingSurface + ?Sized> Drop for SavedState<'_, S> {
    fn drop(&mut self) {
        self.surface.restore();
    }
}

/// Draws glyph paths, keeping the last parse result for reuse.
///
/// The render loop draws the same glyph every frame; caching the parsed path
/// (or the parse failure) keeps per-frame work to transform, fill, and stroke,
/// and logs a bad glyph once instead of sixty times a second.
#[derive(Debug, Default)]
pub struct PathRenderer {
    cached: Option<(GlyphPath, Option<BezPath>)>,
}

impl PathRenderer {
    /// Create a renderer with an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw `glyph` onto `surface` with `style`, placed by `transform`.
    pub fn draw<S: DrawingSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        glyph: &GlyphPath,
        style: &PathStyle,
        transform: &PathTransform,
    ) {
        let mut surface = SavedState::new(surface);

        surface.translate(transform.offset_x, transform.offset_y);
        if transform.rotation != 0.0 {
            surface.rotate(transform.rotation.to_radians());
        }
        surface.scale(transform.scale, transform.scale);

        let Some(path) = self.parsed(glyph) else {
            return;
        };
        if !(transform.scale.is_finite() && transform.scale > 0.0) {
            tracing::trace!(scale = transform.scale, "Skipping glyph at degenerate scale");
            return;
        }

        surface.fill_path(path, style.fill_color);
        surface.stroke_path(path, style.stroke_color, style.stroke_width / transform.scale);
    }

    fn parsed(&mut self, glyph: &GlyphPath) -> Option<&BezPath> {
        let fresh = matches!(&self.cached, Some((cached, _)) if cached == glyph);
        if !fresh {
            let parsed = match parse_glyph(glyph) {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to draw glyph path");
                    None
                }
            };
            self.cached = Some((glyph.clone(), parsed));
        }
        self.cached.as_ref().and_then(|(_, path)| path.as_ref())
    }
}

/// Draw `glyph` once without caching.
pub fn draw_path<S: DrawingSurface + ?Sized>(
    surface: &mut S,
    glyph: &GlyphPath,
    style: &PathStyle,
    transform: &PathTransform,
) {
    PathRenderer::new().draw(surface, glyph, style, transform);
}
