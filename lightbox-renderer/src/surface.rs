//! 2D drawing surfaces.
//!
//! [`DrawingSurface`] is a small Canvas2D-like context: a current transform
//! and global alpha that can be saved and restored, plus path fill/stroke.
//! [`PixmapSurface`] implements it on a tiny-skia raster.

use kurbo::{BezPath, PathEl};
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::error::{RenderError, RenderResult};

/// A 2D raster target the overlay paints into.
pub trait DrawingSurface: Send {
    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// Reallocate to `width` x `height`. Contents and drawing state are reset.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be allocated.
    fn resize(&mut self, width: u32, height: u32) -> RenderResult<()>;

    /// Clear every pixel to transparent. Drawing state is kept.
    fn clear(&mut self);

    /// Push the current transform and global alpha.
    fn save(&mut self);

    /// Pop the last saved transform and global alpha. No-op if nothing is saved.
    fn restore(&mut self);

    /// Move the origin by `(dx, dy)` in current coordinates.
    fn translate(&mut self, dx: f64, dy: f64);

    /// Rotate the coordinate system clockwise by `radians`.
    fn rotate(&mut self, radians: f64);

    /// Scale the coordinate system.
    fn scale(&mut self, sx: f64, sy: f64);

    /// Set the alpha multiplied into every subsequent paint.
    fn set_global_alpha(&mut self, alpha: f64);

    /// Current global alpha.
    fn global_alpha(&self) -> f64;

    /// Fill `path` (non-zero winding) with `color` under the current transform.
    fn fill_path(&mut self, path: &BezPath, color: Color);

    /// Stroke `path` with `color` at `width` in current coordinates.
    fn stroke_path(&mut self, path: &BezPath, color: Color, width: f64);

    /// Straight-alpha RGBA8 pixels, row-major, top row first.
    fn read_pixels(&self) -> Vec<u8>;
}

#[derive(Debug, Clone, Copy)]
struct DrawState {
    transform: Transform,
    alpha: f32,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Transform::identity(),
            alpha: 1.0,
        }
    }
}

/// CPU raster surface backed by a tiny-skia [`Pixmap`].
pub struct PixmapSurface {
    pixmap: Pixmap,
    state: DrawState,
    saved: Vec<DrawState>,
}

impl std::fmt::Debug for PixmapSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixmapSurface")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("saved", &self.saved.len())
            .finish()
    }
}

impl PixmapSurface {
    /// Allocate a transparent surface.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is zero or the size overflows.
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        Ok(Self {
            pixmap: allocate(width, height)?,
            state: DrawState::default(),
            saved: Vec::new(),
        })
    }

    /// Depth of the save stack.
    #[must_use]
    pub fn saved_depth(&self) -> usize {
        self.saved.len()
    }

    fn paint(&self, color: Color) -> Paint<'static> {
        let mut color = color;
        color.apply_opacity(self.state.alpha);
        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;
        paint
    }
}

fn allocate(width: u32, height: u32) -> RenderResult<Pixmap> {
    Pixmap::new(width, height)
        .ok_or_else(|| RenderError::Surface(format!("cannot allocate {width}x{height} pixmap")))
}

#[allow(clippy::cast_possible_truncation)]
fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p) => pb.quad_to(p1.x as f32, p1.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(p1, p2, p) => pb.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

#[allow(clippy::cast_possible_truncation)]
impl DrawingSurface for PixmapSurface {
    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        if width == self.pixmap.width() && height == self.pixmap.height() {
            return Ok(());
        }
        self.pixmap = allocate(width, height)?;
        self.state = DrawState::default();
        self.saved.clear();
        tracing::debug!("Surface resized to {}x{}", width, height);
        Ok(())
    }

    fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }

    fn save(&mut self) {
        self.saved.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.state.transform = self.state.transform.pre_translate(dx as f32, dy as f32);
    }

    fn rotate(&mut self, radians: f64) {
        let rotation = Transform::from_rotate(radians.to_degrees() as f32);
        self.state.transform = self.state.transform.pre_concat(rotation);
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.state.transform = self.state.transform.pre_scale(sx as f32, sy as f32);
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        if alpha.is_finite() {
            self.state.alpha = alpha.clamp(0.0, 1.0) as f32;
        }
    }

    fn global_alpha(&self) -> f64 {
        f64::from(self.state.alpha)
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        let Some(path) = to_skia_path(path) else {
            return;
        };
        let paint = self.paint(color);
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, self.state.transform, None);
    }

    fn stroke_path(&mut self, path: &BezPath, color: Color, width: f64) {
        let Some(path) = to_skia_path(path) else {
            return;
        };
        let paint = self.paint(color);
        let stroke = Stroke {
            width: width as f32,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, self.state.transform, None);
    }

    fn read_pixels(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixmap.data().len());
        for pixel in self.pixmap.pixels() {
            let c = pixel.demultiply();
            out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn unit_square() -> BezPath {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((1.0, 0.0));
        path.line_to((1.0, 1.0));
        path.line_to((0.0, 1.0));
        path.close_path();
        path
    }

    fn pixel(surface: &PixmapSurface, x: u32, y: u32) -> [u8; 4] {
        let px = surface.read_pixels();
        let i = ((y * surface.width() + x) * 4) as usize;
        [px[i], px[i + 1], px[i + 2], px[i + 3]]
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            PixmapSurface::new(0, 10),
            Err(RenderError::Surface(_))
        ));
    }

    #[test]
    fn test_fill_under_transform() {
        let mut surface = PixmapSurface::new(20, 20).expect("surface");
        surface.translate(5.0, 5.0);
        surface.scale(10.0, 10.0);
        surface.fill_path(&unit_square(), Color::from_rgba8(0, 0, 255, 255));

        assert_eq!(pixel(&surface, 10, 10), [0, 0, 255, 255]);
        assert_eq!(pixel(&surface, 2, 2)[3], 0);
    }

    #[test]
    fn test_global_alpha_applies_to_paint() {
        let mut surface = PixmapSurface::new(4, 4).expect("surface");
        surface.set_global_alpha(0.5);
        surface.scale(4.0, 4.0);
        surface.fill_path(&unit_square(), Color::from_rgba8(255, 0, 0, 255));

        let alpha = pixel(&surface, 1, 1)[3];
        assert!((126..=129).contains(&alpha), "alpha was {alpha}");
    }

    #[test]
    fn test_save_restore_round_trips_state() {
        let mut surface = PixmapSurface::new(4, 4).expect("surface");
        surface.save();
        surface.translate(3.0, 3.0);
        surface.set_global_alpha(0.2);
        surface.restore();

        assert_eq!(surface.global_alpha(), 1.0);
        assert_eq!(surface.state.transform, Transform::identity());
        surface.restore();
        assert_eq!(surface.saved_depth(), 0);
    }

    #[test]
    fn test_resize_resets_contents_and_state() {
        let mut surface = PixmapSurface::new(4, 4).expect("surface");
        surface.scale(4.0, 4.0);
        surface.fill_path(&unit_square(), Color::BLACK);
        surface.save();
        surface.resize(8, 6).expect("resize");

        assert_eq!((surface.width(), surface.height()), (8, 6));
        assert_eq!(surface.saved_depth(), 0);
        assert!(surface.read_pixels().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_clear_keeps_state() {
        let mut surface = PixmapSurface::new(4, 4).expect("surface");
        surface.set_global_alpha(0.3);
        surface.scale(4.0, 4.0);
        surface.fill_path(&unit_square(), Color::BLACK);
        surface.clear();

        assert!(surface.read_pixels().iter().all(|b| *b == 0));
        assert!((surface.global_alpha() - 0.3).abs() < 1e-6);
    }
}
