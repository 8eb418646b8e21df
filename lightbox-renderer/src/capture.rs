//! Still capture of the overlay surface.
//!
//! Serializes the surface raster to PNG. The live video is composited under
//! the surface by the host, so a capture holds only the overlay layer.

use image::codecs::png::PngEncoder;
use image::ImageEncoder;

use crate::error::{RenderError, RenderResult};
use crate::surface::DrawingSurface;

/// MIME type of captured images.
pub const PNG_MIME: &str = "image/png";

/// An encoded still of the drawing surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// MIME type of `data`.
    pub mime_type: &'static str,
    /// Encoded image bytes.
    pub data: Vec<u8>,
}

/// Encode the current surface contents as PNG.
///
/// # Errors
///
/// Returns [`RenderError::Export`] if encoding fails.
pub fn capture_png<S: DrawingSurface + ?Sized>(surface: &S) -> RenderResult<CapturedImage> {
    let (width, height) = (surface.width(), surface.height());
    let rgba = surface.read_pixels();

    let mut data = Vec::new();
    PngEncoder::new(&mut data)
        .write_image(&rgba, width, height, image::ColorType::Rgba8.into())
        .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))?;

    tracing::debug!(width, height, bytes = data.len(), "Surface captured");
    Ok(CapturedImage {
        width,
        height,
        mime_type: PNG_MIME,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::PixmapSurface;

    #[test]
    fn test_capture_blank_surface_is_png() {
        let surface = PixmapSurface::new(16, 9).expect("surface");
        let image = capture_png(&surface).expect("capture");

        assert_eq!(&image.data[0..4], &[137, 80, 78, 71]);
        assert_eq!((image.width, image.height), (16, 9));
        assert_eq!(image.mime_type, "image/png");
    }
}
