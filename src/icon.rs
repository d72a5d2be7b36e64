//! Canvas geometry and the bitmap type layers draw into.
//!
//! Layout is expressed in canvas units on the 470x395 export canvas. A
//! render at resolution scale `s` is `round(470 * s) x round(395 * s)` pixels.

use image::RgbaImage;

use crate::error::RenderError;

/// Width of the export canvas, in canvas units.
pub const CANVAS_WIDTH: f32 = 470.0;
/// Height of the export canvas, in canvas units.
pub const CANVAS_HEIGHT: f32 = 395.0;
/// Largest canvas a render allocates, in bytes of RGBA data (1 GiB).
pub const MAX_SURFACE_BYTES: u64 = 1 << 30;

/// Pixel rectangle, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RectPx {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl RectPx {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SizePx {
    pub width: u32,
    pub height: u32,
}

impl SizePx {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Pixel size of the export canvas at `resolution_scale`.
    ///
    /// Zero, negative and non-finite scales are rejected with
    /// [`RenderError::InvalidScale`]. Each side is at least one pixel.
    /// Canvases over [`MAX_SURFACE_BYTES`] fail with
    /// [`RenderError::SurfaceAllocation`] before anything is allocated.
    pub fn canvas_at(resolution_scale: f32) -> Result<Self, RenderError> {
        if !resolution_scale.is_finite() || resolution_scale <= 0.0 {
            return Err(RenderError::InvalidScale(resolution_scale));
        }
        let side = |units: f32| (units * resolution_scale).round().max(1.0) as u32;
        let size = Self::new(side(CANVAS_WIDTH), side(CANVAS_HEIGHT));
        if size.rgba_bytes().is_none_or(|bytes| bytes > MAX_SURFACE_BYTES) {
            return Err(RenderError::SurfaceAllocation {
                width: size.width,
                height: size.height,
            });
        }
        Ok(size)
    }

    /// Bytes of an RGBA bitmap this size, `None` on overflow.
    pub fn rgba_bytes(&self) -> Option<u64> {
        u64::from(self.width)
            .checked_mul(u64::from(self.height))?
            .checked_mul(4)
    }
}

/// A rendered bitmap tagged with the resolution scale it was drawn at
/// (1.0 for the full-size export, smaller for previews).
#[derive(Debug, Clone, PartialEq)]
pub struct IconImage {
    pub data: RgbaImage,
    pub scale: f32,
}

impl IconImage {
    /// Fully transparent.
    pub fn blank(size: SizePx, scale: f32) -> Self {
        Self {
            data: RgbaImage::new(size.width, size.height),
            scale,
        }
    }

    pub fn dimensions(&self) -> SizePx {
        let (width, height) = self.data.dimensions();
        SizePx::new(width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_at_full_and_preview_scale() {
        assert_eq!(SizePx::canvas_at(1.0).unwrap(), SizePx::new(470, 395));
        assert_eq!(SizePx::canvas_at(0.5).unwrap(), SizePx::new(235, 198));
        assert_eq!(SizePx::canvas_at(0.25).unwrap(), SizePx::new(118, 99));
        assert_eq!(SizePx::canvas_at(0.0001).unwrap(), SizePx::new(1, 1));
    }

    #[test]
    fn canvas_rejects_bad_scales() {
        assert!(matches!(SizePx::canvas_at(0.0), Err(RenderError::InvalidScale(_))));
        assert!(SizePx::canvas_at(-1.0).is_err());
        assert!(SizePx::canvas_at(f32::NAN).is_err());
        assert!(SizePx::canvas_at(f32::INFINITY).is_err());
    }

    #[test]
    fn oversized_canvas_is_refused_before_allocating() {
        assert!(SizePx::canvas_at(16.0).is_ok());
        assert!(matches!(
            SizePx::canvas_at(1e5),
            Err(RenderError::SurfaceAllocation { width: 47_000_000, height: 39_500_000 })
        ));
        assert!(matches!(
            SizePx::canvas_at(1e10),
            Err(RenderError::SurfaceAllocation { width: u32::MAX, height: u32::MAX })
        ));
        assert_eq!(SizePx::new(u32::MAX, u32::MAX).rgba_bytes(), None);
        assert_eq!(SizePx::new(470, 395).rgba_bytes(), Some(742_600));
    }

    #[test]
    fn blank_icon_is_transparent() {
        let img = IconImage::blank(SizePx::new(3, 2), 0.5);
        assert_eq!(img.dimensions(), SizePx::new(3, 2));
        assert!(img.data.pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }
}
