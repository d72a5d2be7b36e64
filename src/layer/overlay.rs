//! Placement shared by the image and symbol overlays.

use crate::params::{OFFSET_RANGE, OPACITY_RANGE, SCALE_RANGE, clamp_or};

/// Center of the overlay area on the canvas: the middle of the body below
/// the tab band.
pub const OVERLAY_ANCHOR: (f32, f32) = (235.0, 252.5);

/// Side of the square an overlay is fitted into at scale 1.0, in canvas units.
pub const OVERLAY_EXTENT: f32 = 190.0;

// ============================================================================
// OverlayPlacement
// ============================================================================

/// Size, position and opacity of an overlay.
///
/// Constructed values are clamped to the same ranges the input controls
/// use, so the compositor never sees an out-of-range transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayPlacement {
    /// Multiplier on [`OVERLAY_EXTENT`] (0.2-5.0).
    pub scale: f32,
    /// Horizontal offset from the anchor, in canvas units (-200-200).
    pub offset_x: f32,
    /// Vertical offset from the anchor, in canvas units (-200-200).
    pub offset_y: f32,
    /// Opacity the overlay is blended at (0.0-1.0).
    pub opacity: f32,
}

impl Default for OverlayPlacement {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            opacity: 1.0,
        }
    }
}

impl OverlayPlacement {
    pub fn new(scale: f32, offset_x: f32, offset_y: f32, opacity: f32) -> Self {
        Self {
            scale: clamp_or(scale, SCALE_RANGE, 1.0),
            offset_x: clamp_or(offset_x, OFFSET_RANGE, 0.0),
            offset_y: clamp_or(offset_y, OFFSET_RANGE, 0.0),
            opacity: clamp_or(opacity, OPACITY_RANGE, 1.0),
        }
    }

    /// True when the overlay would not contribute any pixel.
    pub fn is_invisible(&self) -> bool {
        self.opacity <= 0.0
    }

    /// Side of the overlay box in pixels at `resolution_scale`.
    pub fn extent_px(&self, resolution_scale: f32) -> f32 {
        OVERLAY_EXTENT * self.scale * resolution_scale
    }

    /// Top-left pixel at which a `width` x `height` bitmap is centered on the
    /// offset anchor.
    pub fn origin(&self, width: u32, height: u32, resolution_scale: f32) -> (i32, i32) {
        let center_x = (OVERLAY_ANCHOR.0 + self.offset_x) * resolution_scale;
        let center_y = (OVERLAY_ANCHOR.1 + self.offset_y) * resolution_scale;
        (
            (center_x - width as f32 / 2.0).round() as i32,
            (center_y - height as f32 / 2.0).round() as i32,
        )
    }

    pub(crate) fn differs_from(&self, other: &Self) -> bool {
        (self.scale - other.scale).abs() > 0.0001
            || (self.offset_x - other.offset_x).abs() > 0.0001
            || (self.offset_y - other.offset_y).abs() > 0.0001
            || (self.opacity - other.opacity).abs() > 0.0001
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_clamps() {
        let placement = OverlayPlacement::new(10.0, -300.0, 300.0, 2.0);
        assert_eq!(placement.scale, 5.0);
        assert_eq!(placement.offset_x, -200.0);
        assert_eq!(placement.offset_y, 200.0);
        assert_eq!(placement.opacity, 1.0);
    }

    #[test]
    fn origin_centers_on_anchor() {
        let placement = OverlayPlacement::default();
        assert_eq!(placement.origin(100, 50, 1.0), (185, 228));
        assert_eq!(placement.origin(50, 26, 0.5), (93, 113));
    }

    #[test]
    fn offsets_scale_with_resolution() {
        let placement = OverlayPlacement::new(1.0, 20.0, -10.0, 1.0);
        let (x_full, y_full) = placement.origin(0, 0, 1.0);
        let (x_half, y_half) = placement.origin(0, 0, 0.5);
        assert_eq!((x_full, y_full), (255, 243));
        assert_eq!((x_half, y_half), (128, 121));
    }

    #[test]
    fn extent_follows_scale() {
        let placement = OverlayPlacement::new(2.0, 0.0, 0.0, 1.0);
        assert_eq!(placement.extent_px(0.5), 190.0);
    }
}
