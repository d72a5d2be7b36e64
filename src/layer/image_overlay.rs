//! Bitmap overlay layer configuration and application.

use std::sync::Arc;

use image::RgbaImage;
use image::imageops::{self, FilterType};

use super::overlay::OverlayPlacement;
use super::svg::{apply_opacity, composite_over};
use super::{BodyShade, DependencyVersion, LayerConfig, LayerEffect, LayerVersions, RenderContext};
use crate::color::IconColor;
use crate::error::RenderError;

/// How much darker than the body an imprinted image is drawn.
const IMPRINT_DARKEN: f32 = 0.15;

// ============================================================================
// ImageOverlayConfig
// ============================================================================

/// Configuration for a user-supplied bitmap drawn over the folder.
///
/// The bitmap is fitted into the overlay box (preserving aspect ratio),
/// scaled, offset and blended according to [`OverlayPlacement`].
///
/// With `imprint` set (advanced rendering), the bitmap is first recolored as
/// a monochrome stamp in a darkened shade of the folder body, keeping only
/// its alpha mask.
///
/// # Consumed Properties
///
/// - [`BodyShade`]: the color the imprint is derived from. Without it the
///   imprint falls back to black.
#[derive(Debug, Clone)]
pub struct ImageOverlayConfig {
    pub image: Arc<RgbaImage>,
    pub placement: OverlayPlacement,
    pub imprint: bool,
}

impl ImageOverlayConfig {
    pub fn new(image: Arc<RgbaImage>, placement: OverlayPlacement, imprint: bool) -> Self {
        Self {
            image,
            placement,
            imprint,
        }
    }
}

impl LayerConfig for ImageOverlayConfig {
    fn differs_from(&self, other: &Self) -> bool {
        !Arc::ptr_eq(&self.image, &other.image)
            || self.imprint != other.imprint
            || self.placement.differs_from(&other.placement)
    }
}

impl LayerEffect for ImageOverlayConfig {
    fn dependencies(versions: &LayerVersions) -> DependencyVersion {
        DependencyVersion::of(&[versions.body, versions.tab])
    }

    fn transform(&self, ctx: &mut RenderContext) -> Result<(), RenderError> {
        if self.placement.is_invisible() || self.image.width() == 0 || self.image.height() == 0 {
            return Ok(());
        }

        let (width, height) = fit_dimensions(
            self.image.width(),
            self.image.height(),
            self.placement.extent_px(ctx.scale()),
        );

        let mut overlay = if self.imprint {
            let shade = ctx
                .get::<BodyShade>()
                .map(|s| s.0)
                .unwrap_or(IconColor::BLACK)
                .darkened(IMPRINT_DARKEN);
            let stamped = imprint(&self.image, shade);
            imageops::resize(&stamped, width, height, FilterType::Lanczos3)
        } else {
            imageops::resize(self.image.as_ref(), width, height, FilterType::Lanczos3)
        };

        apply_opacity(&mut overlay, self.placement.opacity);

        let (x, y) = self.placement.origin(width, height, ctx.scale());
        composite_over(&mut ctx.image.data, &overlay, x, y);
        Ok(())
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Scales `width` x `height` so the longer side equals `extent` pixels.
fn fit_dimensions(width: u32, height: u32, extent: f32) -> (u32, u32) {
    let ratio = extent / width.max(height) as f32;
    (
        (width as f32 * ratio).round().max(1.0) as u32,
        (height as f32 * ratio).round().max(1.0) as u32,
    )
}

/// Recolors every pixel to `color`, keeping the source alpha as a mask.
pub fn imprint(image: &RgbaImage, color: IconColor) -> RgbaImage {
    let mut out = image.clone();
    let tint_alpha = color.a as u32;
    for pixel in out.pixels_mut() {
        let a = (pixel[3] as u32 * tint_alpha + 127) / 255;
        pixel.0 = [color.r, color.g, color.b, a as u8];
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
