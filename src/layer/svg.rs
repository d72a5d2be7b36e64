//! SVG rasterization and bitmap compositing on resvg/tiny-skia.
//!
//! Layers describe their shapes as small SVG documents laid out in canvas
//! units; [`render_document`] turns those into straight-alpha RGBA bitmaps.

use image::{Rgba, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};

use crate::error::RenderError;
use crate::icon::SizePx;

/// Rasterizes `svg` into a `size` bitmap, scaling user space by `scale`.
///
/// A document laid out on the export canvas renders at resolution scale `s`
/// with `size = SizePx::canvas_at(s)` and `scale = s`.
pub fn render_document(svg: &str, size: SizePx, scale: f32) -> Result<RgbaImage, RenderError> {
    let tree = Tree::from_str(svg, &Options::default()).map_err(|e| RenderError::Svg(e.to_string()))?;

    let Some(mut pixmap) = Pixmap::new(size.width, size.height) else {
        return Err(RenderError::SurfaceAllocation {
            width: size.width,
            height: size.height,
        });
    };
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    // tiny-skia keeps premultiplied pixels
    let straight = pixmap
        .pixels()
        .iter()
        .flat_map(|px| {
            let c = px.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    RgbaImage::from_raw(size.width, size.height, straight).ok_or(RenderError::SurfaceAllocation {
        width: size.width,
        height: size.height,
    })
}

/// Draws `src` over `dest` with its top-left corner at (`x`, `y`).
///
/// Parts of `src` outside `dest` are clipped. Fully transparent source
/// pixels leave the destination untouched.
pub fn composite_over(dest: &mut RgbaImage, src: &RgbaImage, x: i32, y: i32) {
    let (dw, dh) = (dest.width() as i64, dest.height() as i64);
    let x0 = (-(x as i64)).max(0);
    let y0 = (-(y as i64)).max(0);
    let x1 = (dw - x as i64).min(src.width() as i64);
    let y1 = (dh - y as i64).min(src.height() as i64);

    for sy in y0..y1 {
        for sx in x0..x1 {
            let top = *src.get_pixel(sx as u32, sy as u32);
            if top[3] == 0 {
                continue;
            }
            let below = dest.get_pixel_mut((sx + x as i64) as u32, (sy + y as i64) as u32);
            *below = over(top, *below);
        }
    }
}

/// Straight-alpha "source over" for one pixel.
fn over(top: Rgba<u8>, below: Rgba<u8>) -> Rgba<u8> {
    let ta = f32::from(top[3]) / 255.0;
    let ba = f32::from(below[3]) / 255.0 * (1.0 - ta);
    let alpha = ta + ba;
    if alpha <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let mut out = [0u8; 4];
    for c in 0..3 {
        let mixed = (f32::from(top[c]) * ta + f32::from(below[c]) * ba) / alpha;
        out[c] = mixed.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (alpha * 255.0).round() as u8;
    Rgba(out)
}

/// Scales every pixel's alpha by `opacity`, clamped to 0..=1.
pub fn apply_opacity(img: &mut RgbaImage, opacity: f32) {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity == 1.0 {
        return;
    }
    for px in img.pixels_mut() {
        px[3] = (f32::from(px[3]) * opacity).round() as u8;
    }
}
