//! Symbol overlay layer and the glyph library it draws from.
//!
//! Symbols are monochrome outlines stored as SVG path data on a 100x100
//! grid. They are stroked, never filled, so the selected weight preset maps
//! directly to a stroke width.

use std::collections::BTreeMap;

use super::overlay::OverlayPlacement;
use super::svg::{apply_opacity, composite_over, render_document};
use super::{DependencyVersion, LayerConfig, LayerEffect, LayerVersions, RenderContext};
use crate::color::IconColor;
use crate::error::RenderError;
use crate::icon::SizePx;
use crate::params::SymbolWeight;

/// Extra stroke width of the outline drawn behind the symbol, in grid units.
const OUTLINE_WIDTH: f32 = 3.0;
/// How much darker than the symbol color the outline is.
const OUTLINE_DARKEN: f32 = 0.25;
/// Drop shadow offset, opacity and blur radius (Gaussian standard deviation).
const SHADOW_OFFSET: f32 = 3.0;
const SHADOW_OPACITY: f32 = 0.35;
const SHADOW_BLUR: f32 = 1.5;
/// The glyph grid plus room for the widest stroke on every side.
const VIEW_BOX: (f32, f32) = (-10.0, 120.0);

const BUILTIN_SYMBOLS: &[(&str, &str)] = &[
    ("arrow.down", "M50 12 V86 M22 60 L50 88 L78 60"),
    ("bolt", "M56 6 L22 56 H48 L42 94 L78 42 H52 Z"),
    ("checkmark", "M18 52 L40 74 L82 28"),
    ("circle", "M10 50 A40 40 0 1 0 90 50 A40 40 0 1 0 10 50 Z"),
    ("cloud", "M28 78 H74 C86 78 94 70 94 58 C94 46 84 38 72 40 C68 26 56 18 44 20 C32 22 24 32 24 44 C14 46 8 54 8 62 C8 72 16 78 28 78 Z"),
    ("doc", "M24 8 H60 L78 26 V92 H24 Z M60 8 V26 H78"),
    ("folder", "M10 30 H40 L48 38 H90 V80 H10 Z"),
    ("heart", "M50 85 C20 65 8 48 8 32 C8 18 20 10 31 10 C40 10 47 16 50 24 C53 16 60 10 69 10 C80 10 92 18 92 32 C92 48 80 65 50 85 Z"),
    ("house", "M12 48 L50 14 L88 48 M22 40 V86 H78 V40 M42 86 V62 H58 V86"),
    ("magnifyingglass", "M14 42 A28 28 0 1 0 70 42 A28 28 0 1 0 14 42 Z M62 62 L90 90"),
    ("music.note", "M40 74 V16 L80 8 V66 M40 74 A12 10 0 1 1 16 74 A12 10 0 1 1 40 74 M80 66 A12 10 0 1 1 56 66 A12 10 0 1 1 80 66"),
    ("photo", "M10 20 H90 V80 H10 Z M10 70 L36 46 L56 64 L68 54 L90 72"),
    ("plus", "M50 16 V84 M16 50 H84"),
    ("star", "M50 8 L62 38 H94 L68 58 L78 90 L50 70 L22 90 L32 58 L6 38 H38 Z"),
    ("xmark", "M22 22 L78 78 M78 22 L22 78"),
];

// ============================================================================
// SymbolLibrary
// ============================================================================

/// Named glyphs available to the symbol overlay.
#[derive(Debug, Clone, Default)]
pub struct SymbolLibrary {
    symbols: BTreeMap<String, String>,
}

impl SymbolLibrary {
    /// An empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// The library of built-in glyphs.
    pub fn builtin() -> Self {
        let mut library = Self::new();
        for (name, path) in BUILTIN_SYMBOLS {
            library.insert(*name, *path);
        }
        library
    }

    /// Adds or replaces a glyph. `path` is SVG path data on a 100x100 grid.
    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<String>) {
        self.symbols.insert(name.into(), path.into());
    }

    /// Path data for `name`, if the glyph exists.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.symbols.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Glyph names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.symbols.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

// ============================================================================
// SymbolOverlayConfig
// ============================================================================

/// Configuration for a symbol drawn over the folder.
///
/// The glyph is stroked at the weight preset's width and tinted with
/// `color`. A darker outline and a blurred drop shadow sit behind it so the
/// symbol stays legible whatever the folder color is.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolOverlayConfig {
    /// Glyph name, kept for diagnostics.
    pub name: String,
    /// Resolved path data on the 100x100 grid.
    pub path: String,
    pub color: IconColor,
    pub weight: SymbolWeight,
    pub placement: OverlayPlacement,
}

impl SymbolOverlayConfig {
    /// Resolves `name` in `library`. Returns `None` for unknown glyphs.
    pub fn from_library(
        library: &SymbolLibrary,
        name: &str,
        color: IconColor,
        weight: SymbolWeight,
        placement: OverlayPlacement,
    ) -> Option<Self> {
        Some(Self {
            name: name.to_string(),
            path: library.get(name)?.to_string(),
            color,
            weight,
            placement,
        })
    }

    /// The SVG document for this symbol, outline and shadow included.
    fn document(&self) -> String {
        let width = self.weight.stroke_width();
        let outline = self.color.darkened(OUTLINE_DARKEN);
        let (min, side) = VIEW_BOX;
        format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{side}" height="{side}" viewBox="{min} {min} {side} {side}"><defs><filter id="shadow" filterUnits="userSpaceOnUse" x="{min}" y="{min}" width="{side}" height="{side}"><feGaussianBlur stdDeviation="{blur}"/></filter></defs><g fill="none" stroke-linecap="round" stroke-linejoin="round"><path d="{d}" stroke="#000000" stroke-opacity="{shadow}" stroke-width="{outer}" transform="translate(0 {dy})" filter="url(#shadow)"/><path d="{d}" stroke="{outline}" stroke-opacity="{outline_opacity}" stroke-width="{outer}"/><path d="{d}" stroke="{fill}" stroke-opacity="{fill_opacity}" stroke-width="{width}"/></g></svg>"##,
            d = self.path,
            shadow = SHADOW_OPACITY,
            blur = SHADOW_BLUR,
            outer = width + OUTLINE_WIDTH,
            dy = SHADOW_OFFSET,
            outline = outline.svg_rgb(),
            outline_opacity = outline.opacity(),
            fill = self.color.svg_rgb(),
            fill_opacity = self.color.opacity(),
        )
    }
}

impl LayerConfig for SymbolOverlayConfig {
    fn differs_from(&self, other: &Self) -> bool {
        self.path != other.path
            || self.color != other.color
            || self.weight != other.weight
            || self.placement.differs_from(&other.placement)
    }
}

impl LayerEffect for SymbolOverlayConfig {
    fn dependencies(versions: &LayerVersions) -> DependencyVersion {
        DependencyVersion::of(&[versions.body, versions.tab, versions.image])
    }

    fn transform(&self, ctx: &mut RenderContext) -> Result<(), RenderError> {
        if self.placement.is_invisible() {
            return Ok(());
        }

        let side = self.placement.extent_px(ctx.scale()).round().max(1.0) as u32;
        let mut glyph = render_document(
            &self.document(),
            SizePx::new(side, side),
            side as f32 / VIEW_BOX.1,
        )?;
        apply_opacity(&mut glyph, self.placement.opacity);

        let (x, y) = self.placement.origin(side, side, ctx.scale());
        composite_over(&mut ctx.image.data, &glyph, x, y);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icon::IconImage;

    const ORANGE: IconColor = IconColor::rgb(255, 128, 0);

    fn canvas() -> RenderContext {
        RenderContext::new(IconImage::blank(SizePx::canvas_at(1.0).unwrap(), 1.0))
    }

    fn bar_library() -> SymbolLibrary {
        let mut library = SymbolLibrary::new();
        library.insert("bar", "M0 50 H100");
        library
    }

    fn painted(ctx: &RenderContext, color: IconColor) -> usize {
        ctx.image
            .data
            .pixels()
            .filter(|p| p.0 == color.to_array())
            .count()
    }

    #[test]
    fn builtin_library_parses_every_glyph() {
        let library = SymbolLibrary::builtin();
        assert_eq!(library.len(), BUILTIN_SYMBOLS.len());
        for name in library.names() {
            let config = SymbolOverlayConfig::from_library(
                &library,
                name,
                ORANGE,
                SymbolWeight::Regular,
                OverlayPlacement::default(),
            )
            .unwrap();
            let mut ctx = canvas();
            config.transform(&mut ctx).unwrap();
            assert!(painted(&ctx, ORANGE) > 0, "{name} drew nothing");
        }
    }

    #[test]
    fn unknown_symbol_does_not_resolve() {
        let library = SymbolLibrary::builtin();
        assert!(
            SymbolOverlayConfig::from_library(
                &library,
                "no.such.symbol",
                ORANGE,
                SymbolWeight::Regular,
                OverlayPlacement::default(),
            )
            .is_none()
        );
    }

    #[test]
    fn stroke_is_tinted_at_the_anchor() {
        let config = SymbolOverlayConfig::from_library(
            &bar_library(),
            "bar",
            ORANGE,
            SymbolWeight::Regular,
            OverlayPlacement::default(),
        )
        .unwrap();
        let mut ctx = canvas();
        config.transform(&mut ctx).unwrap();

        assert_eq!(ctx.image.data.get_pixel(235, 252).0, ORANGE.to_array());
        // Nothing far from the bar
        assert_eq!(ctx.image.data.get_pixel(235, 180).0[3], 0);
    }

    #[test]
    fn heavier_weight_paints_more() {
        let library = bar_library();
        let draw = |weight| {
            let config = SymbolOverlayConfig::from_library(
                &library,
                "bar",
                ORANGE,
                weight,
                OverlayPlacement::default(),
            )
            .unwrap();
            let mut ctx = canvas();
            config.transform(&mut ctx).unwrap();
            painted(&ctx, ORANGE)
        };

        assert!(draw(SymbolWeight::Black) > draw(SymbolWeight::Regular));
        assert!(draw(SymbolWeight::Regular) > draw(SymbolWeight::UltraLight));
    }

    #[test]
    fn outline_surrounds_the_stroke() {
        let config = SymbolOverlayConfig::from_library(
            &bar_library(),
            "bar",
            ORANGE,
            SymbolWeight::Regular,
            OverlayPlacement::default(),
        )
        .unwrap();
        let mut ctx = canvas();
        config.transform(&mut ctx).unwrap();

        let outline = ORANGE.darkened(OUTLINE_DARKEN);
        assert!(painted(&ctx, outline) > 0);
    }

    #[test]
    fn shadow_fades_out_below_the_outline() {
        let config = SymbolOverlayConfig::from_library(
            &bar_library(),
            "bar",
            ORANGE,
            SymbolWeight::Regular,
            OverlayPlacement::default(),
        )
        .unwrap();
        let mut ctx = canvas();
        config.transform(&mut ctx).unwrap();

        // Walk down the column through the bar: below the outline only the
        // blurred shadow remains, fading over several pixels
        let fade: Vec<u8> = (252..300)
            .map(|y| ctx.image.data.get_pixel(235, y).0)
            .filter(|p| p[..3] == [0, 0, 0] && p[3] > 0)
            .map(|p| p[3])
            .collect();
        let mut levels = fade.clone();
        levels.dedup();
        assert!(levels.len() >= 3, "shadow rows: {fade:?}");
        assert!(fade.last() < fade.first(), "{fade:?}");
    }

    #[test]
    fn zero_opacity_draws_nothing() {
        let placement = OverlayPlacement::new(1.0, 0.0, 0.0, 0.0);
        let config = SymbolOverlayConfig::from_library(
            &bar_library(),
            "bar",
            ORANGE,
            SymbolWeight::Black,
            placement,
        )
        .unwrap();
        let mut ctx = canvas();
        config.transform(&mut ctx).unwrap();
        assert!(ctx.image.data.pixels().all(|p| p[3] == 0));
    }
}
