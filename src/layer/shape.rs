//! Folder body and tab layers.
//!
//! Both shapes live at fixed positions on the 470x395 canvas. The body is a
//! rounded panel filling the canvas below y=48; the tab is drawn over it,
//! covering the top band and rising to y=20 on the left.

use super::svg::{composite_over, render_document};
use super::{BodyShade, DependencyVersion, LayerConfig, LayerEffect, LayerVersions, RenderContext};
use crate::color::IconColor;
use crate::error::RenderError;
use crate::icon::{CANVAS_HEIGHT, CANVAS_WIDTH};

/// Outline of the folder body, in canvas units.
pub const BODY_PATH: &str =
    "M28 48 H442 Q470 48 470 76 V367 Q470 395 442 395 H28 Q0 395 0 367 V76 Q0 48 28 48 Z";

/// Outline of the folder tab, in canvas units.
pub const TAB_PATH: &str =
    "M0 110 V48 Q0 20 28 20 H158 Q172 20 182 30 L198 48 H442 Q470 48 470 76 V110 Z";

/// Fills `path` with `color` across the whole canvas and composites it.
fn draw_shape(ctx: &mut RenderContext, path: &str, color: IconColor) -> Result<(), RenderError> {
    let doc = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><path d="{path}" fill="{fill}" fill-opacity="{opacity}"/></svg>"#,
        w = CANVAS_WIDTH,
        h = CANVAS_HEIGHT,
        fill = color.svg_rgb(),
        opacity = color.opacity(),
    );

    let layer = render_document(&doc, ctx.image.dimensions(), ctx.scale())?;
    composite_over(&mut ctx.image.data, &layer, 0, 0);
    Ok(())
}

// ============================================================================
// BodyConfig
// ============================================================================

/// Configuration for the folder body.
///
/// # Emitted Properties
///
/// - [`BodyShade`]: the body fill color.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyConfig {
    pub color: IconColor,
}

impl BodyConfig {
    pub fn new(color: IconColor) -> Self {
        Self { color }
    }
}

impl LayerConfig for BodyConfig {
    fn differs_from(&self, other: &Self) -> bool {
        self.color != other.color
    }
}

impl LayerEffect for BodyConfig {
    fn dependencies(_versions: &LayerVersions) -> DependencyVersion {
        DependencyVersion::BASE
    }

    fn transform(&self, ctx: &mut RenderContext) -> Result<(), RenderError> {
        draw_shape(ctx, BODY_PATH, self.color)
    }

    fn emit(&self, ctx: &mut RenderContext) {
        ctx.set(BodyShade(self.color));
    }
}

// ============================================================================
// TabConfig
// ============================================================================

/// Configuration for the folder tab.
#[derive(Debug, Clone, PartialEq)]
pub struct TabConfig {
    pub color: IconColor,
}

impl TabConfig {
    pub fn new(color: IconColor) -> Self {
        Self { color }
    }
}

impl LayerConfig for TabConfig {
    fn differs_from(&self, other: &Self) -> bool {
        self.color != other.color
    }
}

impl LayerEffect for TabConfig {
    /// The tab is drawn over the body.
    fn dependencies(versions: &LayerVersions) -> DependencyVersion {
        DependencyVersion::of(&[versions.body])
    }

    fn transform(&self, ctx: &mut RenderContext) -> Result<(), RenderError> {
        draw_shape(ctx, TAB_PATH, self.color)
    }
}

// ============================================================================
// Tests
// ============================================================================
