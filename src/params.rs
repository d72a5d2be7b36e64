//! The user's icon design: colors, overlay choice and overlay transform.

use std::fmt;
use std::sync::Arc;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::color::{IconColor, Preset};

/// Allowed range for [`VisualParameters::overlay_opacity`].
pub const OPACITY_RANGE: (f32, f32) = (0.0, 1.0);
/// Allowed range for [`VisualParameters::overlay_scale`].
pub const SCALE_RANGE: (f32, f32) = (0.2, 5.0);
/// Allowed range for each overlay offset, in canvas units.
pub const OFFSET_RANGE: (f32, f32) = (-200.0, 200.0);
/// Allowed range for the symbol weight slider.
pub const WEIGHT_RANGE: (f32, f32) = (1.0, 9.0);

/// Clamps `value` into `range`, mapping NaN to `fallback`.
pub(crate) fn clamp_or(value: f32, range: (f32, f32), fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(range.0, range.1)
    }
}

// ============================================================================
// OverlayType
// ============================================================================

/// What, if anything, is drawn over the folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum OverlayType {
    #[default]
    None,
    Image,
    Symbol,
}

// ============================================================================
// SymbolWeight
// ============================================================================

/// The nine stroke-weight presets a symbol can be drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum SymbolWeight {
    UltraLight,
    Thin,
    Light,
    #[default]
    Regular,
    Medium,
    Semibold,
    Bold,
    Heavy,
    Black,
}

impl SymbolWeight {
    pub const ALL: [SymbolWeight; 9] = [
        Self::UltraLight,
        Self::Thin,
        Self::Light,
        Self::Regular,
        Self::Medium,
        Self::Semibold,
        Self::Bold,
        Self::Heavy,
        Self::Black,
    ];

    /// Resolves a slider value to a preset.
    ///
    /// The value is rounded to the nearest integer and clamped to 1-9, so
    /// `4.0` and `4.4` are both regular. Non-finite input resolves to regular.
    pub fn from_slider(value: f32) -> Self {
        if !value.is_finite() {
            return Self::Regular;
        }
        let level = value.round().clamp(WEIGHT_RANGE.0, WEIGHT_RANGE.1) as usize;
        Self::ALL[level - 1]
    }

    /// The 1-based level of this preset.
    pub fn level(self) -> u8 {
        self as u8 + 1
    }

    /// Stroke width on the 100-unit symbol grid.
    pub fn stroke_width(self) -> f32 {
        match self {
            Self::UltraLight => 2.0,
            Self::Thin => 3.5,
            Self::Light => 5.0,
            Self::Regular => 6.5,
            Self::Medium => 8.0,
            Self::Semibold => 9.5,
            Self::Bold => 11.0,
            Self::Heavy => 13.0,
            Self::Black => 15.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::UltraLight => "ultraLight",
            Self::Thin => "thin",
            Self::Light => "light",
            Self::Regular => "regular",
            Self::Medium => "medium",
            Self::Semibold => "semibold",
            Self::Bold => "bold",
            Self::Heavy => "heavy",
            Self::Black => "black",
        }
    }
}

impl fmt::Display for SymbolWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// VisualParameters
// ============================================================================

/// The complete, mutable description of a folder icon design.
///
/// Fields are public so that renderers can read them directly; input
/// controls should go through the setters, which clamp every bounded value
/// into its allowed range. The compositor clamps again on its own, so a
/// hand-built value with out-of-range fields still renders.
///
/// Only one overlay is semantically active at a time, selected by
/// [`overlay_type`](Self::overlay_type): `selected_image` is ignored unless
/// it is [`OverlayType::Image`], and `symbol_name` is ignored unless it is
/// [`OverlayType::Symbol`].
#[derive(Debug, Clone, PartialEq)]
pub struct VisualParameters {
    pub base_color: IconColor,
    pub tab_color: IconColor,
    pub overlay_color: IconColor,
    pub overlay_type: OverlayType,
    pub selected_image: Option<Arc<RgbaImage>>,
    pub symbol_name: String,
    pub overlay_opacity: f32,
    pub overlay_scale: f32,
    pub overlay_offset_x: f32,
    pub overlay_offset_y: f32,
    pub symbol_weight: f32,
    pub use_advanced_rendering: bool,
}

impl Default for VisualParameters {
    fn default() -> Self {
        Self {
            base_color: IconColor::SYSTEM_BLUE,
            tab_color: IconColor::SYSTEM_BLUE,
            overlay_color: IconColor::SYSTEM_BLUE,
            overlay_type: OverlayType::None,
            selected_image: None,
            symbol_name: "folder".to_string(),
            overlay_opacity: 0.5,
            overlay_scale: 1.0,
            overlay_offset_x: 0.0,
            overlay_offset_y: 0.0,
            symbol_weight: 4.0,
            use_advanced_rendering: false,
        }
    }
}

impl VisualParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the base and tab colors with a preset's pair.
    pub fn apply_preset(&mut self, preset: &Preset) {
        self.base_color = preset.base;
        self.tab_color = preset.tab;
    }

    pub fn set_overlay_opacity(&mut self, opacity: f32) {
        self.overlay_opacity = clamp_or(opacity, OPACITY_RANGE, 0.5);
    }

    pub fn set_overlay_scale(&mut self, scale: f32) {
        self.overlay_scale = clamp_or(scale, SCALE_RANGE, 1.0);
    }

    pub fn set_overlay_offset(&mut self, x: f32, y: f32) {
        self.overlay_offset_x = clamp_or(x, OFFSET_RANGE, 0.0);
        self.overlay_offset_y = clamp_or(y, OFFSET_RANGE, 0.0);
    }

    pub fn set_symbol_weight(&mut self, weight: f32) {
        self.symbol_weight = clamp_or(weight, WEIGHT_RANGE, 4.0);
    }

    /// Selects an image overlay.
    pub fn set_image(&mut self, image: RgbaImage) {
        self.selected_image = Some(Arc::new(image));
        self.overlay_type = OverlayType::Image;
    }

    /// Selects a symbol overlay by name.
    pub fn set_symbol(&mut self, name: impl Into<String>) {
        self.symbol_name = name.into();
        self.overlay_type = OverlayType::Symbol;
    }

    /// The weight preset the symbol slider currently resolves to.
    pub fn weight_preset(&self) -> SymbolWeight {
        SymbolWeight::from_slider(self.symbol_weight)
    }

    /// Returns a copy with every bounded field forced into its range.
    pub fn clamped(&self) -> Self {
        let mut out = self.clone();
        out.set_overlay_opacity(self.overlay_opacity);
        out.set_overlay_scale(self.overlay_scale);
        out.set_overlay_offset(self.overlay_offset_x, self.overlay_offset_y);
        out.set_symbol_weight(self.symbol_weight);
        out
    }
}

// ============================================================================
// Tests
// ============================================================================
