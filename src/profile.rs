//! Serializable design profiles.
//!
//! A [`DesignProfile`] captures a whole [`VisualParameters`] design in a
//! JSON-friendly form, so a design can be saved next to the images it uses
//! and loaded again from the command line. Image overlays are referenced by
//! path; relative paths resolve against the profile's own directory.
//!
//! # Example
//!
//! ```
//! use folco_composer::{DesignProfile, OverlayType};
//!
//! let json = r##"{ "preset": "ocean", "overlayType": "symbol", "symbolName": "star" }"##;
//! let profile = DesignProfile::from_json(json).unwrap();
//! let params = profile.into_parameters(None).unwrap();
//!
//! assert_eq!(params.overlay_type, OverlayType::Symbol);
//! assert_eq!(params.base_color.to_hex(), "#1E8CCB");
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::color::{IconColor, Preset};
use crate::error::ProfileError;
use crate::params::{OverlayType, VisualParameters};

// ============================================================================
// DesignProfile
// ============================================================================

/// A saved icon design.
///
/// Every field is optional in JSON; missing fields take the launch defaults.
///
/// # JSON Format
///
/// ```json
/// {
///   "preset": "ocean",
///   "baseColor": "#007AFF",
///   "tabColor": "#007AFF",
///   "overlayColor": "#FFFFFF",
///   "overlayType": "image",
///   "imagePath": "logo.png",
///   "symbolName": "folder",
///   "overlayOpacity": 0.5,
///   "overlayScale": 1.0,
///   "overlayOffsetX": 0.0,
///   "overlayOffsetY": 0.0,
///   "symbolWeight": 4.0,
///   "advancedRendering": false
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct DesignProfile {
    /// Built-in preset whose colors replace `baseColor` and `tabColor`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,

    pub base_color: IconColor,
    pub tab_color: IconColor,
    pub overlay_color: IconColor,
    pub overlay_type: OverlayType,

    /// Bitmap for the image overlay.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,

    pub symbol_name: String,
    pub overlay_opacity: f32,
    pub overlay_scale: f32,
    pub overlay_offset_x: f32,
    pub overlay_offset_y: f32,
    pub symbol_weight: f32,
    pub advanced_rendering: bool,
}

impl Default for DesignProfile {
    fn default() -> Self {
        Self::from_parameters(&VisualParameters::default(), None)
    }
}

impl DesignProfile {
    /// Captures `params`. The in-memory image cannot be serialized, so the
    /// caller supplies the path it was loaded from, if any.
    pub fn from_parameters(params: &VisualParameters, image_path: Option<PathBuf>) -> Self {
        Self {
            preset: None,
            base_color: params.base_color,
            tab_color: params.tab_color,
            overlay_color: params.overlay_color,
            overlay_type: params.overlay_type,
            image_path,
            symbol_name: params.symbol_name.clone(),
            overlay_opacity: params.overlay_opacity,
            overlay_scale: params.overlay_scale,
            overlay_offset_x: params.overlay_offset_x,
            overlay_offset_y: params.overlay_offset_y,
            symbol_weight: params.symbol_weight,
            advanced_rendering: params.use_advanced_rendering,
        }
    }

    /// Builds the design this profile describes.
    ///
    /// Bounded values are clamped. The image is only loaded when the image
    /// overlay is selected; a relative `image_path` is resolved against
    /// `base_dir` when one is given.
    pub fn into_parameters(self, base_dir: Option<&Path>) -> Result<VisualParameters, ProfileError> {
        let mut params = VisualParameters {
            base_color: self.base_color,
            tab_color: self.tab_color,
            overlay_color: self.overlay_color,
            overlay_type: self.overlay_type,
            symbol_name: self.symbol_name,
            use_advanced_rendering: self.advanced_rendering,
            ..VisualParameters::default()
        };
        params.set_overlay_opacity(self.overlay_opacity);
        params.set_overlay_scale(self.overlay_scale);
        params.set_overlay_offset(self.overlay_offset_x, self.overlay_offset_y);
        params.set_symbol_weight(self.symbol_weight);

        if let Some(name) = &self.preset {
            let preset = Preset::find(name).ok_or_else(|| ProfileError::UnknownPreset(name.clone()))?;
            params.apply_preset(preset);
        }

        if self.overlay_type == OverlayType::Image {
            if let Some(path) = &self.image_path {
                let path = match base_dir {
                    Some(dir) if path.is_relative() => dir.join(path),
                    _ => path.clone(),
                };
                params.selected_image = Some(Arc::new(load_image(&path)?));
            }
        }

        Ok(params)
    }

    /// Reads a profile from `path` and builds its design, resolving the
    /// image relative to the profile's directory.
    pub fn load(path: &Path) -> Result<VisualParameters, ProfileError> {
        let json = fs::read_to_string(path).map_err(|source| ProfileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)?.into_parameters(path.parent())
    }

    /// Serializes the profile to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the profile to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes a profile from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Decodes any raster format the `image` crate supports into RGBA.
pub fn load_image(path: &Path) -> Result<image::RgbaImage, ProfileError> {
    let decoded = image::open(path).map_err(|e| ProfileError::Image {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    log::debug!(
        "loaded overlay image {} ({}x{})",
        path.display(),
        decoded.width(),
        decoded.height()
    );
    Ok(decoded.to_rgba8())
}

// ============================================================================
// Tests
// ============================================================================
