//! Colors and the built-in preset palette.
//!
//! [`IconColor`] is an 8-bit RGBA color that serializes as a hex string
//! (`#RRGGBB` or `#RRGGBBAA`), so design profiles stay readable:
//!
//! ```
//! use folco_composer::IconColor;
//!
//! let blue: IconColor = "#007AFF".parse().unwrap();
//! assert_eq!(blue.to_hex(), "#007AFF");
//! ```

use std::fmt;
use std::str::FromStr;

use palette::{Hsl, IntoColor, Srgb};
use serde::{Deserialize, Serialize};

// ============================================================================
// IconColor
// ============================================================================

/// An RGBA color with 8 bits per channel (straight, not premultiplied, alpha).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IconColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl IconColor {
    /// The system blue used for every color slot of a fresh design.
    pub const SYSTEM_BLUE: Self = Self::rgb(0x00, 0x7A, 0xFF);

    pub const BLACK: Self = Self::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Returns the color as an `[r, g, b, a]` array, matching `image::Rgba`.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Formats the color as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// Formats only the RGB channels as lowercase `#rrggbb`, for SVG attributes.
    pub(crate) fn svg_rgb(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Alpha as a fraction in 0.0-1.0, for SVG opacity attributes.
    pub(crate) fn opacity(self) -> f32 {
        self.a as f32 / 255.0
    }

    /// Darkens the color by reducing its HSL lightness. Alpha is preserved.
    pub fn darkened(self, amount: f32) -> Self {
        let rgb = Srgb::new(
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        );
        let mut hsl: Hsl = rgb.into_color();
        hsl.lightness = (hsl.lightness - amount).max(0.0);
        let darkened: Srgb = hsl.into_color();
        Self {
            r: (darkened.red * 255.0).round().clamp(0.0, 255.0) as u8,
            g: (darkened.green * 255.0).round().clamp(0.0, 255.0) as u8,
            b: (darkened.blue * 255.0).round().clamp(0.0, 255.0) as u8,
            a: self.a,
        }
    }
}

impl Default for IconColor {
    fn default() -> Self {
        Self::SYSTEM_BLUE
    }
}

impl fmt::Display for IconColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Returned when a string is not a `#RRGGBB` or `#RRGGBBAA` hex color.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color {0:?}: expected #RRGGBB or #RRGGBBAA")]
pub struct ParseColorError(pub String);

impl FromStr for IconColor {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseColorError(s.to_string());
        let hex = s.trim();
        let digits = hex.strip_prefix('#').unwrap_or(hex);

        let (rgb_digits, alpha) = match digits.len() {
            6 => (digits, 255),
            8 if digits.is_ascii() => {
                let alpha = u8::from_str_radix(&digits[6..], 16).map_err(|_| invalid())?;
                (&digits[..6], alpha)
            }
            _ => return Err(invalid()),
        };

        let rgb: Srgb<u8> = rgb_digits.parse().map_err(|_| invalid())?;
        Ok(Self::rgba(rgb.red, rgb.green, rgb.blue, alpha))
    }
}

impl TryFrom<String> for IconColor {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IconColor> for String {
    fn from(color: IconColor) -> Self {
        color.to_hex()
    }
}

#[cfg(feature = "jsonschema")]
impl schemars::JsonSchema for IconColor {
    fn schema_name() -> String {
        "IconColor".to_string()
    }

    fn json_schema(generator: &mut schemars::r#gen::SchemaGenerator) -> schemars::schema::Schema {
        String::json_schema(generator)
    }
}

// ============================================================================
// Presets
// ============================================================================

/// A named, immutable pair of folder colors.
///
/// Applying a preset overwrites only the base and tab colors of a design.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub base: IconColor,
    pub tab: IconColor,
}

/// The built-in preset list, in display order.
pub const PRESETS: &[Preset] = &[
    Preset { name: "classic", base: IconColor::rgb(0x00, 0x7A, 0xFF), tab: IconColor::rgb(0x4D, 0xA3, 0xFF) },
    Preset { name: "ocean", base: IconColor::rgb(0x1E, 0x8C, 0xCB), tab: IconColor::rgb(0x78, 0xD6, 0xFF) },
    Preset { name: "graphite", base: IconColor::rgb(0x4C, 0x5A, 0x66), tab: IconColor::rgb(0x7D, 0x8A, 0x96) },
    Preset { name: "forest", base: IconColor::rgb(0x2E, 0x7D, 0x32), tab: IconColor::rgb(0x66, 0xBB, 0x6A) },
    Preset { name: "sunset", base: IconColor::rgb(0xF4, 0x51, 0x1E), tab: IconColor::rgb(0xFF, 0xB7, 0x4D) },
    Preset { name: "berry", base: IconColor::rgb(0x8E, 0x24, 0xAA), tab: IconColor::rgb(0xCE, 0x93, 0xD8) },
    Preset { name: "rose", base: IconColor::rgb(0xD8, 0x1B, 0x60), tab: IconColor::rgb(0xF4, 0x8F, 0xB1) },
    Preset { name: "midnight", base: IconColor::rgb(0x1A, 0x23, 0x7E), tab: IconColor::rgb(0x39, 0x49, 0xAB) },
    Preset { name: "sand", base: IconColor::rgb(0xC8, 0xA1, 0x65), tab: IconColor::rgb(0xE8, 0xCF, 0xA0) },
    Preset { name: "mint", base: IconColor::rgb(0x00, 0xA6, 0x8C), tab: IconColor::rgb(0x7D, 0xE3, 0xCF) },
];

impl Preset {
    /// Looks up a built-in preset by name (case-insensitive).
    pub fn find(name: &str) -> Option<&'static Preset> {
        PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

// ============================================================================
// Tests
// ============================================================================
