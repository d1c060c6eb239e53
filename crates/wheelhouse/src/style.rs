use palette::{Srgb, Srgba, WithAlpha};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_OUTLINE_COLOR: HexColor = HexColor::rgb(0x63, 0x66, 0xf1);
pub const DEFAULT_WHEEL_BACKGROUND: HexColor = HexColor::rgb(0xff, 0xff, 0xff);
pub const DEFAULT_LABEL_TEXT: HexColor = HexColor::rgb(0xff, 0xff, 0xff);
pub const DEFAULT_LABEL_BACKGROUND: HexColor = HexColor::rgb(0x63, 0x63, 0x63);

/// Fill behind each item image while outlines are on.
pub const WRAPPER_BACKGROUND: HexColor = HexColor::rgb(0xe2, 0xe8, 0xf0);
pub const SHADOW_ALPHA: f64 = 0.1;

#[derive(Debug, Error, PartialEq)]
#[error("Invalid color '{0}', expected #rrggbb or #rgb")]
pub struct ColorParseError(String);

/// An opaque sRGB color written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct HexColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl HexColor {
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    pub fn to_srgba(self) -> Srgba<f64> {
        Srgb::new(self.red, self.green, self.blue)
            .into_format::<f64>()
            .with_alpha(1.0)
    }

    pub fn components(self) -> (f64, f64, f64, f64) {
        self.to_srgba().into_components()
    }
}

impl FromStr for HexColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if !trimmed.starts_with('#') {
            return Err(ColorParseError(s.to_string()));
        }
        Srgb::<u8>::from_str(trimmed)
            .map(|c| Self::rgb(c.red, c.green, c.blue))
            .map_err(|_| ColorParseError(s.to_string()))
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

/// Visual options shared by the preview and the export. Renderers take it by
/// reference, so each render sees one consistent snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleConfig {
    pub outline_enabled: bool,
    pub outline_color: HexColor,
    pub wheel_background: HexColor,
    pub label_text: HexColor,
    pub label_background: HexColor,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            outline_enabled: true,
            outline_color: DEFAULT_OUTLINE_COLOR,
            wheel_background: DEFAULT_WHEEL_BACKGROUND,
            label_text: DEFAULT_LABEL_TEXT,
            label_background: DEFAULT_LABEL_BACKGROUND,
        }
    }
}
