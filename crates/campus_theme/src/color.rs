//! Hex colors and the sidebar contrast calculator

use crate::error::{Result, ThemeError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque 24-bit RGB color, written as `#rrggbb`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);

    /// Sidebar color used when nothing valid is stored or entered.
    pub const DEFAULT_SIDEBAR: Color = Color::from_hex(0x262626);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn from_hex(hex: u32) -> Self {
        Self::rgb(
            ((hex >> 16) & 0xFF) as u8,
            ((hex >> 8) & 0xFF) as u8,
            (hex & 0xFF) as u8,
        )
    }

    pub const fn to_hex(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Parse a `#rrggbb` string. Surrounding whitespace and either hex case
    /// are accepted; anything else is [`ThemeError::MalformedColor`].
    pub fn parse(input: &str) -> Result<Self> {
        let malformed = || ThemeError::MalformedColor(input.to_string());

        let digits = input.trim().strip_prefix('#').ok_or_else(malformed)?;
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(malformed());
        }

        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| malformed());
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Parse, failing closed to [`Color::DEFAULT_SIDEBAR`].
    pub fn parse_or_default(input: &str) -> Self {
        Self::parse(input).unwrap_or_else(|err| {
            tracing::warn!("{err}; using default sidebar color");
            Self::DEFAULT_SIDEBAR
        })
    }

    /// Perceptual brightness `0.299·R + 0.587·G + 0.114·B`, in `0.0..=255.0`.
    pub fn brightness(self) -> f32 {
        self.brightness_millis() as f32 / 1000.0
    }

    /// Brightness scaled by 1000 so threshold checks stay exact.
    fn brightness_millis(self) -> u32 {
        299 * self.r as u32 + 587 * self.g as u32 + 114 * self.b as u32
    }

    /// True when white text reads better on this color than black.
    pub fn is_dark(self) -> bool {
        self.brightness_millis() < 128_000
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ThemeError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::DEFAULT_SIDEBAR
    }
}

/// Readable text color for a background: white below brightness 128,
/// black at or above it.
pub fn contrast_text_color(bg: Color) -> Color {
    if bg.is_dark() {
        Color::WHITE
    } else {
        Color::BLACK
    }
}

/// [`contrast_text_color`] for an unvalidated string. Malformed input is
/// treated as the default sidebar color.
pub fn contrast_text_color_str(bg: &str) -> Color {
    contrast_text_color(Color::parse_or_default(bg))
}
