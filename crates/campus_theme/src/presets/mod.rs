//! Built-in accent color schemes, one light/dark pair per scheme.

use crate::color::Color;
use crate::error::{Result, ThemeError};
use crate::theme::EffectiveMode;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Light and dark accent color of a scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchemePair {
    pub light: Color,
    pub dark: Color,
}

impl SchemePair {
    const fn new(light: u32, dark: u32) -> Self {
        Self {
            light: Color::from_hex(light),
            dark: Color::from_hex(dark),
        }
    }

    pub fn for_mode(self, mode: EffectiveMode) -> Color {
        match mode {
            EffectiveMode::Light => self.light,
            EffectiveMode::Dark => self.dark,
        }
    }
}

/// Built-in color scheme catalog.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSchemeId {
    /// Indigo accent shipped as the dashboard default.
    #[default]
    Default,
    Slate,
    Gray,
    Zinc,
    Neutral,
    Stone,
    Red,
    Orange,
    Amber,
    Yellow,
    Lime,
    Green,
    Emerald,
    Teal,
    Cyan,
    Sky,
    Blue,
    Indigo,
    Violet,
    Purple,
    Fuchsia,
    Pink,
    Rose,
}

impl ColorSchemeId {
    /// Stable scheme id for storage.
    pub fn id(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Slate => "slate",
            Self::Gray => "gray",
            Self::Zinc => "zinc",
            Self::Neutral => "neutral",
            Self::Stone => "stone",
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Amber => "amber",
            Self::Yellow => "yellow",
            Self::Lime => "lime",
            Self::Green => "green",
            Self::Emerald => "emerald",
            Self::Teal => "teal",
            Self::Cyan => "cyan",
            Self::Sky => "sky",
            Self::Blue => "blue",
            Self::Indigo => "indigo",
            Self::Violet => "violet",
            Self::Purple => "purple",
            Self::Fuchsia => "fuchsia",
            Self::Pink => "pink",
            Self::Rose => "rose",
        }
    }

    /// User-facing display name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Slate => "Slate",
            Self::Gray => "Gray",
            Self::Zinc => "Zinc",
            Self::Neutral => "Neutral",
            Self::Stone => "Stone",
            Self::Red => "Red",
            Self::Orange => "Orange",
            Self::Amber => "Amber",
            Self::Yellow => "Yellow",
            Self::Lime => "Lime",
            Self::Green => "Green",
            Self::Emerald => "Emerald",
            Self::Teal => "Teal",
            Self::Cyan => "Cyan",
            Self::Sky => "Sky",
            Self::Blue => "Blue",
            Self::Indigo => "Indigo",
            Self::Violet => "Violet",
            Self::Purple => "Purple",
            Self::Fuchsia => "Fuchsia",
            Self::Pink => "Pink",
            Self::Rose => "Rose",
        }
    }

    /// Full scheme list in settings-panel order.
    pub fn all() -> &'static [ColorSchemeId] {
        const SCHEMES: [ColorSchemeId; 23] = [
            ColorSchemeId::Default,
            ColorSchemeId::Slate,
            ColorSchemeId::Gray,
            ColorSchemeId::Zinc,
            ColorSchemeId::Neutral,
            ColorSchemeId::Stone,
            ColorSchemeId::Red,
            ColorSchemeId::Orange,
            ColorSchemeId::Amber,
            ColorSchemeId::Yellow,
            ColorSchemeId::Lime,
            ColorSchemeId::Green,
            ColorSchemeId::Emerald,
            ColorSchemeId::Teal,
            ColorSchemeId::Cyan,
            ColorSchemeId::Sky,
            ColorSchemeId::Blue,
            ColorSchemeId::Indigo,
            ColorSchemeId::Violet,
            ColorSchemeId::Purple,
            ColorSchemeId::Fuchsia,
            ColorSchemeId::Pink,
            ColorSchemeId::Rose,
        ];
        &SCHEMES
    }

    /// Light/dark accent pair for this scheme.
    pub fn pair(self) -> SchemePair {
        match self {
            Self::Default => SchemePair::new(0x4F46E5, 0x6366F1),
            Self::Slate => SchemePair::new(0x475569, 0x64748B),
            Self::Gray => SchemePair::new(0x4B5563, 0x6B7280),
            Self::Zinc => SchemePair::new(0x52525B, 0x71717A),
            Self::Neutral => SchemePair::new(0x525252, 0x737373),
            Self::Stone => SchemePair::new(0x57534E, 0x78716C),
            Self::Red => SchemePair::new(0xDC2626, 0xEF4444),
            Self::Orange => SchemePair::new(0xEA580C, 0xF97316),
            Self::Amber => SchemePair::new(0xD97706, 0xF59E0B),
            Self::Yellow => SchemePair::new(0xCA8A04, 0xEAB308),
            Self::Lime => SchemePair::new(0x65A30D, 0x84CC16),
            Self::Green => SchemePair::new(0x16A34A, 0x22C55E),
            Self::Emerald => SchemePair::new(0x059669, 0x10B981),
            Self::Teal => SchemePair::new(0x0D9488, 0x14B8A6),
            Self::Cyan => SchemePair::new(0x0891B2, 0x06B6D4),
            Self::Sky => SchemePair::new(0x0284C7, 0x0EA5E9),
            Self::Blue => SchemePair::new(0x2563EB, 0x3B82F6),
            Self::Indigo => SchemePair::new(0x4338CA, 0x818CF8),
            Self::Violet => SchemePair::new(0x7C3AED, 0x8B5CF6),
            Self::Purple => SchemePair::new(0x9333EA, 0xA855F7),
            Self::Fuchsia => SchemePair::new(0xC026D3, 0xD946EF),
            Self::Pink => SchemePair::new(0xDB2777, 0xEC4899),
            Self::Rose => SchemePair::new(0xE11D48, 0xF43F5E),
        }
    }

    /// Accent color for the given effective mode.
    pub fn color(self, mode: EffectiveMode) -> Color {
        self.pair().for_mode(mode)
    }
}

impl Display for ColorSchemeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ColorSchemeId {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self> {
        let id = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|scheme| scheme.id() == id)
            .ok_or_else(|| ThemeError::SchemeNotFound(s.to_string()))
    }
}

/// Look up the accent color of scheme `id` for `mode`.
pub fn resolve_scheme(id: &str, mode: EffectiveMode) -> Result<Color> {
    Ok(id.parse::<ColorSchemeId>()?.color(mode))
}

/// [`resolve_scheme`], substituting the default scheme's color for unknown ids.
pub fn resolve_scheme_or_fallback(id: &str, mode: EffectiveMode) -> Color {
    resolve_scheme(id, mode).unwrap_or_else(|err| {
        tracing::warn!("{err}; falling back to the default scheme");
        ColorSchemeId::Default.color(mode)
    })
}
