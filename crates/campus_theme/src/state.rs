//! Preference store
//!
//! `PreferenceStore` is the single in-memory record of the user's theme
//! preferences. It owns four independent knobs (theme mode, color scheme,
//! font size, sidebar color) and derives the effective light/dark mode and
//! the sidebar text color from them.
//!
//! The store performs no I/O. Every setter returns the [`Changes`] it made,
//! including derived fields, so callers can persist exactly what changed
//! and skip notifications for no-ops.
//!
//! # Sidebar override
//!
//! While the sidebar is not overridden, its color always tracks the active
//! scheme for the effective mode. An explicit [`SidebarSource::Explicit`]
//! update pins it until [`PreferenceStore::reset_sidebar_to_scheme`].

use crate::color::{contrast_text_color, Color};
use crate::presets::ColorSchemeId;
use crate::theme::{EffectiveMode, FontSize, ThemeMode};
use crate::views::AppliedTheme;
use bitflags::bitflags;

bitflags! {
    /// Fields touched by a store operation.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Changes: u8 {
        const THEME_MODE = 1 << 0;
        const EFFECTIVE_MODE = 1 << 1;
        const COLOR_SCHEME = 1 << 2;
        const FONT_SIZE = 1 << 3;
        const SIDEBAR_COLOR = 1 << 4;
        const SIDEBAR_TEXT_COLOR = 1 << 5;
        const SIDEBAR_OVERRIDE = 1 << 6;
    }
}

impl Changes {
    /// Whether consumers need to re-render.
    pub fn needs_repaint(self) -> bool {
        !self.is_empty()
    }
}

/// Where a sidebar color update comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SidebarSource {
    /// A user pick; survives later scheme and mode changes.
    Explicit,
    /// A programmatic update; the next scheme or mode change replaces it.
    Derived,
}

/// A subset of preference fields, as read from or written to storage.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PartialPreferences {
    pub theme_mode: Option<ThemeMode>,
    pub color_scheme: Option<ColorSchemeId>,
    pub font_size: Option<FontSize>,
    pub sidebar_color: Option<Color>,
    pub sidebar_overridden: Option<bool>,
    /// Cached copy of the derived text color. Never read back as truth.
    pub sidebar_text_color: Option<Color>,
}

impl PartialPreferences {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// In-memory preference record with derived sidebar colors.
#[derive(Clone, Debug, PartialEq)]
pub struct PreferenceStore {
    theme_mode: ThemeMode,
    color_scheme: ColorSchemeId,
    font_size: FontSize,
    sidebar_color: Color,
    sidebar_text_color: Color,
    sidebar_overridden: bool,
    system_prefers_dark: bool,
}

impl Default for PreferenceStore {
    fn default() -> Self {
        Self::new(false)
    }
}

impl PreferenceStore {
    /// Default preferences, given the current OS dark-mode preference.
    pub fn new(system_prefers_dark: bool) -> Self {
        let theme_mode = ThemeMode::default();
        let color_scheme = ColorSchemeId::default();
        let sidebar_color = color_scheme.color(theme_mode.resolve(system_prefers_dark));

        Self {
            theme_mode,
            color_scheme,
            font_size: FontSize::default(),
            sidebar_color,
            sidebar_text_color: contrast_text_color(sidebar_color),
            sidebar_overridden: false,
            system_prefers_dark,
        }
    }

    /// Build a store from previously stored preferences.
    pub fn with_preferences(prefs: &PartialPreferences, system_prefers_dark: bool) -> Self {
        let mut store = Self::new(system_prefers_dark);
        store.hydrate(prefs);
        store
    }

    // ========== Reads ==========

    pub fn theme_mode(&self) -> ThemeMode {
        self.theme_mode
    }

    /// Applied light/dark mode; `System` resolves via the OS preference.
    pub fn effective_mode(&self) -> EffectiveMode {
        self.theme_mode.resolve(self.system_prefers_dark)
    }

    pub fn color_scheme(&self) -> ColorSchemeId {
        self.color_scheme
    }

    pub fn font_size(&self) -> FontSize {
        self.font_size
    }

    pub fn sidebar_color(&self) -> Color {
        self.sidebar_color
    }

    pub fn sidebar_text_color(&self) -> Color {
        self.sidebar_text_color
    }

    pub fn is_sidebar_overridden(&self) -> bool {
        self.sidebar_overridden
    }

    pub fn system_prefers_dark(&self) -> bool {
        self.system_prefers_dark
    }

    /// Accent color of the active scheme in the effective mode.
    pub fn scheme_color(&self) -> Color {
        self.color_scheme.color(self.effective_mode())
    }

    // ========== Setters ==========

    pub fn set_theme_mode(&mut self, mode: ThemeMode) -> Changes {
        if self.theme_mode == mode {
            return Changes::empty();
        }
        tracing::debug!(
            "PreferenceStore::set_theme_mode - {} -> {}",
            self.theme_mode,
            mode
        );

        let before = self.effective_mode();
        self.theme_mode = mode;
        Changes::THEME_MODE | self.after_mode_change(before)
    }

    /// Record the OS dark-mode preference. Only affects the effective mode
    /// while the theme mode is `System`.
    pub fn set_system_prefers_dark(&mut self, dark: bool) -> Changes {
        if self.system_prefers_dark == dark {
            return Changes::empty();
        }

        let before = self.effective_mode();
        self.system_prefers_dark = dark;
        self.after_mode_change(before)
    }

    pub fn set_color_scheme(&mut self, id: ColorSchemeId) -> Changes {
        if self.color_scheme == id {
            return Changes::empty();
        }
        tracing::debug!(
            "PreferenceStore::set_color_scheme - {} -> {} (sidebar overridden: {})",
            self.color_scheme,
            id,
            self.sidebar_overridden
        );

        self.color_scheme = id;
        Changes::COLOR_SCHEME | self.rederive_sidebar()
    }

    pub fn set_font_size(&mut self, size: FontSize) -> Changes {
        if self.font_size == size {
            return Changes::empty();
        }
        self.font_size = size;
        Changes::FONT_SIZE
    }

    pub fn set_sidebar_color(&mut self, color: Color, source: SidebarSource) -> Changes {
        let mut changes = self.write_sidebar(color);
        if source == SidebarSource::Explicit && !self.sidebar_overridden {
            tracing::debug!("PreferenceStore: sidebar color pinned to {color}");
            self.sidebar_overridden = true;
            changes |= Changes::SIDEBAR_OVERRIDE;
        }
        changes
    }

    /// Drop an explicit sidebar color and follow the scheme again.
    pub fn reset_sidebar_to_scheme(&mut self) -> Changes {
        let mut changes = Changes::empty();
        if self.sidebar_overridden {
            self.sidebar_overridden = false;
            changes |= Changes::SIDEBAR_OVERRIDE;
        }
        changes | self.rederive_sidebar()
    }

    /// Replace fields present in `prefs`. Missing fields keep their values.
    pub fn hydrate(&mut self, prefs: &PartialPreferences) -> Changes {
        let before = self.effective_mode();
        let mut changes = Changes::empty();

        if let Some(mode) = prefs.theme_mode {
            if mode != self.theme_mode {
                self.theme_mode = mode;
                changes |= Changes::THEME_MODE;
            }
        }
        if let Some(id) = prefs.color_scheme {
            if id != self.color_scheme {
                self.color_scheme = id;
                changes |= Changes::COLOR_SCHEME;
            }
        }
        if let Some(size) = prefs.font_size {
            changes |= self.set_font_size(size);
        }
        if self.effective_mode() != before {
            changes |= Changes::EFFECTIVE_MODE;
        }
        if let Some(overridden) = prefs.sidebar_overridden {
            if overridden != self.sidebar_overridden {
                self.sidebar_overridden = overridden;
                changes |= Changes::SIDEBAR_OVERRIDE;
            }
        }

        if self.sidebar_overridden {
            let color = prefs.sidebar_color.unwrap_or(self.sidebar_color);
            changes |= self.write_sidebar(color);
        } else {
            changes |= self.rederive_sidebar();
        }
        changes
    }

    // ========== Snapshots ==========

    /// Everything a consumer needs to render.
    pub fn applied(&self) -> AppliedTheme {
        AppliedTheme {
            theme_mode: self.theme_mode,
            effective_mode: self.effective_mode(),
            color_scheme: self.color_scheme,
            accent: self.scheme_color(),
            font_size: self.font_size,
            sidebar_color: self.sidebar_color,
            sidebar_text_color: self.sidebar_text_color,
            sidebar_overridden: self.sidebar_overridden,
        }
    }

    /// The persistable fields named by `changes`. Sidebar color changes
    /// carry the text color and override flag with them.
    pub fn to_partial(&self, changes: Changes) -> PartialPreferences {
        let sidebar = changes
            .intersects(Changes::SIDEBAR_COLOR | Changes::SIDEBAR_TEXT_COLOR | Changes::SIDEBAR_OVERRIDE);

        PartialPreferences {
            theme_mode: changes
                .contains(Changes::THEME_MODE)
                .then_some(self.theme_mode),
            color_scheme: changes
                .contains(Changes::COLOR_SCHEME)
                .then_some(self.color_scheme),
            font_size: changes.contains(Changes::FONT_SIZE).then_some(self.font_size),
            sidebar_color: sidebar.then_some(self.sidebar_color),
            sidebar_overridden: sidebar.then_some(self.sidebar_overridden),
            sidebar_text_color: sidebar.then_some(self.sidebar_text_color),
        }
    }

    /// Every persistable field.
    pub fn to_preferences(&self) -> PartialPreferences {
        self.to_partial(Changes::all())
    }

    // ========== Derivation ==========

    fn after_mode_change(&mut self, before: EffectiveMode) -> Changes {
        if self.effective_mode() == before {
            return Changes::empty();
        }
        Changes::EFFECTIVE_MODE | self.rederive_sidebar()
    }

    fn rederive_sidebar(&mut self) -> Changes {
        if self.sidebar_overridden {
            return Changes::empty();
        }
        self.write_sidebar(self.scheme_color())
    }

    fn write_sidebar(&mut self, color: Color) -> Changes {
        let mut changes = Changes::empty();
        if self.sidebar_color != color {
            self.sidebar_color = color;
            changes |= Changes::SIDEBAR_COLOR;
        }
        let text = contrast_text_color(color);
        if self.sidebar_text_color != text {
            self.sidebar_text_color = text;
            changes |= Changes::SIDEBAR_TEXT_COLOR;
        }
        changes
    }
}
