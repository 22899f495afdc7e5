//! Consumer-facing views of the applied theme
//!
//! The navigation sidebar, the settings panel and the canvas background
//! picker read derived values from an [`AppliedTheme`] and never touch the
//! store directly; changes go through [`ThemeManager`] setters.

use crate::color::{contrast_text_color, Color};
use crate::manager::ThemeManager;
use crate::presets::ColorSchemeId;
use crate::state::SidebarSource;
use crate::theme::{EffectiveMode, FontSize, ThemeMode};
use std::collections::HashMap;

/// Snapshot of the effective preferences, handed to `on_apply` callbacks.
#[derive(Clone, Debug, PartialEq)]
pub struct AppliedTheme {
    pub theme_mode: ThemeMode,
    pub effective_mode: EffectiveMode,
    pub color_scheme: ColorSchemeId,
    /// Scheme color for the effective mode.
    pub accent: Color,
    pub font_size: FontSize,
    pub sidebar_color: Color,
    pub sidebar_text_color: Color,
    pub sidebar_overridden: bool,
}

impl AppliedTheme {
    /// CSS custom properties (names without the `--` prefix).
    ///
    /// ```ignore
    /// let vars = manager.applied().to_css_variable_map();
    /// // vars["sidebar-bg"] == "#4f46e5"
    /// ```
    pub fn to_css_variable_map(&self) -> HashMap<String, String> {
        let mut vars = HashMap::with_capacity(5);
        vars.insert("sidebar-bg".into(), self.sidebar_color.to_string());
        vars.insert("sidebar-text".into(), self.sidebar_text_color.to_string());
        vars.insert("accent".into(), self.accent.to_string());
        vars.insert(
            "accent-foreground".into(),
            contrast_text_color(self.accent).to_string(),
        );
        vars.insert(
            "font-size-root".into(),
            format!("{}px", self.font_size.root_px()),
        );
        vars
    }

    /// Classes for the document root: `dark` in dark mode plus the font
    /// size class.
    pub fn root_classes(&self) -> Vec<&'static str> {
        let mut classes = Vec::with_capacity(2);
        if self.effective_mode.is_dark() {
            classes.push("dark");
        }
        classes.push(self.font_size.class_name());
        classes
    }

    pub fn sidebar(&self) -> SidebarStyle {
        SidebarStyle::from(self)
    }
}

/// Colors the navigation sidebar renders with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SidebarStyle {
    pub background: Color,
    pub text: Color,
    /// Highlight for the active navigation entry.
    pub active_item: Color,
}

impl From<&AppliedTheme> for SidebarStyle {
    fn from(theme: &AppliedTheme) -> Self {
        // A pinned sidebar can coincide with the accent; fall back to the
        // text color so the active entry stays visible.
        let active_item = if theme.sidebar_color == theme.accent {
            theme.sidebar_text_color
        } else {
            theme.accent
        };
        Self {
            background: theme.sidebar_color,
            text: theme.sidebar_text_color,
            active_item,
        }
    }
}

/// One scheme entry in the settings panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchemeSwatch {
    pub id: ColorSchemeId,
    pub name: &'static str,
    pub color: Color,
    pub selected: bool,
}

/// Option lists for the appearance section of the settings panel.
#[derive(Clone, Debug, PartialEq)]
pub struct SettingsPanel {
    pub swatches: Vec<SchemeSwatch>,
    pub theme_modes: Vec<(ThemeMode, bool)>,
    pub font_sizes: Vec<(FontSize, bool)>,
    /// Whether "reset sidebar to scheme" is offered.
    pub can_reset_sidebar: bool,
}

impl SettingsPanel {
    pub fn new(theme: &AppliedTheme) -> Self {
        let swatches = ColorSchemeId::all()
            .iter()
            .map(|&id| SchemeSwatch {
                id,
                name: id.display_name(),
                color: id.color(theme.effective_mode),
                selected: id == theme.color_scheme,
            })
            .collect();

        Self {
            swatches,
            theme_modes: ThemeMode::all()
                .iter()
                .map(|&mode| (mode, mode == theme.theme_mode))
                .collect(),
            font_sizes: FontSize::all()
                .iter()
                .map(|&size| (size, size == theme.font_size))
                .collect(),
            can_reset_sidebar: theme.sidebar_overridden,
        }
    }
}

/// Background color picker on the drawing canvas page. Picks pin the
/// sidebar color.
pub struct CanvasBackgroundPicker<'a> {
    manager: &'a ThemeManager,
}

impl<'a> CanvasBackgroundPicker<'a> {
    pub fn new(manager: &'a ThemeManager) -> Self {
        Self { manager }
    }

    /// Apply a user-entered hex string. Malformed input pins the default
    /// sidebar color.
    pub fn pick(&self, input: &str) -> Color {
        let color = Color::parse_or_default(input);
        self.manager.set_sidebar_color(color, SidebarSource::Explicit);
        color
    }

    pub fn current(&self) -> Color {
        self.manager.applied().sidebar_color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PreferenceStore;

    fn light_theme() -> AppliedTheme {
        let mut store = PreferenceStore::new(false);
        store.set_theme_mode(ThemeMode::Light);
        store.applied()
    }

    #[test]
    fn css_variables_for_default_light_theme() {
        let vars = light_theme().to_css_variable_map();
        assert_eq!(vars["sidebar-bg"], "#4f46e5");
        assert_eq!(vars["sidebar-text"], "#ffffff");
        assert_eq!(vars["accent"], "#4f46e5");
        assert_eq!(vars["font-size-root"], "16px");
    }

    #[test]
    fn root_classes_follow_mode_and_font_size() {
        let mut theme = light_theme();
        assert_eq!(theme.root_classes(), vec!["text-base"]);

        theme.effective_mode = EffectiveMode::Dark;
        theme.font_size = FontSize::Large;
        assert_eq!(theme.root_classes(), vec!["dark", "text-lg"]);
    }

    #[test]
    fn sidebar_active_item_stays_visible() {
        let theme = light_theme();
        assert_eq!(theme.sidebar().active_item, Color::WHITE);

        let pinned = AppliedTheme {
            sidebar_color: Color::from_hex(0x262626),
            sidebar_overridden: true,
            ..theme
        };
        assert_eq!(pinned.sidebar().active_item, pinned.accent);
    }

    #[test]
    fn settings_panel_marks_current_selection() {
        let panel = SettingsPanel::new(&light_theme());
        assert_eq!(panel.swatches.len(), 23);
        let selected: Vec<_> = panel.swatches.iter().filter(|s| s.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, ColorSchemeId::Default);
        assert!(panel.theme_modes.contains(&(ThemeMode::Light, true)));
        assert!(panel.font_sizes.contains(&(FontSize::Medium, true)));
        assert!(!panel.can_reset_sidebar);
    }
}
