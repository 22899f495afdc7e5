//! Campus Theme
//!
//! Theme preferences for the campus administration dashboard: light/dark
//! mode with system tracking, accent color schemes, font size, and a
//! sidebar color whose text color is derived for contrast.
//!
//! # Overview
//!
//! - **Contrast calculator**: [`contrast_text_color`] picks black or white
//!   text for any background
//! - **Color schemes**: 23 built-in light/dark accent pairs ([`ColorSchemeId`])
//! - **Preference store**: [`PreferenceStore`], a plain struct with no I/O
//! - **System mode watcher**: push-based dark-mode subscription, live only
//!   while the mode is `System`
//! - **Persistence**: per-field key-value storage that tolerates corrupt
//!   values ([`PersistenceAdapter`])
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use campus_theme::{ColorSchemeId, MemoryStore, SystemColorScheme, ThemeManager};
//! use std::sync::Arc;
//!
//! let signal = Arc::new(SystemColorScheme::new(false));
//! let manager = ThemeManager::new(Box::new(MemoryStore::new()), signal.clone());
//!
//! // Called immediately with the hydrated theme, then after every change
//! manager.on_apply(|theme| {
//!     let vars = theme.to_css_variable_map();
//!     // apply vars["sidebar-bg"], vars["sidebar-text"], theme.root_classes()
//! });
//!
//! manager.set_color_scheme(ColorSchemeId::Emerald);
//!
//! // Platform glue forwards OS changes
//! signal.set_prefers_dark(true);
//! ```
//!
//! # Sidebar override
//!
//! The sidebar follows the active scheme until the user picks a color with
//! [`SidebarSource::Explicit`]. That pick survives scheme and mode changes
//! until [`ThemeManager::reset_sidebar_to_scheme`].

pub mod color;
pub mod config;
pub mod error;
pub mod manager;
pub mod presets;
pub mod state;
pub mod storage;
pub mod theme;
pub mod views;
pub mod watcher;

// Re-export commonly used types
pub use color::{contrast_text_color, contrast_text_color_str, Color};
pub use config::ThemeConfig;
pub use error::{Result, ThemeError};
pub use manager::{ApplyCallback, ThemeManager};
pub use presets::{resolve_scheme, resolve_scheme_or_fallback, ColorSchemeId, SchemePair};
pub use state::{Changes, PartialPreferences, PreferenceStore, SidebarSource};
pub use storage::{KeyValueStore, MemoryStore, PersistenceAdapter, StorageKeys, TomlFileStore};
pub use theme::{EffectiveMode, FontSize, ThemeMode};
pub use views::{AppliedTheme, CanvasBackgroundPicker, SettingsPanel, SidebarStyle};
pub use watcher::{DarkModeListener, DarkModeSignal, SystemColorScheme, SystemModeWatcher};
