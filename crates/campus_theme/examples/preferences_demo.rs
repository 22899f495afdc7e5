//! Preferences Demo
//!
//! Loads the preferences file, prints the applied theme, then walks through
//! a scheme change, an OS dark-mode flip and a sidebar override.
//!
//! Run with:
//! `cargo run -p campus_theme --example preferences_demo [config.toml]`

use campus_theme::{
    AppliedTheme, CanvasBackgroundPicker, ColorSchemeId, Result, SystemColorScheme, ThemeConfig,
    ThemeManager,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => ThemeConfig::load_from_path(&PathBuf::from(path))?,
        None => ThemeConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    tracing::info!("Preferences file: {}", config.storage_path().display());

    let signal = Arc::new(SystemColorScheme::new(false));
    let manager = ThemeManager::from_config(&config, signal.clone());
    manager.on_apply(print_theme);

    manager.set_color_scheme(ColorSchemeId::Emerald);
    signal.set_prefers_dark(true);

    let picker = CanvasBackgroundPicker::new(&manager);
    picker.pick("#fde68a");
    manager.set_color_scheme(ColorSchemeId::Rose);
    manager.reset_sidebar_to_scheme();

    Ok(())
}

fn print_theme(theme: &AppliedTheme) {
    let mut vars: Vec<_> = theme.to_css_variable_map().into_iter().collect();
    vars.sort();
    println!(
        "mode={} ({:?}) scheme={} classes={:?}",
        theme.theme_mode,
        theme.effective_mode,
        theme.color_scheme,
        theme.root_classes()
    );
    for (name, value) in vars {
        println!("  --{name}: {value}");
    }
}
