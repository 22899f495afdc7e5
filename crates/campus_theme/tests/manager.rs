use campus_theme::watcher::ListenerId;
use campus_theme::{
    contrast_text_color, CanvasBackgroundPicker, Color, ColorSchemeId, DarkModeListener,
    DarkModeSignal, EffectiveMode, FontSize, KeyValueStore, MemoryStore, SettingsPanel,
    SidebarSource, SystemColorScheme, ThemeConfig, ThemeError, ThemeManager, ThemeMode,
    TomlFileStore,
};
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};

fn manager_with(store: &MemoryStore, dark: bool) -> (ThemeManager, Arc<SystemColorScheme>) {
    let signal = Arc::new(SystemColorScheme::new(dark));
    let manager = ThemeManager::new(Box::new(store.clone()), signal.clone());
    (manager, signal)
}

#[test]
fn default_scheme_light_mode_scenario() {
    let store = MemoryStore::with_entries([("theme-mode", "light")]);
    let (manager, _signal) = manager_with(&store, true);

    let theme = manager.applied();
    assert_eq!(theme.effective_mode, EffectiveMode::Light);
    assert_eq!(theme.sidebar_color.to_string(), "#4f46e5");
    assert_eq!(theme.sidebar_text_color.to_string(), "#ffffff");
}

#[test]
fn system_mode_follows_os_signal_without_setter_calls() {
    let store = MemoryStore::new();
    let (manager, signal) = manager_with(&store, false);
    assert_eq!(manager.theme_mode(), ThemeMode::System);
    assert!(manager.is_watching_system());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    manager.on_apply(move |theme| sink.lock().unwrap().push(theme.sidebar_color));

    signal.set_prefers_dark(true);
    assert_eq!(manager.sidebar_color(), ColorSchemeId::Default.color(EffectiveMode::Dark));
    signal.set_prefers_dark(false);
    assert_eq!(manager.sidebar_color(), ColorSchemeId::Default.color(EffectiveMode::Light));

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            Color::from_hex(0x4F46E5),
            Color::from_hex(0x6366F1),
            Color::from_hex(0x4F46E5),
        ]
    );
}

#[test]
fn leaving_system_mode_unsubscribes() {
    let store = MemoryStore::new();
    let (manager, signal) = manager_with(&store, false);
    assert_eq!(signal.listener_count(), 1);

    manager.set_theme_mode(ThemeMode::Light);
    assert!(!manager.is_watching_system());
    assert_eq!(signal.listener_count(), 0);

    signal.set_prefers_dark(true);
    assert_eq!(manager.effective_mode(), EffectiveMode::Light);

    // Re-entering system mode picks up the change made while unsubscribed
    manager.set_theme_mode(ThemeMode::System);
    assert_eq!(signal.listener_count(), 1);
    assert_eq!(manager.effective_mode(), EffectiveMode::Dark);
    assert_eq!(manager.sidebar_color().to_string(), "#6366f1");
}

#[test]
fn dropping_the_manager_unsubscribes() {
    let store = MemoryStore::new();
    let (manager, signal) = manager_with(&store, false);
    assert_eq!(signal.listener_count(), 1);
    drop(manager);
    assert_eq!(signal.listener_count(), 0);
}

#[test]
fn explicit_override_wins_over_scheme_and_os_changes() {
    let store = MemoryStore::new();
    let (manager, signal) = manager_with(&store, false);
    let picked = Color::from_hex(0x0F766E);

    manager.set_sidebar_color(picked, SidebarSource::Explicit);
    manager.set_color_scheme(ColorSchemeId::Rose);
    signal.set_prefers_dark(true);
    assert_eq!(manager.sidebar_color(), picked);
    assert_eq!(manager.sidebar_text_color(), contrast_text_color(picked));

    manager.reset_sidebar_to_scheme();
    assert_eq!(manager.sidebar_color(), ColorSchemeId::Rose.color(EffectiveMode::Dark));
}

#[test]
fn setters_persist_changed_fields_and_dependents() {
    let store = MemoryStore::new();
    let (manager, _signal) = manager_with(&store, false);

    manager.set_font_size(FontSize::Large);
    assert_eq!(store.get("font-size").unwrap().as_deref(), Some("large"));
    assert_eq!(store.get("color-scheme").unwrap(), None);

    manager.set_color_scheme(ColorSchemeId::Emerald);
    assert_eq!(store.get("color-scheme").unwrap().as_deref(), Some("emerald"));
    assert_eq!(store.get("sidebar-color").unwrap().as_deref(), Some("#059669"));
    assert_eq!(store.get("sidebar-text-color").unwrap().as_deref(), Some("#ffffff"));
    assert_eq!(store.get("sidebar-color-override").unwrap().as_deref(), Some("false"));
    assert_eq!(store.get("theme-mode").unwrap(), None);
}

#[test]
fn preferences_survive_a_reload() {
    let store = MemoryStore::new();
    {
        let (manager, _signal) = manager_with(&store, false);
        manager.set_theme_mode(ThemeMode::Dark);
        manager.set_color_scheme(ColorSchemeId::Violet);
        manager.set_font_size(FontSize::Small);
        manager.set_sidebar_color(Color::from_hex(0xFDE68A), SidebarSource::Explicit);
    }

    let (reloaded, signal) = manager_with(&store, false);
    let theme = reloaded.applied();
    assert_eq!(theme.theme_mode, ThemeMode::Dark);
    assert_eq!(theme.color_scheme, ColorSchemeId::Violet);
    assert_eq!(theme.font_size, FontSize::Small);
    assert_eq!(theme.sidebar_color, Color::from_hex(0xFDE68A));
    assert_eq!(theme.sidebar_text_color, Color::BLACK);
    assert!(theme.sidebar_overridden);
    assert_eq!(signal.listener_count(), 0);
}

#[test]
fn corrupt_stored_field_falls_back_alone() {
    let store = MemoryStore::with_entries([
        ("theme-mode", "dark"),
        ("color-scheme", "not-a-real-scheme"),
        ("font-size", "large"),
        ("sidebar-color", "#123456"),
    ]);
    let (manager, _signal) = manager_with(&store, false);

    let theme = manager.applied();
    assert_eq!(theme.theme_mode, ThemeMode::Dark);
    assert_eq!(theme.color_scheme, ColorSchemeId::Default);
    assert_eq!(theme.font_size, FontSize::Large);
    assert_eq!(theme.sidebar_color, Color::from_hex(0x123456));
}

#[test]
fn consumers_see_hydrated_values_on_registration() {
    let store = MemoryStore::with_entries([("theme-mode", "dark"), ("color-scheme", "sky")]);
    let (manager, _signal) = manager_with(&store, false);

    let first = Arc::new(Mutex::new(None));
    let slot = first.clone();
    manager.on_apply(move |theme| {
        slot.lock().unwrap().get_or_insert(theme.sidebar_color);
    });
    assert_eq!(*first.lock().unwrap(), Some(Color::from_hex(0x0EA5E9)));
}

struct ReadOnlyStore;

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> campus_theme::Result<Option<String>> {
        Ok(None)
    }

    fn set(&mut self, _key: &str, _value: &str) -> campus_theme::Result<()> {
        Err(ThemeError::StorageUnavailable("read-only".into()))
    }

    fn remove(&mut self, _key: &str) -> campus_theme::Result<()> {
        Err(ThemeError::StorageUnavailable("read-only".into()))
    }
}

#[test]
fn failed_save_does_not_break_the_interaction() {
    let manager = ThemeManager::new(
        Box::new(ReadOnlyStore),
        Arc::new(SystemColorScheme::new(false)),
    );
    assert!(manager.is_storage_available());

    manager.set_color_scheme(ColorSchemeId::Lime);
    assert_eq!(manager.color_scheme(), ColorSchemeId::Lime);
    assert!(!manager.is_storage_available());

    manager.set_font_size(FontSize::Small);
    assert_eq!(manager.font_size(), FontSize::Small);
}

#[test]
fn canvas_picker_pins_sidebar_and_settings_offer_reset() {
    let store = MemoryStore::new();
    let (manager, _signal) = manager_with(&store, false);
    let picker = CanvasBackgroundPicker::new(&manager);

    assert_eq!(picker.pick("#FFFFFF"), Color::WHITE);
    assert_eq!(picker.current(), Color::WHITE);
    assert_eq!(manager.sidebar_text_color(), Color::BLACK);
    assert!(SettingsPanel::new(&manager.applied()).can_reset_sidebar);

    assert_eq!(picker.pick("#nope"), Color::DEFAULT_SIDEBAR);
    assert_eq!(manager.sidebar_text_color(), Color::WHITE);
}

#[test]
fn file_backed_manager_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs").join("preferences.toml");
    let mut config = ThemeConfig::default();
    config.storage.path = Some(path.clone());
    config.storage.key_prefix = "campus.".into();

    {
        let manager = ThemeManager::from_config(&config, Arc::new(SystemColorScheme::new(false)));
        manager.set_theme_mode(ThemeMode::Light);
        manager.set_color_scheme(ColorSchemeId::Orange);
    }

    let on_disk = std::fs::read_to_string(&path).unwrap();
    assert!(
        on_disk.lines().any(|line| line.contains("campus.color-scheme") && line.contains("orange")),
        "{on_disk}"
    );

    let store = TomlFileStore::open(&path).unwrap();
    assert_eq!(store.get("campus.theme-mode").unwrap().as_deref(), Some("light"));

    let reloaded = ThemeManager::from_config(&config, Arc::new(SystemColorScheme::new(true)));
    assert_eq!(reloaded.color_scheme(), ColorSchemeId::Orange);
    assert_eq!(reloaded.sidebar_color(), ColorSchemeId::Orange.color(EffectiveMode::Light));
}

#[test]
fn non_string_value_in_preferences_file_falls_back_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.toml");
    std::fs::write(
        &path,
        "theme-mode = \"dark\"\ncolor-scheme = \"rose\"\nfont-size = 3\nsidebar-color = \"#123456\"\n",
    )
    .unwrap();
    let mut config = ThemeConfig::default();
    config.storage.path = Some(path.clone());

    let manager = ThemeManager::from_config(&config, Arc::new(SystemColorScheme::new(false)));
    assert_eq!(manager.theme_mode(), ThemeMode::Dark);
    assert_eq!(manager.color_scheme(), ColorSchemeId::Rose);
    assert_eq!(manager.font_size(), FontSize::Medium);
    assert_eq!(manager.sidebar_color(), Color::from_hex(0x123456));
    assert!(manager.is_storage_available());

    manager.set_font_size(FontSize::Large);
    let store = TomlFileStore::open(&path).unwrap();
    assert_eq!(store.get("font-size").unwrap().as_deref(), Some("large"));
    assert_eq!(store.get("color-scheme").unwrap().as_deref(), Some("rose"));
}

#[test]
fn unreadable_preferences_file_reports_storage_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.toml");
    std::fs::write(&path, "[theme-mode\n").unwrap();
    let mut config = ThemeConfig::default();
    config.storage.path = Some(path.clone());

    let manager = ThemeManager::from_config(&config, Arc::new(SystemColorScheme::new(false)));
    assert!(!manager.is_storage_available());
    assert_eq!(manager.theme_mode(), ThemeMode::System);

    manager.set_font_size(FontSize::Large);
    assert_eq!(manager.font_size(), FontSize::Large);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[theme-mode\n");
}

#[test]
fn consumers_end_on_the_newest_theme_when_a_consumer_calls_back() {
    let store = MemoryStore::new();
    let (manager, _signal) = manager_with(&store, false);
    let manager = Arc::new(manager);

    let weak = Arc::downgrade(&manager);
    manager.on_apply(move |theme| {
        if theme.color_scheme == ColorSchemeId::Red {
            if let Some(manager) = weak.upgrade() {
                manager.set_color_scheme(ColorSchemeId::Blue);
            }
        }
    });
    let painted = Arc::new(Mutex::new(Vec::new()));
    let sink = painted.clone();
    manager.on_apply(move |theme| sink.lock().unwrap().push(theme.sidebar_color));

    manager.set_color_scheme(ColorSchemeId::Red);
    assert_eq!(manager.color_scheme(), ColorSchemeId::Blue);
    assert_eq!(manager.sidebar_color(), Color::from_hex(0x2563EB));
    assert_eq!(
        painted.lock().unwrap().last().copied(),
        Some(manager.sidebar_color())
    );
}

/// Signal whose value flips while a subscription is being set up, before
/// the new listener is registered to hear it.
struct FlipsOnSubscribe {
    inner: SystemColorScheme,
}

impl DarkModeSignal for FlipsOnSubscribe {
    fn prefers_dark(&self) -> bool {
        self.inner.prefers_dark()
    }

    fn subscribe(&self, listener: DarkModeListener) -> ListenerId {
        self.inner.set_prefers_dark(!self.inner.prefers_dark());
        self.inner.subscribe(listener)
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.inner.unsubscribe(id)
    }
}

#[test]
fn os_change_during_subscription_is_not_lost() {
    let signal = Arc::new(FlipsOnSubscribe {
        inner: SystemColorScheme::new(false),
    });
    let manager = ThemeManager::new(Box::new(MemoryStore::new()), signal.clone());
    assert!(signal.prefers_dark());
    assert_eq!(manager.effective_mode(), EffectiveMode::Dark);

    manager.set_theme_mode(ThemeMode::Light);
    manager.set_theme_mode(ThemeMode::System);
    assert!(!signal.prefers_dark());
    assert_eq!(manager.effective_mode(), EffectiveMode::Light);
    assert_eq!(manager.sidebar_color(), ColorSchemeId::Default.color(EffectiveMode::Light));
}
