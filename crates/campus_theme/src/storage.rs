//! Durable preference storage
//!
//! Preferences are stored as flat string pairs, one key per field, so a
//! single corrupt value never prevents the others from loading.
//!
//! - [`KeyValueStore`]: the storage seam (`MemoryStore`, `TomlFileStore`)
//! - [`PersistenceAdapter`]: typed load/save over a store, with fail-once
//!   degradation to in-memory operation

use crate::color::Color;
use crate::error::{Result, ThemeError};
use crate::presets::ColorSchemeId;
use crate::state::PartialPreferences;
use crate::theme::{FontSize, ThemeMode};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

/// String key-value storage scoped to one user.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

// ========== In-memory store ==========

/// In-memory store. Clones share the same entries.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<FxHashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `entries`.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        store
            .lock()
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        store
    }

    /// Sorted copy of every entry.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.lock()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FxHashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}

// ========== TOML file store ==========

/// Flat `key = "value"` TOML file, rewritten on every change.
#[derive(Debug)]
pub struct TomlFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl TomlFileStore {
    /// Open `path`, starting empty if the file does not exist yet.
    ///
    /// Entries that are not strings are dropped with a warning so one bad
    /// value does not hide the rest. A file that is not valid TOML is an
    /// error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => string_entries(toml::from_str(&content)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        tracing::debug!("TomlFileStore: opened {} ({} keys)", path.display(), entries.len());
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, toml::to_string(&self.entries)?)?;
        Ok(())
    }
}

fn string_entries(table: toml::Table) -> BTreeMap<String, String> {
    table
        .into_iter()
        .filter_map(|(key, value)| match value {
            toml::Value::String(value) => Some((key, value)),
            other => {
                tracing::warn!("Ignoring stored {key}: expected a string, found {}", other.type_str());
                None
            }
        })
        .collect()
}

impl KeyValueStore for TomlFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.entries.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

// ========== Keys ==========

/// Storage key names, optionally namespaced by a prefix.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StorageKeys {
    prefix: String,
}

impl StorageKeys {
    pub const THEME_MODE: &'static str = "theme-mode";
    pub const COLOR_SCHEME: &'static str = "color-scheme";
    pub const FONT_SIZE: &'static str = "font-size";
    pub const SIDEBAR_COLOR: &'static str = "sidebar-color";
    pub const SIDEBAR_OVERRIDE: &'static str = "sidebar-color-override";
    pub const SIDEBAR_TEXT_COLOR: &'static str = "sidebar-text-color";

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }
}

// ========== Adapter ==========

/// Typed load/save of [`PartialPreferences`] over a [`KeyValueStore`].
///
/// The first storage failure is logged and switches the adapter to
/// in-memory operation for the rest of the session.
pub struct PersistenceAdapter {
    store: Box<dyn KeyValueStore>,
    keys: StorageKeys,
    unavailable: bool,
}

impl PersistenceAdapter {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self::with_keys(store, StorageKeys::default())
    }

    pub fn with_keys(store: Box<dyn KeyValueStore>, keys: StorageKeys) -> Self {
        Self {
            store,
            keys,
            unavailable: false,
        }
    }

    /// Adapter over an empty in-memory store that is unavailable from the
    /// start, for a backing store that could not be opened.
    pub fn unavailable(keys: StorageKeys, err: &ThemeError) -> Self {
        let mut adapter = Self::with_keys(Box::new(MemoryStore::new()), keys);
        adapter.mark_unavailable(err);
        adapter
    }

    /// False once a read or write has failed.
    pub fn is_available(&self) -> bool {
        !self.unavailable
    }

    /// Read every field independently. Missing or corrupt values become
    /// defaults; theme mode, scheme, font size, sidebar color and the
    /// override flag are always filled in.
    ///
    /// Defaults are materialized, so `save(load())` writes every missing
    /// key. Over a store whose keys were all written by `save` it leaves
    /// the store byte-identical; over a partial store it fills the gaps
    /// with the values `load` already reported. The sidebar text color is
    /// never loaded and so never rewritten.
    pub fn load(&mut self) -> PartialPreferences {
        let theme_mode = self.read_parsed::<ThemeMode>(StorageKeys::THEME_MODE);
        let color_scheme = self.read_parsed::<ColorSchemeId>(StorageKeys::COLOR_SCHEME);
        let font_size = self.read_parsed::<FontSize>(StorageKeys::FONT_SIZE);
        let sidebar_color = self.read_parsed::<Color>(StorageKeys::SIDEBAR_COLOR);
        let sidebar_overridden = self
            .read_parsed::<bool>(StorageKeys::SIDEBAR_OVERRIDE)
            .unwrap_or(sidebar_color.is_some());

        PartialPreferences {
            theme_mode: Some(theme_mode.unwrap_or_default()),
            color_scheme: Some(color_scheme.unwrap_or_default()),
            font_size: Some(font_size.unwrap_or_default()),
            sidebar_color: Some(sidebar_color.unwrap_or(Color::DEFAULT_SIDEBAR)),
            sidebar_overridden: Some(sidebar_overridden),
            sidebar_text_color: None,
        }
    }

    /// Write the fields present in `prefs`. Never fails; errors are logged.
    pub fn save(&mut self, prefs: &PartialPreferences) {
        if self.unavailable || prefs.is_empty() {
            return;
        }

        let fields = [
            (StorageKeys::THEME_MODE, prefs.theme_mode.map(|m| m.to_string())),
            (StorageKeys::COLOR_SCHEME, prefs.color_scheme.map(|s| s.to_string())),
            (StorageKeys::FONT_SIZE, prefs.font_size.map(|f| f.to_string())),
            (StorageKeys::SIDEBAR_COLOR, prefs.sidebar_color.map(|c| c.to_string())),
            (StorageKeys::SIDEBAR_OVERRIDE, prefs.sidebar_overridden.map(|o| o.to_string())),
            (StorageKeys::SIDEBAR_TEXT_COLOR, prefs.sidebar_text_color.map(|c| c.to_string())),
        ];

        for (name, value) in fields {
            let Some(value) = value else { continue };
            if let Err(err) = self.store.set(&self.keys.key(name), &value) {
                self.mark_unavailable(&err);
                return;
            }
        }
    }

    fn read_parsed<T>(&mut self, name: &str) -> Option<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = self.read(name)?;
        match raw.parse::<T>() {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!("Ignoring stored {name} ({err}); using default");
                None
            }
        }
    }

    fn read(&mut self, name: &str) -> Option<String> {
        if self.unavailable {
            return None;
        }
        match self.store.get(&self.keys.key(name)) {
            Ok(value) => value,
            Err(err) => {
                self.mark_unavailable(&err);
                None
            }
        }
    }

    fn mark_unavailable(&mut self, err: &ThemeError) {
        if !self.unavailable {
            tracing::warn!("Preference storage unavailable, keeping preferences in memory: {err}");
            self.unavailable = true;
        }
    }
}
