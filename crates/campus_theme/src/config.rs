//! Theme configuration, loaded from a TOML file.
//!
//! ```toml
//! [storage]
//! path = "/srv/campus/preferences.toml"   # optional
//! key_prefix = "campus."
//!
//! [logging]
//! filter = "campus_theme=debug"
//! ```
//!
//! Every field is optional. The preferences file location resolves in
//! order: `storage.path`, `$CAMPUS_THEME_DIR/preferences.toml`, the
//! platform config directory, then the working directory.

use crate::error::Result;
use crate::storage::StorageKeys;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the preferences directory.
pub const CONFIG_DIR_ENV: &str = "CAMPUS_THEME_DIR";

/// File name of the preferences store.
pub const PREFERENCES_FILE: &str = "preferences.toml";

const APP_DIR: &str = "campus-dashboard";

/// Where and how preferences are stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Explicit preferences file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Prefix prepended to every storage key.
    #[serde(default)]
    pub key_prefix: String,
}

/// Log filter used by hosts that install a subscriber.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive string.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "campus_theme=info".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ThemeConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ThemeConfig {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Resolved location of the preferences file.
    pub fn storage_path(&self) -> PathBuf {
        resolve_storage_path(
            self.storage.path.as_deref(),
            std::env::var_os(CONFIG_DIR_ENV).map(PathBuf::from),
            dirs::config_dir(),
        )
    }

    pub fn storage_keys(&self) -> StorageKeys {
        StorageKeys::with_prefix(self.storage.key_prefix.clone())
    }
}

fn resolve_storage_path(
    explicit: Option<&Path>,
    env_dir: Option<PathBuf>,
    config_dir: Option<PathBuf>,
) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(dir) = env_dir.filter(|dir| !dir.as_os_str().is_empty()) {
        return dir.join(PREFERENCES_FILE);
    }
    match config_dir {
        Some(dir) => dir.join(APP_DIR).join(PREFERENCES_FILE),
        None => PathBuf::from(PREFERENCES_FILE),
    }
}
