//! Theme error types

use thiserror::Error;

/// Errors raised while resolving, parsing or persisting theme preferences.
///
/// Every variant is recoverable: the store and manager log these and fall
/// back to defaults instead of surfacing them to consumers.
#[derive(Error, Debug)]
pub enum ThemeError {
    /// Color scheme id not present in the scheme table
    #[error("Color scheme not found: {0}")]
    SchemeNotFound(String),

    /// Value is not a `#rrggbb` color
    #[error("Malformed color: {0:?}")]
    MalformedColor(String),

    /// Stored enum value (theme mode, font size, flag) is not recognized
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    /// Durable storage could not be read or written
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Underlying file I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML document could not be parsed
    #[error("Failed to parse TOML: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// TOML document could not be written
    #[error("Failed to serialize TOML: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

/// Result type for theme operations
pub type Result<T> = std::result::Result<T, ThemeError>;
