//! Settings error types

use thiserror::Error;

/// Result type for settings operations
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Errors that can occur when reading or writing settings
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// A key outside the allowed set was used. This is a programmer error:
    /// only `url` and `key` exist.
    #[error("Invalid settings key '{0}'")]
    InvalidKey(String),
}
