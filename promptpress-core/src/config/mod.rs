//! Settings storage for the generation client
//!
//! A fixed two-key store (`url`, `key`) with hard-coded defaults. Values are
//! sanitized on write and every update is a whole-snapshot merge, so readers
//! never observe torn state. Deleting removes the whole snapshot and the next
//! read falls back to defaults.

mod error;
mod secrets;

pub use error::{SettingsError, SettingsResult};
pub use secrets::SecretString;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// Settings key for the API base URL
pub const URL: &str = "url";

/// Settings key for the API credential
pub const KEY: &str = "key";

const DEFAULT_URL: &str = "https://cma-pclz7.ondigitalocean.app/";
const DEFAULT_KEY: &str = "";

/// Full snapshot of the persisted settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsSnapshot {
    pub url: String,
    pub key: String,
}

impl Default for SettingsSnapshot {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            key: DEFAULT_KEY.to_string(),
        }
    }
}

/// Key-value store over the fixed settings set
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    stored: Option<SettingsSnapshot>,
}

impl SettingsStore {
    /// Create an empty store; reads see defaults until something is written
    pub fn new() -> Self {
        Self::default()
    }

    /// Default value for a single key
    pub fn default_for(key: &str) -> SettingsResult<String> {
        let defaults = SettingsSnapshot::default();
        match key {
            URL => Ok(defaults.url),
            KEY => Ok(defaults.key),
            other => Err(SettingsError::InvalidKey(other.to_string())),
        }
    }

    /// Read a single setting, falling back to its default when unset
    pub fn get(&self, key: &str) -> SettingsResult<String> {
        let snapshot = self.get_all();
        match key {
            URL => Ok(snapshot.url),
            KEY => Ok(snapshot.key),
            other => Err(SettingsError::InvalidKey(other.to_string())),
        }
    }

    /// Write a single setting as a merge into the full snapshot
    ///
    /// Values are sanitized before they are stored: the credential is
    /// stripped of surrounding whitespace and control characters, the URL
    /// must parse as an absolute URL or the empty string is stored.
    pub fn set(&mut self, key: &str, value: &str) -> SettingsResult<()> {
        let mut snapshot = self.get_all();
        match key {
            URL => snapshot.url = sanitize_url(value),
            KEY => snapshot.key = sanitize_text(value),
            other => return Err(SettingsError::InvalidKey(other.to_string())),
        }
        debug!("Settings updated: {}", key);
        self.stored = Some(snapshot);
        Ok(())
    }

    /// Snapshot of all settings with defaults filled in
    pub fn get_all(&self) -> SettingsSnapshot {
        self.stored.clone().unwrap_or_default()
    }

    /// Remove the whole snapshot; the next read sees defaults again
    pub fn delete_all(&mut self) {
        debug!("Settings deleted");
        self.stored = None;
    }
}

fn sanitize_text(value: &str) -> String {
    value.trim().chars().filter(|c| !c.is_control()).collect()
}

fn sanitize_url(value: &str) -> String {
    match Url::parse(value.trim()) {
        Ok(url) => url.to_string(),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_returns_defaults() {
        let store = SettingsStore::new();
        let snapshot = store.get_all();
        assert_eq!(snapshot.url, "https://cma-pclz7.ondigitalocean.app/");
        assert_eq!(snapshot.key, "");
    }

    #[test]
    fn test_set_merges_and_preserves_other_key() {
        let mut store = SettingsStore::new();
        store.set(URL, "https://x/").unwrap();
        let snapshot = store.get_all();
        assert_eq!(snapshot.url, "https://x/");
        assert_eq!(snapshot.key, "");
    }

    #[test]
    fn test_invalid_key_is_rejected() {
        let mut store = SettingsStore::new();
        assert_eq!(
            store.get("bogus"),
            Err(SettingsError::InvalidKey("bogus".to_string()))
        );
        assert_eq!(
            store.set("bogus", "v"),
            Err(SettingsError::InvalidKey("bogus".to_string()))
        );
        assert_eq!(
            SettingsStore::default_for("bogus"),
            Err(SettingsError::InvalidKey("bogus".to_string()))
        );
    }

    #[test]
    fn test_key_is_sanitized_on_write() {
        let mut store = SettingsStore::new();
        store.set(KEY, "  abc\u{7}123\n").unwrap();
        assert_eq!(store.get(KEY).unwrap(), "abc123");
    }

    #[test]
    fn test_bad_url_stores_empty_string() {
        let mut store = SettingsStore::new();
        store.set(URL, "not a url").unwrap();
        assert_eq!(store.get(URL).unwrap(), "");
    }

    #[test]
    fn test_delete_all_restores_defaults() {
        let mut store = SettingsStore::new();
        store.set(KEY, "secret").unwrap();
        store.delete_all();
        assert_eq!(store.get_all(), SettingsSnapshot::default());
    }
}
