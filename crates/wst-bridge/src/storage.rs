//! Persistent key/value storage for preferences and saved documents.
//!
//! Values are strings; structured values are stored as JSON.

use crate::error::{BridgeError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

pub trait Storage {
    fn get_item(&self, key: &str) -> Option<String>;

    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;

    fn remove_item(&mut self, key: &str) -> Result<()>;

    fn get_item_or(&self, key: &str, default: &str) -> String {
        self.get_item(key).unwrap_or_else(|| default.to_string())
    }

    /// Decode the JSON stored under `key`. A missing key is `Ok(None)`;
    /// a value that does not decode is an error.
    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>>
    where
        Self: Sized,
    {
        match self.get_item(key) {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| BridgeError::Storage(format!("{key}: {e}"))),
        }
    }

    fn store_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()>
    where
        Self: Sized,
    {
        let raw =
            serde_json::to_string(value).map_err(|e| BridgeError::Storage(format!("{key}: {e}")))?;
        self.set_item(key, &raw)
    }
}

/// In-process storage for native builds and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.items.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct WindowPrefs {
        width: u32,
        height: u32,
        dark: bool,
    }

    #[test]
    fn get_item_or_default() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.get_item_or("missing", "fallback"), "fallback");
        storage.set_item("k", "v").unwrap();
        assert_eq!(storage.get_item_or("k", "fallback"), "v");
    }

    #[test]
    fn json_roundtrip() {
        let mut storage = MemoryStorage::new();
        let prefs = WindowPrefs {
            width: 1280,
            height: 720,
            dark: true,
        };
        storage.store_json("prefs", &prefs).unwrap();
        assert_eq!(storage.load_json::<WindowPrefs>("prefs").unwrap(), Some(prefs));
        assert_eq!(storage.load_json::<WindowPrefs>("other").unwrap(), None);
    }

    #[test]
    fn corrupt_json_is_storage_error() {
        let mut storage = MemoryStorage::new();
        storage.set_item("prefs", "{not json").unwrap();
        let err = storage.load_json::<WindowPrefs>("prefs").unwrap_err();
        assert!(matches!(err, BridgeError::Storage(_)), "{err:?}");
    }

    #[test]
    fn remove_item() {
        let mut storage = MemoryStorage::new();
        storage.set_item("a", "1").unwrap();
        storage.remove_item("a").unwrap();
        assert!(storage.is_empty());
    }
}
