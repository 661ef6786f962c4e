//! `window.localStorage` behind the bridge [`Storage`] trait.

use crate::host::js_error_text;
use wst_bridge::{BridgeError, Result, Storage};

pub struct LocalStorage {
    inner: web_sys::Storage,
}

impl LocalStorage {
    /// Fails when the page has no `localStorage` (e.g. disabled by the
    /// user, or a sandboxed iframe).
    pub fn open() -> Result<Self> {
        let window =
            web_sys::window().ok_or_else(|| BridgeError::HostUnavailable("window".into()))?;
        let inner = window
            .local_storage()
            .map_err(|err| BridgeError::Storage(js_error_text(&err)))?
            .ok_or_else(|| BridgeError::HostUnavailable("localStorage".into()))?;
        Ok(Self { inner })
    }
}

impl Storage for LocalStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.inner.get_item(key).ok().flatten()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        // Throws QuotaExceededError when full.
        self.inner
            .set_item(key, value)
            .map_err(|err| BridgeError::Storage(format!("{key}: {}", js_error_text(&err))))
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.inner
            .remove_item(key)
            .map_err(|err| BridgeError::Storage(format!("{key}: {}", js_error_text(&err))))
    }
}
