//! `window.localStorage` as the signature cache's backing store.

use sigpad_core::KeyValueStorage;

/// Browser local storage. Every access tolerates a missing or blocked
/// storage object (private mode, sandboxed iframes); reads then miss and
/// writes report an error the cache logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

impl KeyValueStorage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        let storage = Self::storage().ok_or("localStorage unavailable")?;
        storage
            .set_item(key, value)
            .map_err(|e| format!("localStorage.setItem failed: {e:?}"))
    }

    fn remove(&mut self, key: &str) {
        if let Some(storage) = Self::storage()
            && storage.remove_item(key).is_err()
        {
            log::warn!("localStorage.removeItem({key}) failed");
        }
    }
}
