//! Last-used signature cache.
//!
//! The cache sits on top of a tiny string key-value backend (browser
//! `localStorage`, or [`MemoryStorage`] natively and in tests) under a single
//! fixed key. Entries are validated on the way out: anything unparsable or
//! with unusable dimensions is treated as absent and removed.

use crate::geometry::is_valid_extent;
use crate::model::ImageRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Minimal string storage the cache persists into.
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), String>;
    fn remove(&mut self, key: &str);
}

/// In-process storage backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// A signature as persisted: encoded image plus its pixel dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedSignature {
    pub image: ImageRef,
    pub width: f64,
    pub height: f64,
}

pub struct SignatureCache<S: KeyValueStorage> {
    storage: S,
    key: String,
}

impl<S: KeyValueStorage> SignatureCache<S> {
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Persist the most recent signature, replacing any previous one.
    /// Storage failures (quota, private mode) are logged and swallowed: the
    /// cache is a convenience, never a requirement.
    pub fn save(&mut self, image: &ImageRef, width: f64, height: f64) {
        let entry = CachedSignature {
            image: image.clone(),
            width,
            height,
        };
        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("signature cache: serialize failed: {e}");
                return;
            }
        };
        if let Err(e) = self.storage.set(&self.key, &json) {
            log::warn!("signature cache: write failed: {e}");
        }
    }

    /// Retrieve the cached signature if present and usable.
    /// Corrupt or stale entries are cleared and reported as absent.
    pub fn load(&mut self) -> Option<CachedSignature> {
        let raw = self.storage.get(&self.key)?;
        let entry = match serde_json::from_str::<CachedSignature>(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("signature cache: discarding unparsable entry: {e}");
                self.clear();
                return None;
            }
        };
        if !is_valid_extent(entry.width, entry.height) || entry.image.as_str().is_empty() {
            log::warn!(
                "signature cache: discarding entry with dimensions {}x{}",
                entry.width,
                entry.height
            );
            self.clear();
            return None;
        }
        Some(entry)
    }

    pub fn clear(&mut self) {
        self.storage.remove(&self.key);
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}
