//! Key/value persistence port.
//!
//! Stores only ever see strings; JSON encoding is the caller's business.
//! `BrowserStorage` wraps `window.localStorage`, `MemoryStorage` backs tests
//! and environments where local storage is blocked.

use std::collections::HashMap;

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("local storage is unavailable")]
    Unavailable,
    #[error("storage call rejected: {0}")]
    Js(String),
    #[error("malformed stored data: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<JsValue> for StorageError {
    fn from(value: JsValue) -> Self {
        StorageError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// `window.localStorage`. Construction fails when there is no window or the
/// browser refuses access (private mode, sandboxed iframes).
pub struct BrowserStorage {
    inner: web_sys::Storage,
}

impl BrowserStorage {
    pub fn open() -> Result<Self, StorageError> {
        let win = web_sys::window().ok_or(StorageError::Unavailable)?;
        let inner = win.local_storage()?.ok_or(StorageError::Unavailable)?;
        Ok(Self { inner })
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.inner.get_item(key)?)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        Ok(self.inner.set_item(key, value)?)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        Ok(self.inner.remove_item(key)?)
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, key: &str, value: &str) -> Self {
        self.items.insert(key.to_string(), value.to_string());
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.items.remove(key);
        Ok(())
    }
}

/// Either backend, chosen at runtime: local storage when the browser grants
/// it, otherwise an in-memory map so the game still works for this visit.
pub enum AnyStorage {
    Browser(BrowserStorage),
    Memory(MemoryStorage),
}

impl AnyStorage {
    pub fn browser_or_memory() -> Self {
        match BrowserStorage::open() {
            Ok(store) => AnyStorage::Browser(store),
            Err(err) => {
                log::warn!("{err}; scores will only last for this visit");
                AnyStorage::Memory(MemoryStorage::new())
            }
        }
    }
}

impl KeyValueStore for AnyStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            AnyStorage::Browser(s) => s.get(key),
            AnyStorage::Memory(s) => s.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            AnyStorage::Browser(s) => s.set(key, value),
            AnyStorage::Memory(s) => s.set(key, value),
        }
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match self {
            AnyStorage::Browser(s) => s.remove(key),
            AnyStorage::Memory(s) => s.remove(key),
        }
    }
}
