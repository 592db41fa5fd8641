//! "Add to favorites" state, persisted per hotel in a key-value store.

use log::{debug, warn};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use web_sys::Storage;

pub const LABEL_ACTIVE: &str = "В избранном";
pub const LABEL_INACTIVE: &str = "В избранное";
pub const TITLE_ACTIVE: &str = "Удалить из избранного";
pub const TITLE_INACTIVE: &str = "Добавить в избранное";

/// Storage failures. The button keeps working in memory when they occur.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    Unavailable,
    Rejected { key: String, reason: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable => write!(f, "Local storage is not available"),
            StoreError::Rejected { key, reason } => {
                write!(f, "Storage rejected update of '{}': {}", key, reason)
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Boolean flags keyed by product.
pub trait FlagStore {
    fn is_set(&self, key: &str) -> Result<bool, StoreError>;
    fn set(&self, key: &str, value: bool) -> Result<(), StoreError>;
}

/// `window.localStorage`; a set flag is stored as `true`, a cleared one is
/// removed.
pub struct LocalStorageStore {
    storage: Storage,
}

impl LocalStorageStore {
    pub fn open() -> Result<Self, StoreError> {
        let storage = gloo_utils::window()
            .local_storage()
            .ok()
            .flatten()
            .ok_or(StoreError::Unavailable)?;
        Ok(Self { storage })
    }
}

impl FlagStore for LocalStorageStore {
    fn is_set(&self, key: &str) -> Result<bool, StoreError> {
        let raw = self
            .storage
            .get_item(key)
            .map_err(|_| StoreError::Unavailable)?;
        Ok(raw.is_some())
    }

    fn set(&self, key: &str, value: bool) -> Result<(), StoreError> {
        let result = if value {
            let encoded = serde_json::to_string(&true).map_err(|e| StoreError::Rejected {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
            self.storage.set_item(key, &encoded)
        } else {
            self.storage.remove_item(key)
        };
        result.map_err(|e| StoreError::Rejected {
            key: key.to_string(),
            reason: format!("{:?}", e),
        })
    }
}

/// In-memory store, used when local storage is unavailable and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    flags: RefCell<HashMap<String, bool>>,
}

impl FlagStore for MemoryStore {
    fn is_set(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.flags.borrow().contains_key(key))
    }

    fn set(&self, key: &str, value: bool) -> Result<(), StoreError> {
        let mut flags = self.flags.borrow_mut();
        if value {
            flags.insert(key.to_string(), true);
        } else {
            flags.remove(key);
        }
        Ok(())
    }
}

/// Storage key for a catalog item: its title text exactly as the page renders
/// it, so flags stored by earlier versions of the page keep matching. Blank
/// titles get no key.
pub fn favorite_key(title_text: &str) -> Option<String> {
    (!title_text.trim().is_empty()).then(|| title_text.to_string())
}

/// Favorite state of one catalog item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Favorite {
    pub key: String,
    pub active: bool,
}

impl Favorite {
    /// Restore the flag for `key`; an unreadable store counts as "not set".
    pub fn load(key: impl Into<String>, store: &dyn FlagStore) -> Self {
        let key = key.into();
        let active = store.is_set(&key).unwrap_or_else(|e| {
            warn!("{}", e);
            false
        });
        Self { key, active }
    }

    /// Flip the flag and persist it. The new state is kept even if the store
    /// refuses it.
    pub fn toggle(&mut self, store: &dyn FlagStore) -> Result<(), StoreError> {
        self.active = !self.active;
        debug!("favorite '{}' -> {}", self.key, self.active);
        store.set(&self.key, self.active)
    }

    pub fn label(&self) -> &'static str {
        if self.active {
            LABEL_ACTIVE
        } else {
            LABEL_INACTIVE
        }
    }

    pub fn title(&self) -> &'static str {
        if self.active {
            TITLE_ACTIVE
        } else {
            TITLE_INACTIVE
        }
    }

    pub fn aria_pressed(&self) -> &'static str {
        if self.active {
            "true"
        } else {
            "false"
        }
    }
}
