//! Mediaudit Store Layer
//!
//! Implementations of the `KeyValueStore` trait from `mediaudit-domain`.
//!
//! # Implementations
//!
//! - [`MemoryStore`]: In-memory map, the substitute used in tests and the
//!   default when no state directory is available
//! - [`FileStore`]: Single JSON file on disk, loaded once and flushed on
//!   every write
//!
//! # Examples
//!
//! ```
//! use mediaudit_store::MemoryStore;
//! use mediaudit_domain::KeyValueStore;
//!
//! let store = MemoryStore::new();
//! store.set("cursor", "2").unwrap();
//! assert_eq!(store.get("cursor").unwrap().as_deref(), Some("2"));
//! ```

#![warn(missing_docs)]

mod file;

pub use file::FileStore;

use mediaudit_domain::KeyValueStore;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Mutex;
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem read/write failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted file does not contain a valid JSON object
    #[error("Corrupt store file: {0}")]
    Corrupt(String),
}

/// In-memory key-value store.
///
/// Interior mutability behind a `Mutex` so the store can be shared by
/// reference the same way the file-backed store is.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Whether the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    type Error = Infallible;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), Self::Error> {
        self.entries.lock().unwrap().clear();
        Ok(())
    }
}
