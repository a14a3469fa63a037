//! Durable key-value state store.
//!
//! Each engine owns a disjoint set of keys and writes one JSON record per key.
//! Reads never fail from the engine's point of view: a missing or unreadable
//! record becomes the type's default, which is the expected first-run state.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

/// Key of the persisted countdown record.
pub const COUNTDOWN_KEY: &str = "countdown";
/// Key of the persisted stopwatch record.
pub const STOPWATCH_KEY: &str = "stopwatch";
/// Key of the persisted daily ledger.
pub const LEDGER_KEY: &str = "daily-records";

/// Raw string storage with synchronous read-after-write.
pub trait StateStore: Send {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: StateStore + ?Sized> StateStore for Box<S> {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get_raw(key)
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set_raw(key, value)
    }
}

impl<S: StateStore + Sync + ?Sized> StateStore for std::sync::Arc<S> {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get_raw(key)
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set_raw(key, value)
    }
}

/// Typed access on top of [`StateStore`].
pub trait StoreExt: StateStore {
    /// Read and decode `key`, falling back to `T::default()` when the record
    /// is absent, unreadable or corrupt.
    fn get_or_default<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        match self.get_raw(key) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(key, error = %e, "corrupt record, using defaults");
                    T::default()
                }
            },
            Ok(None) => T::default(),
            Err(e) => {
                tracing::warn!(key, error = %e, "store read failed, using defaults");
                T::default()
            }
        }
    }

    /// Encode and write `value` under `key`.
    fn put<T>(&self, key: &str, value: &T) -> Result<(), StoreError>
    where
        T: Serialize + ?Sized,
    {
        let json = serde_json::to_string(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.set_raw(key, &json)
    }
}

impl<S: StateStore + ?Sized> StoreExt for S {}
