//! SQLite-backed durable store.
//!
//! A single `kv` table holds one JSON record per key. Writes go straight to the
//! database file, so a killed process loses nothing that was already set.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use super::StateStore;
use crate::error::StoreError;
use crate::storage::data_dir;

/// SQLite database holding engine state.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open the store at `<data dir>/deepwork.db`.
    ///
    /// # Errors
    /// Returns an error if the data directory is unavailable or the database
    /// cannot be opened or migrated.
    pub fn open() -> Result<Self, crate::error::CoreError> {
        let path = data_dir()?.join("deepwork.db");
        Ok(Self::open_at(&path)?)
    }

    /// Open (creating if needed) the store at `path`.
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }
}

impl StateStore for SqliteStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}
