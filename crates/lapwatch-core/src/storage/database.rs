//! SQLite-backed key-value storage for the stopwatch record.
//!
//! The record lives under a single key in a `kv` table at
//! `~/.config/lapwatch/lapwatch.db`.

use std::path::Path;

use rusqlite::{params, Connection};

use super::data_dir;
use super::store::SnapshotStore;
use crate::error::{PersistenceError, Result};

/// Key under which the stopwatch record is stored.
pub const STATE_KEY: &str = "stopwatch_state";

/// SQLite database holding the persisted stopwatch record.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/lapwatch/lapwatch.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory or the database cannot be opened.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("lapwatch.db"))
    }

    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| PersistenceError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if SQLite cannot allocate the database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(PersistenceError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), PersistenceError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a key from the kv store.
    pub fn kv_delete(&self, key: &str) -> Result<(), rusqlite::Error> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

impl SnapshotStore for Database {
    fn load(&self) -> Result<Option<String>, PersistenceError> {
        Ok(self.kv_get(STATE_KEY)?)
    }

    fn save(&self, json: &str) -> Result<(), PersistenceError> {
        self.kv_set(STATE_KEY, json)
            .map_err(|e| PersistenceError::WriteFailed {
                message: e.to_string(),
            })
    }

    fn clear(&self) -> Result<(), PersistenceError> {
        self.kv_delete(STATE_KEY)
            .map_err(|e| PersistenceError::WriteFailed {
                message: e.to_string(),
            })
    }
}
