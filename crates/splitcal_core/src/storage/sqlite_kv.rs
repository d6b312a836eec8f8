//! SQLite implementation of `KeyValueStore`.
//!
//! # Invariants
//! - One row per key in `kv_entries`; `set` is a single upsert statement.
//! - The connection must come from `db::open_db*` so the schema exists.

use super::{KeyValueStore, StorageResult};
use crate::db::{open_db, open_db_in_memory};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Key-value store owning one migrated SQLite connection.
pub struct SqliteKeyValueStore {
    conn: Connection,
}

impl SqliteKeyValueStore {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens (or creates) a database file and wraps it.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> StorageResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}
