//! Durable key-value storage contracts and implementations.
//!
//! # Responsibility
//! - Define the get/set-by-key contract the event store persists through.
//! - Provide SQLite-backed and memory-only implementations.
//!
//! # Invariants
//! - `set` replaces the whole value of a key; readers never observe a
//!   partially written value.
//! - A missing key is `Ok(None)`, never an error.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory_kv;
pub mod sqlite_kv;

pub use memory_kv::MemoryKeyValueStore;
pub use sqlite_kv::SqliteKeyValueStore;

pub type StorageResult<T> = Result<T, StorageError>;

/// Failure reported by a key-value backend.
#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    /// Shared state guarded by a lock was poisoned by a panicking writer.
    Poisoned,
    /// Backend-specific failure described by a message.
    Backend(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Poisoned => write!(f, "storage lock poisoned"),
            Self::Backend(message) => write!(f, "storage backend failure: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Poisoned | Self::Backend(_) => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// On-device key-value layer.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }
}
