//! Key-value persistence primitive.
//!
//! The archive only needs `get`/`set`/`remove` of JSON values by key, the
//! same contract a browser's local storage area offers. [`SqliteStorage`]
//! backs it with the `kv` table; [`MemoryStorage`] keeps it in a shared map.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, OptionalExtension};
use serde_json::Value;

use super::connection::Database;
use crate::types::errors::StorageError;

/// Host persistence contract.
pub trait Storage {
    /// Returns the stored value, or `None` if the key was never written.
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;
    fn set(&mut self, key: &str, value: &Value) -> Result<(), StorageError>;
    /// Deletes the key. Deleting a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Storage backed by a SQLite `kv` table.
pub struct SqliteStorage {
    db: Database,
}

impl SqliteStorage {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl Storage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let raw: Option<String> = self
            .db
            .connection()
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;

        match raw {
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| StorageError::SerializationError(format!("{}: {}", key, e))),
            None => Ok(None),
        }
    }

    fn set(&mut self, key: &str, value: &Value) -> Result<(), StorageError> {
        let text = serde_json::to_string(value)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64;

        self.db.connection().execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, text, now],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.db
            .connection()
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

/// In-memory storage. Clones share the same map, so a test can keep a handle
/// and inspect what the archive persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, Value>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a key without going through the trait's `Result`.
    pub fn peek(&self, key: &str) -> Option<Value> {
        self.entries
            .lock()
            .ok()
            .and_then(|map| map.get(key).cloned())
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let map = self
            .entries
            .lock()
            .map_err(|e| StorageError::DatabaseError(e.to_string()))?;
        Ok(map.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &Value) -> Result<(), StorageError> {
        let mut map = self
            .entries
            .lock()
            .map_err(|e| StorageError::DatabaseError(e.to_string()))?;
        map.insert(key.to_string(), value.clone());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut map = self
            .entries
            .lock()
            .map_err(|e| StorageError::DatabaseError(e.to_string()))?;
        map.remove(key);
        Ok(())
    }
}
