//! Key-value record store tier: one table keyed by URL.
//!
//! Wraps a SQLite database with open/get/put operations. The schema is
//! created on first use. Each operation runs in its own transaction; a
//! failed transaction is isolated and does not block subsequent ones.
//! The store is additive: records are superseded by replacement, never
//! individually deleted.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::storage::StorageError;

/// A single stored `{url, content}` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRecord {
    pub url: String,
    pub content: String,
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS assets (
    url TEXT PRIMARY KEY,
    content TEXT NOT NULL
)";

/// SQLite-backed record store. This type exclusively owns the record table.
pub struct RecordStore {
    conn: Mutex<Connection>,
}

impl RecordStore {
    /// Open the store at the given path, creating the schema on first use.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Open an ephemeral in-memory store.
    pub fn in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute(SCHEMA, [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Read the record for an exact URL.
    ///
    /// `Ok(None)` is the not-found signal, distinct from genuine store failure.
    pub fn get(&self, url: &str) -> Result<Option<AssetRecord>, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockPoisoned)?;

        let record = conn
            .query_row(
                "SELECT url, content FROM assets WHERE url = ?1",
                params![url],
                |row| {
                    Ok(AssetRecord {
                        url: row.get(0)?,
                        content: row.get(1)?,
                    })
                },
            )
            .optional()?;

        Ok(record)
    }

    /// Persist a record, replacing any previous content for the same URL.
    pub fn put(&self, record: &AssetRecord) -> Result<(), StorageError> {
        let mut conn = self.conn.lock().map_err(|_| StorageError::LockPoisoned)?;

        let tx = conn.transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO assets (url, content) VALUES (?1, ?2)",
            params![record.url, record.content],
        )?;
        tx.commit()?;

        debug!(url = %record.url, size = record.content.len(), "Record persisted");

        Ok(())
    }

    /// Number of records in the store.
    pub fn len(&self) -> Result<usize, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockPoisoned)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM assets", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}
