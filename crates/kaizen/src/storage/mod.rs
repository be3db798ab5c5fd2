//! Local key-value storage for kaizen.
//!
//! An `SQLite`-backed stand-in for browser local storage: a flat map of
//! string keys to string values. The application document lives under one
//! key (see [`crate::document`]); local accounts and anything else the app
//! persists live under their own keys.

pub mod inspect;
pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::iso_timestamp;

/// Marker path used by in-memory databases.
const MEMORY_PATH: &str = ":memory:";

/// Key-value store backed by `SQLite`.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

/// One stored key and its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredItem {
    /// Item key.
    pub key: String,
    /// Raw stored text.
    pub value: String,
    /// Last write time, if recorded.
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoredItem {
    /// Size of the value in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.value.len() as u64
    }
}

impl Storage {
    /// Open or create a store at the given path.
    ///
    /// Creates parent directories if needed and migrates the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let mut conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&mut conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(MEMORY_PATH),
            source,
        })?;

        migrations::initialize_schema(&mut conn)?;

        Ok(Self {
            path: PathBuf::from(MEMORY_PATH),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM items WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO items (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            params![key, value, iso_timestamp(Utc::now())],
        )?;
        debug!(key, bytes = value.len(), "Stored item");
        Ok(())
    }

    /// Remove `key`. Returns `true` if it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn remove_item(&self, key: &str) -> Result<bool> {
        let affected = self.conn.execute("DELETE FROM items WHERE key = ?1", [key])?;
        if affected > 0 {
            info!(key, "Removed item");
        }
        Ok(affected > 0)
    }

    /// All keys in ascending order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM items ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    /// All items in key order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn items(&self) -> Result<Vec<StoredItem>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value, updated_at FROM items ORDER BY key")?;
        let items = stmt
            .query_map([], |row| {
                let updated_at: String = row.get(2)?;
                Ok(StoredItem {
                    key: row.get(0)?,
                    value: row.get(1)?,
                    updated_at: DateTime::parse_from_rfc3339(&updated_at)
                        .ok()
                        .map(|dt| dt.with_timezone(&Utc)),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// Number of stored keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Whether the store holds no keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Total size of all stored values in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn total_size(&self) -> Result<u64> {
        let total: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(LENGTH(CAST(value AS BLOB))), 0) FROM items",
            [],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    /// Remove every key. Returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn clear(&self) -> Result<usize> {
        let affected = self.conn.execute("DELETE FROM items", [])?;
        info!("Cleared {} items", affected);
        Ok(affected)
    }

    /// Get store statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let last_write: Option<String> = self
            .conn
            .query_row(
                "SELECT updated_at FROM items WHERE updated_at != '' ORDER BY updated_at DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let db_size_bytes = if self.path.as_os_str() == MEMORY_PATH {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            total_items: self.len()?,
            total_bytes: self.total_size()?,
            last_write: last_write
                .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                .map(|dt| dt.with_timezone(&Utc)),
            db_size_bytes,
        })
    }
}

/// Statistics about the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Number of stored keys.
    pub total_items: usize,
    /// Sum of value sizes in bytes.
    pub total_bytes: u64,
    /// Most recent write.
    pub last_write: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_storage() -> Storage {
        Storage::open_in_memory().expect("failed to create test storage")
    }

    #[test]
    fn test_set_and_get() {
        let storage = create_test_storage();
        storage.set_item("greeting", "hello").unwrap();

        assert_eq!(storage.get_item("greeting").unwrap().as_deref(), Some("hello"));
        assert!(storage.get_item("missing").unwrap().is_none());
    }

    #[test]
    fn test_set_overwrites() {
        let storage = create_test_storage();
        storage.set_item("k", "one").unwrap();
        storage.set_item("k", "two").unwrap();

        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("two"));
        assert_eq!(storage.len().unwrap(), 1);
    }

    #[test]
    fn test_remove_item() {
        let storage = create_test_storage();
        storage.set_item("k", "v").unwrap();

        assert!(storage.remove_item("k").unwrap());
        assert!(!storage.remove_item("k").unwrap());
        assert!(storage.is_empty().unwrap());
    }

    #[test]
    fn test_keys_sorted() {
        let storage = create_test_storage();
        storage.set_item("b", "2").unwrap();
        storage.set_item("a", "1").unwrap();
        storage.set_item("c", "3").unwrap();

        assert_eq!(storage.keys().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_items_record_update_time() {
        let storage = create_test_storage();
        storage.set_item("k", "v").unwrap();

        let items = storage.items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].key, "k");
        assert_eq!(items[0].size(), 1);
        assert!(items[0].updated_at.is_some());
    }

    #[test]
    fn test_total_size_counts_bytes() {
        let storage = create_test_storage();
        assert_eq!(storage.total_size().unwrap(), 0);

        storage.set_item("peso", "₱").unwrap();
        storage.set_item("ascii", "abc").unwrap();

        assert_eq!(storage.total_size().unwrap(), 3 + 3);
    }

    #[test]
    fn test_clear() {
        let storage = create_test_storage();
        storage.set_item("a", "1").unwrap();
        storage.set_item("b", "2").unwrap();

        assert_eq!(storage.clear().unwrap(), 2);
        assert!(storage.is_empty().unwrap());
    }

    #[test]
    fn test_stats() {
        let storage = create_test_storage();
        let empty = storage.stats().unwrap();
        assert_eq!(empty.total_items, 0);
        assert!(empty.last_write.is_none());

        storage.set_item("a", "1234").unwrap();
        let stats = storage.stats().unwrap();
        assert_eq!(stats.total_items, 1);
        assert_eq!(stats.total_bytes, 4);
        assert!(stats.last_write.is_some());
        assert_eq!(stats.db_size_bytes, 0);
    }

    #[test]
    fn test_path() {
        let storage = create_test_storage();
        assert_eq!(storage.path().to_string_lossy(), ":memory:");
    }

    #[test]
    fn test_open_file_based_persists() {
        let dir = std::env::temp_dir().join(format!("kaizen_storage_test_{}", std::process::id()));
        let db_path = dir.join("nested").join("kaizen.db");
        let _ = std::fs::remove_dir_all(&dir);

        {
            let storage = Storage::open(&db_path).unwrap();
            storage.set_item("kept", "yes").unwrap();
            assert_eq!(storage.path(), db_path);
        }

        let reopened = Storage::open(&db_path).unwrap();
        assert_eq!(reopened.get_item("kept").unwrap().as_deref(), Some("yes"));
        assert!(reopened.stats().unwrap().db_size_bytes > 0);

        drop(reopened);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
