use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection};
use tracing::{info, warn};

use crate::record::ModuleRecord;
use crate::store::{ChangeStore, StoreError};

/// SQLite-backed implementation of the [`ChangeStore`] trait.
///
/// Cross-process safety (concurrent writers, a feed reader alongside a
/// writer) is delegated to SQLite: WAL journaling for crash recovery
/// and a busy timeout so a blocked lock acquisition fails instead of
/// waiting forever.
pub struct SqliteChangeStore {
    conn: Mutex<Connection>,
}

impl SqliteChangeStore {
    /// Open (or create) a database at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)
            .map_err(|e| StoreError::Storage(format!("open {}: {}", path.display(), e)))?;
        info!(path = %path.display(), "opened changelog database");
        Self::init_with_connection(conn)
    }

    /// Create an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Storage(format!("open_in_memory: {}", e)))?;
        Self::init_with_connection(conn)
    }

    fn init_with_connection(conn: Connection) -> Result<Self, StoreError> {
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA busy_timeout = 1000;

            CREATE TABLE IF NOT EXISTS modules (
                name TEXT PRIMARY KEY,
                description TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE IF NOT EXISTS changes (
                key TEXT PRIMARY KEY,
                recorded INTEGER NOT NULL
            );
            ",
        )
        .map_err(|e| StoreError::Storage(format!("init_schema: {}", e)))?;

        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Storage("connection mutex poisoned".into()))
    }
}

impl ChangeStore for SqliteChangeStore {
    fn upsert_module(&self, name: &str, description: &str) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO modules (name, description) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET description = excluded.description",
            params![name, description],
        )
        .map_err(|e| StoreError::Storage(format!("upsert module: {}", e)))?;
        Ok(())
    }

    fn modules(&self) -> Result<Vec<ModuleRecord>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT name, description FROM modules")
            .map_err(|e| StoreError::Storage(format!("scan modules: {}", e)))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ModuleRecord {
                    name: row.get(0)?,
                    description: row.get(1)?,
                })
            })
            .map_err(|e| StoreError::Storage(format!("scan modules: {}", e)))?;

        let mut records = Vec::new();
        for row in rows {
            // A row error ends the scan; what we have so far still counts.
            match row {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(error = %e, "module scan ended early");
                    break;
                }
            }
        }
        Ok(records)
    }

    fn insert_change(&self, key: &str, timestamp: i64) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO changes (key, recorded) VALUES (?1, ?2)",
                params![key, timestamp],
            )
            .map_err(|e| StoreError::Storage(format!("insert change: {}", e)))?;
        Ok(inserted > 0)
    }

    fn changes(&self) -> Result<Vec<(String, i64)>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT key, recorded FROM changes")
            .map_err(|e| StoreError::Storage(format!("scan changes: {}", e)))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))
            .map_err(|e| StoreError::Storage(format!("scan changes: {}", e)))?;

        let mut pairs = Vec::new();
        for row in rows {
            match row {
                Ok(pair) => pairs.push(pair),
                Err(e) => {
                    warn!(error = %e, "change scan ended early");
                    break;
                }
            }
        }
        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::encode_key;

    #[test]
    fn upsert_overwrites_description() {
        let store = SqliteChangeStore::open_in_memory().unwrap();
        store.upsert_module("core", "first").unwrap();
        store.upsert_module("core", "second").unwrap();

        let modules = store.modules().unwrap();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].name, "core");
        assert_eq!(modules[0].description, "second");
    }

    #[test]
    fn empty_description_is_allowed() {
        let store = SqliteChangeStore::open_in_memory().unwrap();
        store.upsert_module("bare", "").unwrap();
        let modules = store.modules().unwrap();
        assert_eq!(modules[0].description, "");
    }

    #[test]
    fn duplicate_insert_is_a_noop() {
        let store = SqliteChangeStore::open_in_memory().unwrap();
        let key = encode_key("core", '!', "Crash on startup");

        assert!(store.insert_change(&key, 100).unwrap());
        assert!(!store.insert_change(&key, 200).unwrap());

        let changes = store.changes().unwrap();
        assert_eq!(changes.len(), 1);
        // The original timestamp survives; a duplicate is not an update.
        assert_eq!(changes[0].1, 100);
    }

    #[test]
    fn open_on_disk_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("changelog.db");

        {
            let store = SqliteChangeStore::open(&path).unwrap();
            store.upsert_module("core", "Core Module").unwrap();
            store
                .insert_change(&encode_key("core", '+', "Persisted"), 42)
                .unwrap();
        }

        let store = SqliteChangeStore::open(&path).unwrap();
        assert_eq!(store.modules().unwrap().len(), 1);
        assert_eq!(store.changes().unwrap().len(), 1);
    }
}
