//! SQLite-backed key-value store
//!
//! Persistent [`KeyValueStore`] over a single mutexed connection, holding
//! the client's preference keys and event-cache entries. Reads swallow
//! database errors into misses per the port contract; only writes report
//! failure.

use std::path::Path;

use gts_core::KeyValueStore;
use gts_domain::Result;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use tracing::debug;

use crate::errors::InfraError;

/// Key-value store in a single `client_kv` table.
pub struct SqliteKeyValueStore {
    conn: Mutex<Connection>,
}

impl SqliteKeyValueStore {
    /// Open (and initialize if needed) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(InfraError::from)?;
        Self::initialize(conn)
    }

    /// Throwaway store for tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(InfraError::from)?;
        Self::initialize(conn)
    }

    fn initialize(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS client_kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )
        .map_err(InfraError::from)?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        let conn = self.conn.lock();
        match conn.query_row("SELECT value FROM client_kv WHERE key = ?1", params![key], |row| {
            row.get(0)
        }) {
            Ok(value) => Some(value),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(err) => {
                debug!(key, error = %err, "key-value read failed");
                None
            }
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .lock()
            .execute(
                "INSERT INTO client_kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(InfraError::from)?;
        Ok(())
    }

    fn remove(&self, key: &str) {
        if let Err(err) =
            self.conn.lock().execute("DELETE FROM client_kv WHERE key = ?1", params![key])
        {
            debug!(key, error = %err, "key-value delete failed");
        }
    }

    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let conn = self.conn.lock();
        let mut statement =
            match conn.prepare("SELECT key FROM client_kv WHERE key LIKE ?1 || '%'") {
                Ok(statement) => statement,
                Err(err) => {
                    debug!(prefix, error = %err, "key scan failed");
                    return Vec::new();
                }
            };

        let result = match statement.query_map(params![prefix], |row| row.get::<_, String>(0)) {
            Ok(rows) => rows.filter_map(std::result::Result::ok).collect(),
            Err(err) => {
                debug!(prefix, error = %err, "key scan failed");
                Vec::new()
            }
        };
        result
    }
}
