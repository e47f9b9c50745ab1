//! SQLite-backed storage substrate.
//!
//! # Responsibility
//! - Open file or in-memory databases for the key-value substrate.
//! - Keep the schema versioned via `PRAGMA user_version`.
//!
//! # Invariants
//! - Returned handles have the schema fully applied.

use super::storage::{Storage, StorageError};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::{Duration, Instant};

const SCHEMA_VERSION: u32 = 1;
const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY NOT NULL,
    value BLOB NOT NULL
);";

/// Durable substrate over one SQLite database.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens a database file and applies the schema.
    ///
    /// # Side effects
    /// - Emits `storage_open` logging events with duration and status.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let started_at = Instant::now();
        info!("event=storage_open module=persist status=start mode=file");

        let conn = match Connection::open(path) {
            Ok(conn) => conn,
            Err(err) => {
                error!(
                    "event=storage_open module=persist status=error mode=file duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
        };
        Self::bootstrap(conn, started_at, "file")
    }

    /// Opens an in-memory database, mostly for tests and previews.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let started_at = Instant::now();
        info!("event=storage_open module=persist status=start mode=memory");

        let conn = match Connection::open_in_memory() {
            Ok(conn) => conn,
            Err(err) => {
                error!(
                    "event=storage_open module=persist status=error mode=memory duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
        };
        Self::bootstrap(conn, started_at, "memory")
    }

    fn bootstrap(
        conn: Connection,
        started_at: Instant,
        mode: &str,
    ) -> Result<Self, StorageError> {
        match apply_schema(&conn) {
            Ok(()) => {
                info!(
                    "event=storage_open module=persist status=ok mode={mode} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(Self { conn })
            }
            Err(err) => {
                error!(
                    "event=storage_open module=persist status=error mode={mode} duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

fn apply_schema(conn: &Connection) -> Result<(), StorageError> {
    conn.busy_timeout(Duration::from_secs(5))?;
    let version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if version >= SCHEMA_VERSION {
        return Ok(());
    }
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    Ok(())
}

impl Storage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1;", [key], |row| {
                row.get::<_, Vec<u8>>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1;", [key])?;
        Ok(())
    }

    fn capacity_hint(&self) -> Option<usize> {
        // SQLite grows with the filesystem; no meaningful budget of its own.
        None
    }
}
