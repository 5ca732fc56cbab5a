//! SQLite persistence layer for panel preferences.
//!
//! Uses `rusqlite` with bundled SQLite. Each preference is a single row keyed
//! by its fixed name; the value column holds the raw `{ "value": ... }` JSON
//! envelope exactly as written, so decoding stays in the caller's hands.

mod preferences;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use rusqlite::Connection;

/// Raw key-value persistence seam.
///
/// Implementations store opaque text under a key and never interpret it.
/// Entries are overwritten in place and never deleted.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw text stored under `key`, or `None` if nothing was written.
    fn read_raw(&self, key: &str) -> Result<Option<String>>;

    /// Write `raw` under `key`, replacing any previous entry.
    fn write_raw(&self, key: &str, raw: &str) -> Result<()>;
}

/// Manages the SQLite database holding the preference table.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create the database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        // WAL lets a second process (e.g. the CLI) read while the panel writes.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::init(conn)
    }

    /// Open a private in-memory database. Nothing survives the process.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            );
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("preference database lock poisoned"))
    }
}
