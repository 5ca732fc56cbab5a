//! Preference table reads and writes.

use anyhow::Result;
use rusqlite::{params, OptionalExtension};

use super::{Database, KeyValueStore};

impl KeyValueStore for Database {
    fn read_raw(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached("SELECT value FROM preferences WHERE key = ?1")?;
        let value = stmt
            .query_row(params![key], |row| row.get::<_, String>(0))
            .optional()?;
        Ok(value)
    }

    fn write_raw(&self, key: &str, raw: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO preferences (key, value) VALUES (?1, ?2)",
            params![key, raw],
        )?;
        Ok(())
    }
}
