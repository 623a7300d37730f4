//! System database holding cached metadata and story state.
//!
//! The system database is separate from the target database: the target
//! is only ever read, everything Storyline derives is written here.

mod cache;
mod steps;

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::debug;

use crate::error::{Result, StorylineError};

pub use steps::Regeneration;

/// Key in `story_meta` holding the schema fingerprint of the stored steps.
pub const FINGERPRINT_KEY: &str = "schema_fingerprint";

/// SQLite-backed store for Storyline's own state.
pub struct SystemStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SystemStore {
    /// Open (creating if needed) a system database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| StorylineError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let conn = Connection::open(path)?;
        let store = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        store.migrate()?;
        debug!(path = %path.display(), "opened system database");
        Ok(store)
    }

    /// Open a private in-memory system database.
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
            path: None,
        };
        store.migrate()?;
        Ok(store)
    }

    /// File backing the store, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS table_metadata (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              table_name TEXT UNIQUE NOT NULL,
              row_count INTEGER DEFAULT 0,
              columns_json TEXT NOT NULL DEFAULT '[]',
              foreign_keys_json TEXT NOT NULL DEFAULT '[]'
            );

            CREATE TABLE IF NOT EXISTS column_semantics (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              table_name TEXT NOT NULL,
              column_name TEXT NOT NULL,
              semantic_type TEXT NOT NULL,
              UNIQUE(table_name, column_name)
            );

            CREATE TABLE IF NOT EXISTS table_dependencies (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              from_table TEXT NOT NULL,
              to_table TEXT NOT NULL,
              from_column TEXT NOT NULL DEFAULT '',
              to_column TEXT,
              UNIQUE(from_table, to_table)
            );

            CREATE TABLE IF NOT EXISTS story_steps (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              source_type TEXT NOT NULL DEFAULT 'table',
              source_name TEXT NOT NULL,
              order_index INTEGER NOT NULL DEFAULT 0,
              title TEXT NOT NULL,
              description TEXT NOT NULL DEFAULT '',
              min_records_required INTEGER NOT NULL DEFAULT 1,
              enabled INTEGER NOT NULL DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS story_meta (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }
}

/// SQLite INTEGER to an unsigned count; negatives read as zero.
fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// Unsigned count to SQLite INTEGER, saturating.
fn from_count(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_file_and_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state").join("system.db");

        let store = SystemStore::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(store.path(), Some(path.as_path()));
    }

    #[test]
    fn test_reopen_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("system.db");

        drop(SystemStore::open(&path).unwrap());
        let store = SystemStore::open(&path).unwrap();
        assert_eq!(store.step_count().unwrap(), 0);
    }

    #[test]
    fn test_count_conversions() {
        assert_eq!(to_count(-3), 0);
        assert_eq!(to_count(12), 12);
        assert_eq!(from_count(u64::MAX), i64::MAX);
    }
}
