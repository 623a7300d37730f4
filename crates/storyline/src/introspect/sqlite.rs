//! SQLite-backed schema introspection via PRAGMA queries.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};
use tracing::{debug, warn};

use crate::error::{Result, StorylineError};
use crate::schema::{ColumnInfo, ForeignKeyInfo, TableInfo};

use super::{RowCounter, SchemaIntrospector};

/// Introspector over a live SQLite database.
pub struct SqliteIntrospector {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteIntrospector {
    /// Open a target database file read-only.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(StorylineError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "target database does not exist",
                ),
            });
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        debug!(path = %path.display(), "opened target database");

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Wrap an already-open connection (e.g. an in-memory database).
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn, path: None }
    }

    /// Path of the target database, if opened from a file.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Count rows, propagating any error.
    pub fn count_rows(&self, table: &str) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table));
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let sql = format!("PRAGMA table_info({})", quote_identifier(table));
        let mut stmt = self.conn.prepare(&sql)?;

        let columns = stmt
            .query_map([], |row| {
                let position: i64 = row.get(0)?;
                let declared_type: Option<String> = row.get(2)?;
                let not_null: i64 = row.get(3)?;
                let pk: i64 = row.get(5)?;

                let mut column = ColumnInfo::new(
                    position.max(0) as usize,
                    row.get::<_, String>(1)?,
                    declared_type.unwrap_or_default(),
                );
                column.not_null = not_null != 0;
                column.default_value = row.get(4)?;
                column.is_primary_key = pk != 0;
                Ok(column)
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(columns)
    }

    fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyInfo>> {
        let sql = format!("PRAGMA foreign_key_list({})", quote_identifier(table));
        let mut stmt = self.conn.prepare(&sql)?;

        let keys = stmt
            .query_map([], |row| {
                Ok(ForeignKeyInfo {
                    constraint_id: row.get(0)?,
                    sequence: row.get(1)?,
                    referenced_table: row.get(2)?,
                    from_column: row.get(3)?,
                    to_column: row.get(4)?,
                    on_update: row.get(5)?,
                    on_delete: row.get(6)?,
                    match_mode: row.get(7)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(keys)
    }
}

impl SchemaIntrospector for SqliteIntrospector {
    fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' \
             AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;

        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;

        Ok(names)
    }

    fn introspect_table(&self, table: &str) -> Result<TableInfo> {
        let columns = self.columns(table)?;

        // PRAGMA table_info yields nothing for unknown tables
        if columns.is_empty() {
            return Err(StorylineError::TableNotFound(table.to_string()));
        }

        let foreign_keys = self.foreign_keys(table)?;
        let row_count = self.count_rows(table)?;

        Ok(TableInfo {
            name: table.to_string(),
            columns,
            foreign_keys,
            row_count,
        })
    }
}

impl RowCounter for SqliteIntrospector {
    fn row_count(&self, table: &str) -> u64 {
        match self.count_rows(table) {
            Ok(count) => count,
            Err(e) => {
                warn!(table, error = %e, "row count failed, treating as empty");
                0
            }
        }
    }
}

/// Quote an SQL identifier, doubling embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
