//! Read-only access to the target database's schema and row counts.

mod snapshot;
mod sqlite;

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::Result;
use crate::schema::TableInfo;

pub use snapshot::StaticSchema;
pub use sqlite::{quote_identifier, SqliteIntrospector};

/// Source of schema information for the target database.
pub trait SchemaIntrospector {
    /// Names of all user tables, ordered by name.
    fn table_names(&self) -> Result<Vec<String>>;

    /// Columns, foreign keys and row count of one table.
    fn introspect_table(&self, table: &str) -> Result<TableInfo>;

    /// Introspect every table returned by [`table_names`](Self::table_names).
    fn introspect_all(&self) -> Result<Vec<TableInfo>> {
        self.table_names()?
            .iter()
            .map(|name| self.introspect_table(name))
            .collect()
    }
}

/// Live row-count lookup.
///
/// Implementations never fail: a table that cannot be counted (dropped,
/// renamed, locked) reports zero rows.
pub trait RowCounter {
    fn row_count(&self, table: &str) -> u64;
}

impl RowCounter for HashMap<String, u64> {
    fn row_count(&self, table: &str) -> u64 {
        self.get(table).copied().unwrap_or(0)
    }
}

impl RowCounter for IndexMap<String, u64> {
    fn row_count(&self, table: &str) -> u64 {
        self.get(table).copied().unwrap_or(0)
    }
}

impl<T: RowCounter + ?Sized> RowCounter for &T {
    fn row_count(&self, table: &str) -> u64 {
        (**self).row_count(table)
    }
}
