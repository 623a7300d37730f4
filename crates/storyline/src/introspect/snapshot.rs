//! In-memory schema source built from a metadata snapshot.

use indexmap::IndexMap;

use crate::error::{Result, StorylineError};
use crate::schema::TableInfo;

use super::{RowCounter, SchemaIntrospector};

/// A fixed set of tables served as if they were a live database.
///
/// Row counts come from each record's `row_count` unless overridden with
/// [`set_row_count`](Self::set_row_count).
#[derive(Debug, Clone, Default)]
pub struct StaticSchema {
    tables: IndexMap<String, TableInfo>,
}

impl StaticSchema {
    /// Build from table records; table order is normalised to name order.
    pub fn new(tables: impl IntoIterator<Item = TableInfo>) -> Self {
        let mut tables: IndexMap<String, TableInfo> = tables
            .into_iter()
            .map(|t| (t.name.clone(), t))
            .collect();
        tables.sort_keys();
        Self { tables }
    }

    /// Override the row count reported for a table.
    pub fn set_row_count(&mut self, table: &str, count: u64) {
        if let Some(info) = self.tables.get_mut(table) {
            info.row_count = count;
        }
    }

    /// Drop a table, as if it had been removed from the database.
    pub fn drop_table(&mut self, table: &str) -> Option<TableInfo> {
        self.tables.shift_remove(table)
    }
}

impl SchemaIntrospector for StaticSchema {
    fn table_names(&self) -> Result<Vec<String>> {
        Ok(self.tables.keys().cloned().collect())
    }

    fn introspect_table(&self, table: &str) -> Result<TableInfo> {
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| StorylineError::TableNotFound(table.to_string()))
    }
}

impl RowCounter for StaticSchema {
    fn row_count(&self, table: &str) -> u64 {
        self.tables.get(table).map(|t| t.row_count).unwrap_or(0)
    }
}
