//! Table-level metadata snapshot.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::column::ColumnInfo;
use super::foreign_key::ForeignKeyInfo;

/// Everything the core needs to know about one table.
///
/// This is also the record shape of the cached metadata snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    /// Table name.
    pub name: String,
    /// Columns in declaration order.
    #[serde(default)]
    pub columns: Vec<ColumnInfo>,
    /// Foreign key descriptors, one per column pair.
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyInfo>,
    /// Row count at introspection time.
    #[serde(default)]
    pub row_count: u64,
}

impl TableInfo {
    /// Create an empty table record.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
            row_count: 0,
        }
    }

    /// Add a column.
    pub fn with_column(mut self, column: ColumnInfo) -> Self {
        self.columns.push(column);
        self
    }

    /// Add a foreign key descriptor.
    pub fn with_foreign_key(mut self, foreign_key: ForeignKeyInfo) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    /// Shorthand for a single-column key referencing `table`'s primary key.
    pub fn references(self, table: &str, from_column: &str) -> Self {
        let id = self.foreign_keys.len() as i64;
        self.with_foreign_key(ForeignKeyInfo::new(id, table, from_column, None))
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get all column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// The first primary-key column, falling back to the first column.
    pub fn primary_key_column(&self) -> Option<&ColumnInfo> {
        self.columns
            .iter()
            .find(|c| c.is_primary_key)
            .or_else(|| self.columns.first())
    }
}

/// Digest of the structural part of a metadata snapshot.
///
/// Row counts are excluded, so inserting data does not change the
/// fingerprint while adding a column or a foreign key does.
pub fn schema_fingerprint(tables: &[TableInfo]) -> String {
    let mut hasher = Sha256::new();

    for table in tables {
        hasher.update(b"T\0");
        hasher.update(table.name.as_bytes());

        for column in &table.columns {
            hasher.update(b"\0C\0");
            hasher.update(column.name.as_bytes());
            hasher.update(b"\0");
            hasher.update(column.declared_type.as_bytes());
            hasher.update([column.not_null as u8, column.is_primary_key as u8]);
            if let Some(ref default) = column.default_value {
                hasher.update(default.as_bytes());
            }
        }

        for fk in &table.foreign_keys {
            hasher.update(b"\0F\0");
            hasher.update(fk.constraint_id.to_le_bytes());
            hasher.update(fk.sequence.to_le_bytes());
            hasher.update(fk.referenced_table.as_bytes());
            hasher.update(b"\0");
            hasher.update(fk.from_column.as_bytes());
            hasher.update(b"\0");
            hasher.update(fk.to_column.as_deref().unwrap_or("").as_bytes());
        }

        hasher.update(b"\n");
    }

    format!("sha256:{:x}", hasher.finalize())
}
