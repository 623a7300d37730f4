//! Column descriptors.

use serde::{Deserialize, Serialize};

/// Snapshot of one column as reported by the target database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Zero-based position in the table.
    pub position: usize,
    /// Column name, original case preserved.
    pub name: String,
    /// Declared SQL type (`TEXT` when the declaration is empty).
    pub declared_type: String,
    /// Whether the column carries a NOT NULL constraint.
    pub not_null: bool,
    /// Default value expression, verbatim.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub default_value: Option<String>,
    /// Whether the column is part of the primary key.
    pub is_primary_key: bool,
}

impl ColumnInfo {
    /// Create a nullable, non-key column with the given name and type.
    pub fn new(position: usize, name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        let declared_type = declared_type.into();
        Self {
            position,
            name: name.into(),
            declared_type: if declared_type.is_empty() {
                "TEXT".to_string()
            } else {
                declared_type
            },
            not_null: false,
            default_value: None,
            is_primary_key: false,
        }
    }

    /// Mark the column as a primary key.
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    /// Mark the column as NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }
}
