//! Per-table semantic mapping.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::introspect::SchemaIntrospector;
use crate::schema::ColumnInfo;

use super::classifier::SemanticClassifier;
use super::role::SemanticRole;

/// Column name → semantic role for one table.
///
/// Columns without a recognised role are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableSemantics {
    roles: IndexMap<String, SemanticRole>,
}

impl TableSemantics {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a role for a column, replacing any previous one.
    pub fn insert(&mut self, column: impl Into<String>, role: SemanticRole) {
        self.roles.insert(column.into(), role);
    }

    /// Role of a column, if any.
    pub fn role_of(&self, column: &str) -> Option<SemanticRole> {
        self.roles.get(column).copied()
    }

    /// Columns carrying a given role, in column order.
    pub fn columns_with_role(&self, role: SemanticRole) -> impl Iterator<Item = &str> {
        self.roles
            .iter()
            .filter(move |(_, r)| **r == role)
            .map(|(c, _)| c.as_str())
    }

    /// Whether the column is stamped with the current time on write.
    pub fn is_auto_timestamp_column(&self, column: &str) -> bool {
        self.role_of(column).is_some_and(|r| r.is_auto_timestamp())
    }

    /// Whether the column is stamped with the acting user on write.
    pub fn is_auto_user_column(&self, column: &str) -> bool {
        self.role_of(column).is_some_and(|r| r.is_auto_user())
    }

    /// Whether deletes on this table should be soft.
    pub fn supports_soft_delete(&self) -> bool {
        self.soft_delete_column().is_some()
    }

    /// The first deleted_at column.
    pub fn soft_delete_column(&self) -> Option<&str> {
        self.columns_with_role(SemanticRole::DeletedAt).next()
    }

    /// Iterate (column, role) pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, SemanticRole)> {
        self.roles.iter().map(|(c, r)| (c.as_str(), *r))
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl FromIterator<(String, SemanticRole)> for TableSemantics {
    fn from_iter<I: IntoIterator<Item = (String, SemanticRole)>>(iter: I) -> Self {
        Self {
            roles: iter.into_iter().collect(),
        }
    }
}

/// Classify every column independently with the built-in conventions.
pub fn analyze_columns(columns: &[ColumnInfo]) -> TableSemantics {
    analyze_columns_with(SemanticClassifier::standard(), columns)
}

/// Classify every column independently with a given classifier.
pub fn analyze_columns_with(classifier: &SemanticClassifier, columns: &[ColumnInfo]) -> TableSemantics {
    columns
        .iter()
        .filter_map(|c| classifier.classify(&c.name).map(|role| (c.name.clone(), role)))
        .collect()
}

/// Introspect a table and classify its columns.
pub fn analyze_table_semantics(
    introspector: &dyn SchemaIntrospector,
    table: &str,
) -> Result<TableSemantics> {
    let info = introspector.introspect_table(table)?;
    Ok(analyze_columns(&info.columns))
}
