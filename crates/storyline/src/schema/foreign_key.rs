//! Foreign key descriptors.

use serde::{Deserialize, Serialize};

/// One column pair of a (possibly composite) foreign key.
///
/// Composite keys are reported as several descriptors sharing a
/// `constraint_id`, with increasing `sequence`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyInfo {
    /// Constraint id, shared by all column pairs of one key.
    pub constraint_id: i64,
    /// Position of this pair within the constraint.
    pub sequence: i64,
    /// Table the key points at.
    pub referenced_table: String,
    /// Column in the referencing table.
    pub from_column: String,
    /// Column in the referenced table; `None` when the key targets the
    /// referenced table's primary key implicitly.
    #[serde(default)]
    pub to_column: Option<String>,
    pub on_update: String,
    pub on_delete: String,
    pub match_mode: String,
}

impl ForeignKeyInfo {
    /// Create a single-column key with SQLite's default actions.
    pub fn new(
        constraint_id: i64,
        referenced_table: impl Into<String>,
        from_column: impl Into<String>,
        to_column: Option<&str>,
    ) -> Self {
        Self {
            constraint_id,
            sequence: 0,
            referenced_table: referenced_table.into(),
            from_column: from_column.into(),
            to_column: to_column.map(String::from),
            on_update: "NO ACTION".to_string(),
            on_delete: "NO ACTION".to_string(),
            match_mode: "NONE".to_string(),
        }
    }

    /// Set the position within a composite key.
    pub fn with_sequence(mut self, sequence: i64) -> Self {
        self.sequence = sequence;
        self
    }
}
