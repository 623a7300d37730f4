//! Write-time behavior derived from column semantics.
//!
//! The CRUD layer hands a row of submitted values to these helpers before
//! issuing an INSERT, UPDATE or DELETE; they only decide values and never
//! touch the database.

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::role::SemanticRole;
use super::table::TableSemantics;

/// Format used for auto-filled timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Column name → submitted value.
pub type RowValues = IndexMap<String, Value>;

/// How a delete request on a table should be carried out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeletePlan {
    /// Stamp the soft-delete column instead of removing the row.
    Soft { column: String, value: String },
    /// Remove the row.
    Hard,
}

/// Format a timestamp the way auto-filled columns store it.
pub fn format_timestamp(now: NaiveDateTime) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

impl TableSemantics {
    /// Fill audit columns missing from a row about to be inserted.
    ///
    /// Values already present in the row are kept. An empty user counts
    /// as no user.
    pub fn fill_for_insert(&self, row: &mut RowValues, now: NaiveDateTime, user: Option<&str>) {
        let stamp = format_timestamp(now);
        let user = user.filter(|u| !u.is_empty());

        for (column, role) in self.iter() {
            if row.contains_key(column) {
                continue;
            }
            match role {
                SemanticRole::CreatedAt | SemanticRole::UpdatedAt => {
                    row.insert(column.to_string(), Value::String(stamp.clone()));
                }
                SemanticRole::CreatedBy | SemanticRole::UpdatedBy => {
                    if let Some(user) = user {
                        row.insert(column.to_string(), Value::String(user.to_string()));
                    }
                }
                _ => {}
            }
        }
    }

    /// Stamp modification columns on a row about to be updated.
    ///
    /// updated_at is always overwritten; created_* columns are left alone.
    pub fn fill_for_update(&self, row: &mut RowValues, now: NaiveDateTime, user: Option<&str>) {
        let stamp = format_timestamp(now);
        let user = user.filter(|u| !u.is_empty());

        for (column, role) in self.iter() {
            match role {
                SemanticRole::UpdatedAt => {
                    row.insert(column.to_string(), Value::String(stamp.clone()));
                }
                SemanticRole::UpdatedBy => {
                    if let Some(user) = user {
                        row.insert(column.to_string(), Value::String(user.to_string()));
                    }
                }
                _ => {}
            }
        }
    }

    /// Decide between soft and hard delete.
    pub fn delete_plan(&self, now: NaiveDateTime) -> DeletePlan {
        match self.soft_delete_column() {
            Some(column) => DeletePlan::Soft {
                column: column.to_string(),
                value: format_timestamp(now),
            },
            None => DeletePlan::Hard,
        }
    }
}
