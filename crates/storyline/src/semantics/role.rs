//! Semantic roles inferred from column names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StorylineError;

/// Inferred meaning of a column.
///
/// Variants are declared in classification priority order: when two
/// roles could match the same name, the earlier one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticRole {
    /// Row creation timestamp.
    CreatedAt,
    /// Last modification timestamp.
    UpdatedAt,
    /// Soft-delete marker.
    DeletedAt,
    /// User who created the row.
    CreatedBy,
    /// User who last modified the row.
    UpdatedBy,
    /// Status / active flag.
    Status,
}

impl SemanticRole {
    /// All roles, in priority order.
    pub const ALL: [SemanticRole; 6] = [
        SemanticRole::CreatedAt,
        SemanticRole::UpdatedAt,
        SemanticRole::DeletedAt,
        SemanticRole::CreatedBy,
        SemanticRole::UpdatedBy,
        SemanticRole::Status,
    ];

    /// Stable snake_case name, as stored in the system database.
    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticRole::CreatedAt => "created_at",
            SemanticRole::UpdatedAt => "updated_at",
            SemanticRole::DeletedAt => "deleted_at",
            SemanticRole::CreatedBy => "created_by",
            SemanticRole::UpdatedBy => "updated_by",
            SemanticRole::Status => "status",
        }
    }

    /// Returns true for roles filled with the current time on write.
    pub fn is_auto_timestamp(&self) -> bool {
        matches!(self, SemanticRole::CreatedAt | SemanticRole::UpdatedAt)
    }

    /// Returns true for roles filled with the acting user on write.
    pub fn is_auto_user(&self) -> bool {
        matches!(self, SemanticRole::CreatedBy | SemanticRole::UpdatedBy)
    }
}

impl fmt::Display for SemanticRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SemanticRole {
    type Err = StorylineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SemanticRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| StorylineError::Persistence(format!("Unknown semantic role: {}", s)))
    }
}
