//! Error types for the Storyline library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Storyline operations.
#[derive(Debug, Error)]
pub enum StorylineError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the SQLite driver (target or system database).
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Table is not present in the target database.
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Story step id is not present in the system database.
    #[error("Story step not found: {0}")]
    StepNotFound(i64),

    /// Stored state could not be read back.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// Result type alias for Storyline operations.
pub type Result<T> = std::result::Result<T, StorylineError>;
