//! Column semantics inferred from naming conventions.

mod autofill;
mod classifier;
mod role;
mod table;

pub use autofill::{format_timestamp, DeletePlan, RowValues, TIMESTAMP_FORMAT};
pub use classifier::{detect_semantic_type, normalize_column_name, SemanticClassifier, DEFAULT_PATTERNS};
pub use role::SemanticRole;
pub use table::{analyze_columns, analyze_columns_with, analyze_table_semantics, TableSemantics};
